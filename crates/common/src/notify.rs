//! User-visible notices.
//!
//! Notices never carry file paths or pixel data; they are safe to show in a
//! desktop notification.

/// A transient message for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Saved,
    SaveFailed,
    Copied,
    CopyFailed,
    CaptureFailed,
    PermissionRequired,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Saved => "Screenshot saved",
            Notice::SaveFailed => "Failed to save screenshot",
            Notice::Copied => "Screenshot copied to clipboard",
            Notice::CopyFailed => "Failed to copy screenshot",
            Notice::CaptureFailed => "Screenshot failed",
            Notice::PermissionRequired => "Screen capture permission is required",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Receives session lifecycle signals and transient notices.
pub trait Notifier: Send + Sync {
    fn session_started(&self) {}

    fn session_stopped(&self) {}

    fn notice(&self, notice: Notice);
}

/// Notifier that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notice(&self, _notice: Notice) {}
}
