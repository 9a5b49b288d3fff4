//! Error types shared across Snapcrop crates.

use std::path::PathBuf;

/// Top-level error type for Snapcrop operations.
#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    #[error("Screen capture permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Capture blocked while the device is locked")]
    LockedDeviceBlocked,

    #[error("No frame available: {message}")]
    NoFrameAvailable { message: String },

    #[error("Crop transform is not invertible")]
    DegenerateTransform,

    #[error("Failed to encode image: {message}")]
    EncodeFailed { message: String },

    #[error("Failed to save image to storage")]
    StorageIoFailed,

    #[error("Failed to copy image to clipboard")]
    ClipboardIoFailed,

    #[error("A capture session is already in progress")]
    CaptureInProgress,

    #[error("Capture session was torn down")]
    Cancelled,

    #[error("Invalid frame layout: {message}")]
    InvalidFrame { message: String },

    #[error("Temp artifact could not be read: {path}")]
    ArtifactUnreadable { path: PathBuf },

    #[error("Edit session already closed")]
    SessionClosed,

    #[error("Platform error: {message}")]
    Platform { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SnapError.
pub type SnapResult<T> = Result<T, SnapError>;

impl SnapError {
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: msg.into(),
        }
    }

    pub fn no_frame(msg: impl Into<String>) -> Self {
        Self::NoFrameAvailable {
            message: msg.into(),
        }
    }

    pub fn encode_failed(msg: impl Into<String>) -> Self {
        Self::EncodeFailed {
            message: msg.into(),
        }
    }

    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: msg.into(),
        }
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Failures that abort a capture session outright.
    pub fn is_capture_failure(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied { .. }
                | Self::LockedDeviceBlocked
                | Self::NoFrameAvailable { .. }
                | Self::DegenerateTransform
        )
    }

    /// Post-capture failures after which the user may pick another action.
    pub fn keeps_session_open(&self) -> bool {
        matches!(self, Self::StorageIoFailed | Self::ClipboardIoFailed)
    }
}
