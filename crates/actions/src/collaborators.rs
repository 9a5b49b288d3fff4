//! Narrow interfaces to the I/O the action pipeline drives.
//!
//! Implementations are called from blocking worker threads and report
//! success as a plain `bool`; the pipeline maps `false` onto the error
//! taxonomy.

use image::RgbaImage;
use snapcrop_common::config::TerminalAction;

/// Permanent image storage (gallery, screenshots directory).
pub trait Storage: Send + Sync {
    fn save(&self, image: &RgbaImage) -> bool;
}

/// Clipboard and share targets.
pub trait Clipboard: Send + Sync {
    fn copy(&self, image: &RgbaImage) -> bool;

    /// Wipe whatever image we last put on the clipboard.
    fn clear(&self) -> bool;

    /// Hand the image to a share target. Best effort; failures are not
    /// reported back.
    fn share(&self, image: &RgbaImage);
}

/// The user's answer to the action prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub action: TerminalAction,
    /// Persist `action` for next time.
    pub remember: bool,
}

/// Presents the save / copy / discard prompt.
pub trait ActionChooser {
    /// Ask for an action. `offer_remember` controls whether a
    /// "remember this" toggle is shown. `None` means the prompt was cancelled.
    fn choose(&self, offer_remember: bool) -> Option<Choice>;
}
