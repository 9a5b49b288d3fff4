//! Desktop implementations of the action pipeline's collaborators.

use std::borrow::Cow;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use image::RgbaImage;

use snapcrop_actions::{ActionChooser, Choice, Clipboard, Storage};
use snapcrop_common::config::TerminalAction;
use snapcrop_common::notify::{Notice, Notifier};
use snapcrop_common::temp::TempCache;

/// Saves PNGs into a screenshots directory.
pub struct DirectoryStorage {
    dir: PathBuf,
}

impl DirectoryStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn next_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S_%3f");
        self.dir.join(format!("Screenshot_{stamp}.png"))
    }
}

impl Storage for DirectoryStorage {
    fn save(&self, image: &RgbaImage) -> bool {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::error!(error = %e, dir = %self.dir.display(), "Cannot create screenshots directory");
            return false;
        }
        let path = self.next_path();
        match image.save_with_format(&path, image::ImageFormat::Png) {
            Ok(()) => {
                println!("Saved: {}", path.display());
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to write screenshot");
                false
            }
        }
    }
}

/// System clipboard through `arboard`; share opens a cached copy in the
/// default viewer.
///
/// The clipboard handle is kept for the process lifetime. On X11 and
/// Wayland the copied image is only served while it is alive.
pub struct ArboardClipboard {
    handle: Mutex<Option<arboard::Clipboard>>,
    cache: TempCache,
}

impl ArboardClipboard {
    pub fn new(cache: TempCache) -> Self {
        Self {
            handle: Mutex::new(None),
            cache,
        }
    }

    fn with_handle<T>(
        &self,
        op: impl FnOnce(&mut arboard::Clipboard) -> Result<T, arboard::Error>,
    ) -> Result<T, arboard::Error> {
        let mut guard = self
            .handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.is_none() {
            *guard = Some(arboard::Clipboard::new()?);
        }
        match guard.as_mut() {
            Some(clipboard) => op(clipboard),
            None => Err(arboard::Error::ClipboardNotSupported),
        }
    }
}

impl Clipboard for ArboardClipboard {
    fn copy(&self, image: &RgbaImage) -> bool {
        let data = arboard::ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: Cow::Borrowed(image.as_raw()),
        };
        match self.with_handle(|clipboard| clipboard.set_image(data)) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Clipboard copy failed");
                false
            }
        }
    }

    fn clear(&self) -> bool {
        match self.with_handle(|clipboard| clipboard.clear()) {
            Ok(()) => {
                tracing::info!("Clipboard cleared");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Clipboard clear failed");
                false
            }
        }
    }

    fn share(&self, image: &RgbaImage) {
        let path = match self.cache.cache_file() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "No cache file for share");
                return;
            }
        };
        if let Err(e) = image.save_with_format(&path, image::ImageFormat::Png) {
            tracing::warn!(error = %e, "Failed to write share copy");
            return;
        }
        if let Err(e) = open::that_detached(&path) {
            tracing::warn!(error = %e, "Share target could not be opened");
        }
    }
}

/// Surfaces notices as log lines.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn session_started(&self) {
        tracing::info!("Screen capture in progress");
    }

    fn session_stopped(&self) {
        tracing::debug!("Screen capture stopped");
    }

    fn notice(&self, notice: Notice) {
        match notice {
            Notice::Saved | Notice::Copied => tracing::info!("{notice}"),
            _ => tracing::warn!("{notice}"),
        }
    }
}

/// Prompts on stdin.
pub struct StdinChooser;

impl ActionChooser for StdinChooser {
    fn choose(&self, offer_remember: bool) -> Option<Choice> {
        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        let action = loop {
            print!("[s]ave, [c]opy and discard, [d]iscard, [q]uit: ");
            std::io::stdout().flush().ok()?;
            let line = lines.next()?.ok()?;
            match line.trim().to_ascii_lowercase().as_str() {
                "s" => break TerminalAction::Save,
                "c" => break TerminalAction::CopyDiscard,
                "d" => break TerminalAction::Discard,
                "q" | "" => return None,
                other => match TerminalAction::parse(other) {
                    Some(action) => break action,
                    None => println!("Unknown choice: {other}"),
                },
            }
        };

        let remember = offer_remember && {
            print!("Remember this choice? [y/N]: ");
            std::io::stdout().flush().ok()?;
            let answer = lines.next()?.ok()?;
            matches!(answer.trim(), "y" | "Y" | "yes")
        };

        Some(Choice { action, remember })
    }
}
