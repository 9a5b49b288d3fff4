//! Terminal action dispatch.
//!
//! Every action exports the current crop, runs its I/O on a blocking worker,
//! and closes the session only on success. A closed session has already
//! deleted its temp artifact.

use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use tokio::task::JoinHandle;

use snapcrop_common::config::{PreferencesStore, TerminalAction};
use snapcrop_common::error::{SnapError, SnapResult};
use snapcrop_common::notify::{Notice, Notifier};
use snapcrop_common::timer::{TimerKey, TimerRegistry};

use crate::collaborators::{ActionChooser, Clipboard, Storage};
use crate::session::EditSession;

/// How a terminal action ended the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Saved,
    Copied {
        /// A deferred clipboard wipe is pending.
        clear_scheduled: bool,
    },
    Discarded,
}

impl ActionOutcome {
    pub fn action(&self) -> TerminalAction {
        match self {
            ActionOutcome::Saved => TerminalAction::Save,
            ActionOutcome::Copied { .. } => TerminalAction::CopyDiscard,
            ActionOutcome::Discarded => TerminalAction::Discard,
        }
    }
}

pub struct ActionPipeline {
    storage: Arc<dyn Storage>,
    clipboard: Arc<dyn Clipboard>,
    prefs: Arc<dyn PreferencesStore>,
    notifier: Arc<dyn Notifier>,
    timers: TimerRegistry,
}

impl ActionPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        clipboard: Arc<dyn Clipboard>,
        prefs: Arc<dyn PreferencesStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            storage,
            clipboard,
            prefs,
            notifier,
            timers: TimerRegistry::new(),
        }
    }

    /// Share a timer registry with other components.
    pub fn with_timers(mut self, timers: TimerRegistry) -> Self {
        self.timers = timers;
        self
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    /// Pick the terminal action: the remembered one when enabled, otherwise
    /// whatever `chooser` returns. `None` means the prompt was cancelled.
    pub fn select_action(&self, chooser: &dyn ActionChooser) -> Option<TerminalAction> {
        let prefs = self.prefs.snapshot();
        if prefs.remember_action {
            if let Some(action) = prefs.remembered_action {
                tracing::info!(action = action.as_str(), "Replaying remembered action");
                return Some(action);
            }
        }

        let choice = chooser.choose(prefs.remember_action)?;
        if choice.remember && prefs.remember_action {
            match self.prefs.set_remembered_action(Some(choice.action)) {
                Ok(()) => tracing::debug!(action = choice.action.as_str(), "Action remembered"),
                Err(e) => tracing::warn!(error = %e, "Failed to remember action"),
            }
        }
        Some(choice.action)
    }

    /// Select an action and run it. `Ok(None)` when the prompt was cancelled.
    pub async fn complete(
        &self,
        session: &mut EditSession,
        chooser: &dyn ActionChooser,
    ) -> SnapResult<Option<ActionOutcome>> {
        session.ensure_open()?;
        match self.select_action(chooser) {
            Some(action) => self.execute(session, action).await.map(Some),
            None => {
                tracing::debug!("Action prompt cancelled");
                Ok(None)
            }
        }
    }

    pub async fn execute(
        &self,
        session: &mut EditSession,
        action: TerminalAction,
    ) -> SnapResult<ActionOutcome> {
        match action {
            TerminalAction::Save => self.save(session).await,
            TerminalAction::CopyDiscard => self.copy_and_discard(session).await,
            TerminalAction::Discard => self.discard(session),
        }
    }

    /// Persist the crop. On failure the session stays open.
    pub async fn save(&self, session: &mut EditSession) -> SnapResult<ActionOutcome> {
        session.begin(TerminalAction::Save)?;
        let image = self.export_for(session)?;

        let storage = self.storage.clone();
        if !run_blocking(move || storage.save(&image)).await {
            session.abandon();
            tracing::warn!("Saving screenshot failed");
            self.notifier.notice(Notice::SaveFailed);
            return Err(SnapError::StorageIoFailed);
        }

        session.close(TerminalAction::Save);
        tracing::info!("Screenshot saved");
        self.notifier.notice(Notice::Saved);
        Ok(ActionOutcome::Saved)
    }

    /// Put the crop on the clipboard, then drop the artifact. On failure the
    /// session stays open.
    pub async fn copy_and_discard(&self, session: &mut EditSession) -> SnapResult<ActionOutcome> {
        session.begin(TerminalAction::CopyDiscard)?;
        let image = self.export_for(session)?;

        let clipboard = self.clipboard.clone();
        if !run_blocking(move || clipboard.copy(&image)).await {
            session.abandon();
            tracing::warn!("Copying screenshot failed");
            self.notifier.notice(Notice::CopyFailed);
            return Err(SnapError::ClipboardIoFailed);
        }

        let prefs = self.prefs.snapshot();
        let clear_scheduled = prefs.auto_clear_clipboard;
        if clear_scheduled {
            self.schedule_clipboard_clear(Duration::from_secs(u64::from(prefs.clear_seconds)));
        }

        session.close(TerminalAction::CopyDiscard);
        tracing::info!(clear_scheduled, "Screenshot copied");
        self.notifier.notice(Notice::Copied);
        Ok(ActionOutcome::Copied { clear_scheduled })
    }

    /// Drop the artifact without any I/O.
    pub fn discard(&self, session: &mut EditSession) -> SnapResult<ActionOutcome> {
        session.begin(TerminalAction::Discard)?;
        session.close(TerminalAction::Discard);
        tracing::info!("Screenshot discarded");
        Ok(ActionOutcome::Discarded)
    }

    /// Hand the crop to the share target in the background. The session
    /// stays open.
    pub fn share(&self, session: &EditSession) -> SnapResult<JoinHandle<()>> {
        let image = session.export()?;
        let clipboard = self.clipboard.clone();
        tracing::debug!(width = image.width(), height = image.height(), "Sharing crop");
        Ok(tokio::task::spawn_blocking(move || clipboard.share(&image)))
    }

    /// Arm the deferred clipboard wipe, replacing any pending one.
    pub fn schedule_clipboard_clear(&self, delay: Duration) {
        let clipboard = self.clipboard.clone();
        self.timers.schedule(TimerKey::ClipboardClear, delay, move || {
            if !clipboard.clear() {
                tracing::warn!("Clearing clipboard failed");
            }
        });
    }

    fn export_for(&self, session: &mut EditSession) -> SnapResult<RgbaImage> {
        session.export().map_err(|e| {
            session.abandon();
            tracing::error!(error = %e, "Crop export failed");
            self.notifier.notice(Notice::CaptureFailed);
            e
        })
    }
}

/// Run collaborator I/O off the calling task. A panicked worker counts as failure.
async fn run_blocking<F>(job: F) -> bool
where
    F: FnOnce() -> bool + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::error!(error = %e, "Collaborator task failed");
            false
        }
    }
}
