//! Capture session management.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use snapcrop_common::config::{CaptureConfig, Preferences};
use snapcrop_common::error::{SnapError, SnapResult};
use snapcrop_common::notify::{Notice, Notifier};
use snapcrop_common::temp::{delete_artifact, TempCache};
use snapcrop_common::timer::{TimerKey, TimerRegistry};

use crate::backend::{CaptureBackend, CaptureResources};
use crate::frame::{extract_frame, trim_status_bar};
use crate::slot::SlotRegistry;

/// Gating parameters for one capture attempt.
///
/// The platform permission itself is obtained by the backend and held as a
/// `CaptureGrant` for the duration of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Capture as soon as the grant arrives.
    pub immediate: bool,
    /// Delay before acquisition when `immediate` is off.
    pub delay_seconds: u32,
    /// Refuse to capture while the device is locked.
    pub lock_guard: bool,
}

impl CaptureRequest {
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            immediate: prefs.immediate_capture,
            delay_seconds: prefs.delay_seconds,
            lock_guard: prefs.disable_on_lock,
        }
    }

    /// Delay to apply before acquisition, if any.
    pub fn delay(&self) -> Option<Duration> {
        (!self.immediate && self.delay_seconds > 0)
            .then(|| Duration::from_secs(u64::from(self.delay_seconds)))
    }
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self::from_preferences(&Preferences::default())
    }
}

/// State of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session created but not started.
    Idle,
    /// Waiting for the platform capture grant.
    AwaitingPermission,
    /// Grant held.
    Granted,
    /// Checking the device lock.
    LockCheck,
    /// Waiting out the configured capture delay.
    Delaying,
    /// Render target allocated, reading back one frame.
    Acquiring,
    /// Densifying the frame and removing the status bar.
    Trimming,
    /// Artifact written; the editor may take over.
    HandoffToEditor,
    /// Cleanup ran after a successful handoff.
    Terminated,
    /// A step failed or the session was torn down.
    Failed,
}

/// Result of a successful capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// Lossless temp artifact for the editor.
    pub artifact: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Fires session teardown from outside the running session.
#[derive(Debug, Clone)]
pub struct TeardownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl TeardownHandle {
    /// Cancel whatever step the session is in and release its resources.
    /// Repeated calls have no further effect.
    pub fn teardown(&self) {
        if !self.tx.send_replace(true) {
            tracing::debug!("Capture session teardown requested");
        }
    }

    pub fn is_torn_down(&self) -> bool {
        *self.tx.borrow()
    }
}

/// A single screen capture, from permission to temp artifact.
///
/// A session runs once. It holds the process-wide acquisition slot for the
/// whole run and releases the grant, render target, and frame consumer on
/// every exit path.
pub struct CaptureSession {
    backend: Arc<dyn CaptureBackend>,
    slots: Arc<SlotRegistry>,
    temp: TempCache,
    timers: TimerRegistry,
    notifier: Arc<dyn Notifier>,
    config: CaptureConfig,
    state: SessionState,
    history: Vec<SessionState>,
    teardown: TeardownHandle,
}

impl CaptureSession {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        temp: TempCache,
        notifier: Arc<dyn Notifier>,
        config: CaptureConfig,
    ) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            backend,
            slots: SlotRegistry::global(),
            temp,
            timers: TimerRegistry::new(),
            notifier,
            config,
            state: SessionState::Idle,
            history: vec![SessionState::Idle],
            teardown: TeardownHandle { tx: Arc::new(tx) },
        }
    }

    /// Use a private slot registry instead of the process-wide one.
    pub fn with_slots(mut self, slots: Arc<SlotRegistry>) -> Self {
        self.slots = slots;
        self
    }

    /// Share a timer registry with other components.
    pub fn with_timers(mut self, timers: TimerRegistry) -> Self {
        self.timers = timers;
        self
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every state entered so far, in order.
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        self.teardown.clone()
    }

    /// Run the whole capture and return the temp artifact.
    pub async fn run(&mut self, request: &CaptureRequest) -> SnapResult<CaptureOutcome> {
        if self.state != SessionState::Idle {
            return Err(SnapError::unsupported("a capture session runs only once"));
        }

        let _slot = match self.slots.try_acquire() {
            Ok(slot) => slot,
            Err(e) => {
                tracing::warn!("Capture requested while another is in progress");
                self.enter(SessionState::Failed);
                return Err(e);
            }
        };

        tracing::info!(backend = self.backend.name(), ?request, "Starting capture session");
        self.notifier.session_started();
        let _stopped = StoppedOnDrop(self.notifier.clone());

        let result = self.drive(request).await;
        self.timers.cancel(TimerKey::CaptureDelay);

        match &result {
            Ok(outcome) => {
                self.enter(SessionState::Terminated);
                tracing::info!(
                    width = outcome.width,
                    height = outcome.height,
                    "Capture handed off to editor"
                );
            }
            Err(e) => {
                self.enter(SessionState::Failed);
                self.report_failure(e);
            }
        }

        result
    }

    async fn drive(&mut self, request: &CaptureRequest) -> SnapResult<CaptureOutcome> {
        let backend = self.backend.clone();
        let mut teardown = self.teardown.tx.subscribe();

        self.enter(SessionState::AwaitingPermission);
        let grant = until_teardown(&mut teardown, backend.request_grant()).await?;
        let mut resources = CaptureResources::new(grant);
        self.enter(SessionState::Granted);

        if request.lock_guard {
            self.enter(SessionState::LockCheck);
            if backend.is_device_locked() {
                return Err(SnapError::LockedDeviceBlocked);
            }
        }

        if let Some(delay) = request.delay() {
            self.enter(SessionState::Delaying);
            tracing::debug!(delay_s = delay.as_secs(), "Delaying capture");
            until_teardown(
                &mut teardown,
                self.timers.sleep(TimerKey::CaptureDelay, delay),
            )
            .await?;
        }

        self.enter(SessionState::Acquiring);
        let metrics = backend.display_metrics()?;
        until_teardown(
            &mut teardown,
            resources.allocate_target(backend.as_ref(), &metrics),
        )
        .await?;

        let settle = Duration::from_millis(self.config.settle_delay_ms);
        until_teardown(&mut teardown, async {
            tokio::time::sleep(settle).await;
            Ok(())
        })
        .await?;

        let timeout = Duration::from_millis(self.config.frame_timeout_ms);
        let consumer = resources
            .consumer_mut()
            .ok_or_else(|| SnapError::no_frame("render target has no frame consumer"))?;
        let frame = until_teardown(&mut teardown, consumer.next_frame(timeout))
            .await?
            .ok_or_else(|| SnapError::no_frame("frame consumer yielded nothing"))?;
        resources.release();

        self.enter(SessionState::Trimming);
        let shot = trim_status_bar(extract_frame(&frame)?, metrics.status_bar_inset);
        drop(frame);

        let artifact = self.temp.allocate()?;
        let (width, height) = shot.pixels.dimensions();
        let pixels = shot.into_image();
        let target = artifact.clone();
        let encoded = tokio::task::spawn_blocking(move || {
            pixels.save_with_format(&target, image::ImageFormat::Png)
        })
        .await;

        match encoded {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = delete_artifact(&artifact);
                return Err(SnapError::encode_failed(e.to_string()));
            }
            Err(e) => {
                let _ = delete_artifact(&artifact);
                return Err(SnapError::encode_failed(format!("encoder task failed: {e}")));
            }
        }

        if self.teardown.is_torn_down() {
            let _ = delete_artifact(&artifact);
            return Err(SnapError::Cancelled);
        }

        tracing::debug!(artifact = %artifact.display(), "Temp artifact written");
        self.enter(SessionState::HandoffToEditor);
        Ok(CaptureOutcome {
            artifact,
            width,
            height,
        })
    }

    fn enter(&mut self, state: SessionState) {
        tracing::debug!(from = ?self.state, to = ?state, "Capture session transition");
        self.state = state;
        self.history.push(state);
    }

    fn report_failure(&self, error: &SnapError) {
        match error {
            SnapError::Cancelled => {
                tracing::info!("Capture session torn down");
            }
            SnapError::PermissionDenied { .. } => {
                tracing::warn!(error = %error, "Capture permission denied");
                self.notifier.notice(Notice::PermissionRequired);
            }
            _ => {
                tracing::error!(error = %error, "Capture failed");
                self.notifier.notice(Notice::CaptureFailed);
            }
        }
    }
}

/// Signals `session_stopped` when dropped, including when the `run` future
/// itself is dropped mid-step.
struct StoppedOnDrop(Arc<dyn Notifier>);

impl Drop for StoppedOnDrop {
    fn drop(&mut self) {
        self.0.session_stopped();
    }
}

/// Await `fut` unless teardown fires first.
async fn until_teardown<T, F>(teardown: &mut watch::Receiver<bool>, fut: F) -> SnapResult<T>
where
    F: Future<Output = SnapResult<T>>,
{
    if *teardown.borrow() {
        return Err(SnapError::Cancelled);
    }
    tokio::select! {
        result = fut => result,
        _ = teardown.wait_for(|torn_down| *torn_down) => Err(SnapError::Cancelled),
    }
}
