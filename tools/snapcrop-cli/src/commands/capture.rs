//! Capture the screen, then hand the artifact to the editor flow.

use std::path::PathBuf;
use std::sync::Arc;

use snapcrop_capture_engine::{CaptureBackend, CaptureRequest, CaptureSession, ReplayBackend};
use snapcrop_common::config::{AppConfig, PreferencesStore};
use snapcrop_common::temp::TempCache;

use crate::collaborators::TracingNotifier;
use crate::{BackendKind, EditArgs};

pub async fn run(
    config: &AppConfig,
    prefs: Arc<dyn PreferencesStore>,
    backend: BackendKind,
    source: Option<PathBuf>,
    inset: Option<u32>,
    edit: EditArgs,
) -> anyhow::Result<()> {
    let mut capture_config = config.capture.clone();
    if inset.is_some() {
        capture_config.top_inset_override = inset;
    }

    let backend = build_backend(backend, source, &capture_config)?;
    let request = CaptureRequest::from_preferences(&prefs.snapshot());

    println!("Starting capture ({})", backend.name());
    if let Some(delay) = request.delay() {
        println!("  Delay: {}s", delay.as_secs());
    }

    let mut session = CaptureSession::new(
        backend,
        TempCache::from_config(&config.storage),
        Arc::new(TracingNotifier),
        capture_config,
    );

    // Ctrl+C tears the session down from whatever step it is in.
    let teardown = session.teardown_handle();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            teardown.teardown();
        }
    });

    let result = session.run(&request).await;
    watcher.abort();
    let outcome = result.map_err(|e| anyhow::anyhow!("Capture failed: {e}"))?;

    println!("Captured {}x{}", outcome.width, outcome.height);
    super::edit::run(config, prefs, outcome.artifact, edit).await
}

fn build_backend(
    kind: BackendKind,
    source: Option<PathBuf>,
    capture: &snapcrop_common::config::CaptureConfig,
) -> anyhow::Result<Arc<dyn CaptureBackend>> {
    match kind {
        BackendKind::Replay => {
            let source =
                source.ok_or_else(|| anyhow::anyhow!("--source is required for the replay backend"))?;
            let mut backend = ReplayBackend::new(source)
                .with_row_alignment(capture.replay_row_alignment as usize)
                .locked(snapcrop_platform_linux::is_session_locked());
            if let Some(inset) = capture.top_inset_override {
                backend = backend.with_status_bar_inset(inset);
            }
            Ok(Arc::new(backend))
        }
        #[cfg(feature = "gstreamer")]
        BackendKind::Gst => Ok(Arc::new(snapcrop_capture_engine::GstBackend::new(capture))),
        #[cfg(not(feature = "gstreamer"))]
        BackendKind::Gst => Err(anyhow::anyhow!(
            "snapcrop was built without the gstreamer feature; rebuild with --features gstreamer"
        )),
    }
}
