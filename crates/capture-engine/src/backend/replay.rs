//! A backend that mirrors a PNG on disk instead of a live display.
//!
//! Frames are delivered with each row padded to `row_alignment` bytes, the way
//! hardware surfaces hand them out.

use std::path::{Path, PathBuf};
use std::time::Duration;

use snapcrop_common::error::{SnapError, SnapResult};
use snapcrop_platform_core::DisplayMetrics;

use super::{CaptureBackend, CaptureGrant, FrameConsumer, RenderTarget};
use crate::frame::FrameBuffer;

pub struct ReplayBackend {
    source: PathBuf,
    row_alignment: usize,
    status_bar_inset: u32,
    locked: bool,
    grant_denied: bool,
}

impl ReplayBackend {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            row_alignment: 64,
            status_bar_inset: 0,
            locked: false,
            grant_denied: false,
        }
    }

    pub fn with_row_alignment(mut self, alignment: usize) -> Self {
        self.row_alignment = alignment;
        self
    }

    pub fn with_status_bar_inset(mut self, inset: u32) -> Self {
        self.status_bar_inset = inset;
        self
    }

    /// Report the session as locked.
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Refuse every grant request.
    pub fn deny_grant(mut self) -> Self {
        self.grant_denied = true;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ReplayBackend {
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn request_grant(&self) -> SnapResult<Box<dyn CaptureGrant>> {
        if self.grant_denied {
            return Err(SnapError::permission_denied("replay grant refused"));
        }
        if !self.source.is_file() {
            return Err(SnapError::permission_denied(format!(
                "replay source {} does not exist",
                self.source.display()
            )));
        }
        Ok(Box::new(ReplayGrant))
    }

    fn is_device_locked(&self) -> bool {
        self.locked
    }

    fn display_metrics(&self) -> SnapResult<DisplayMetrics> {
        let (width, height) = image::image_dimensions(&self.source)?;
        Ok(DisplayMetrics::new(width, height).with_status_bar_inset(self.status_bar_inset))
    }

    async fn open_render_target(
        &self,
        metrics: &DisplayMetrics,
    ) -> SnapResult<(Box<dyn RenderTarget>, Box<dyn FrameConsumer>)> {
        let source = self.source.clone();
        let alignment = self.row_alignment;
        let expected = (metrics.width, metrics.height);

        let frame = tokio::task::spawn_blocking(move || -> SnapResult<FrameBuffer> {
            let image = image::open(&source)?.to_rgba8();
            if image.dimensions() != expected {
                tracing::warn!(
                    actual = ?image.dimensions(),
                    ?expected,
                    "Replay source changed size since metrics were read"
                );
            }
            Ok(FrameBuffer::from_image_padded(&image, alignment))
        })
        .await
        .map_err(|e| SnapError::platform(format!("replay loader panicked: {e}")))??;

        Ok((
            Box::new(ReplayTarget),
            Box::new(ReplayConsumer { frame: Some(frame) }),
        ))
    }
}

struct ReplayGrant;

impl CaptureGrant for ReplayGrant {
    fn revoke(&mut self) -> SnapResult<()> {
        tracing::debug!("Replay grant revoked");
        Ok(())
    }
}

struct ReplayTarget;

impl RenderTarget for ReplayTarget {
    fn release(&mut self) -> SnapResult<()> {
        tracing::debug!("Replay render target released");
        Ok(())
    }
}

struct ReplayConsumer {
    frame: Option<FrameBuffer>,
}

#[async_trait::async_trait]
impl FrameConsumer for ReplayConsumer {
    async fn next_frame(&mut self, _timeout: Duration) -> SnapResult<Option<FrameBuffer>> {
        Ok(self.frame.take())
    }

    fn close(&mut self) -> SnapResult<()> {
        self.frame = None;
        Ok(())
    }
}
