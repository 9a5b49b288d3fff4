use std::time::Duration;

use snapcrop_common::error::{SnapError, SnapResult};
use snapcrop_platform_core::DisplayMetrics;

use crate::frame::FrameBuffer;

/// Abstract interface for a platform's screen mirroring capability.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Ask the platform for permission to mirror the display.
    async fn request_grant(&self) -> SnapResult<Box<dyn CaptureGrant>>;

    /// Whether the user session is currently locked.
    fn is_device_locked(&self) -> bool;

    /// Current window bounds, pixel density, and status-bar inset.
    fn display_metrics(&self) -> SnapResult<DisplayMetrics>;

    /// Allocate an off-screen render target sized to `metrics`, together with
    /// the single-slot consumer that reads it back.
    async fn open_render_target(
        &self,
        metrics: &DisplayMetrics,
    ) -> SnapResult<(Box<dyn RenderTarget>, Box<dyn FrameConsumer>)>;
}

/// A live permission to mirror the display.
pub trait CaptureGrant: Send + Sync {
    fn revoke(&mut self) -> SnapResult<()>;
}

/// An off-screen surface mirroring the display.
pub trait RenderTarget: Send {
    fn release(&mut self) -> SnapResult<()>;
}

/// Single-slot sink yielding at most one frame from a render target.
#[async_trait::async_trait]
pub trait FrameConsumer: Send {
    /// Wait up to `timeout` for a frame. `Ok(None)` means nothing arrived.
    async fn next_frame(&mut self, timeout: Duration) -> SnapResult<Option<FrameBuffer>>;

    fn close(&mut self) -> SnapResult<()>;
}

/// The grant, render target, and frame consumer of one capture, released
/// together.
///
/// [`CaptureResources::release`] closes the consumer, releases the target and
/// revokes the grant. Every step runs even if an earlier one fails, and a
/// second call is a no-op. Dropping the bundle releases it.
pub struct CaptureResources {
    grant: Option<Box<dyn CaptureGrant>>,
    target: Option<Box<dyn RenderTarget>>,
    consumer: Option<Box<dyn FrameConsumer>>,
}

impl CaptureResources {
    pub fn new(grant: Box<dyn CaptureGrant>) -> Self {
        Self {
            grant: Some(grant),
            target: None,
            consumer: None,
        }
    }

    /// Open a render target on `backend` and attach it to this bundle.
    pub async fn allocate_target(
        &mut self,
        backend: &dyn CaptureBackend,
        metrics: &DisplayMetrics,
    ) -> SnapResult<()> {
        if self.grant.is_none() {
            return Err(SnapError::permission_denied("capture grant already revoked"));
        }
        let (target, consumer) = backend.open_render_target(metrics).await?;
        self.attach(target, consumer);
        tracing::debug!(
            backend = backend.name(),
            width = metrics.width,
            height = metrics.height,
            "Render target allocated"
        );
        Ok(())
    }

    /// Attach an already-open target and consumer, releasing any previous pair.
    pub fn attach(&mut self, target: Box<dyn RenderTarget>, consumer: Box<dyn FrameConsumer>) {
        self.release_target();
        self.target = Some(target);
        self.consumer = Some(consumer);
    }

    pub fn has_render_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn consumer_mut(&mut self) -> Option<&mut (dyn FrameConsumer + 'static)> {
        self.consumer.as_deref_mut()
    }

    pub fn is_released(&self) -> bool {
        self.grant.is_none() && self.target.is_none() && self.consumer.is_none()
    }

    /// Tear down everything held. Safe to call repeatedly.
    pub fn release(&mut self) {
        self.release_target();
        if let Some(mut grant) = self.grant.take() {
            if let Err(e) = grant.revoke() {
                tracing::warn!(error = %e, "Failed to revoke capture grant");
            }
        }
    }

    fn release_target(&mut self) {
        if let Some(mut consumer) = self.consumer.take() {
            if let Err(e) = consumer.close() {
                tracing::warn!(error = %e, "Failed to close frame consumer");
            }
        }
        if let Some(mut target) = self.target.take() {
            if let Err(e) = target.release() {
                tracing::warn!(error = %e, "Failed to release render target");
            }
        }
    }
}

impl Drop for CaptureResources {
    fn drop(&mut self) {
        self.release();
    }
}

pub mod replay;

#[cfg(feature = "gstreamer")]
pub mod gst;

#[cfg(feature = "gstreamer")]
pub use self::gst::GstBackend;
pub use replay::ReplayBackend;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counts {
        revoked: AtomicUsize,
        released: AtomicUsize,
        closed: AtomicUsize,
    }

    struct Grant(Arc<Counts>);
    impl CaptureGrant for Grant {
        fn revoke(&mut self) -> SnapResult<()> {
            self.0.revoked.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Target(Arc<Counts>);
    impl RenderTarget for Target {
        fn release(&mut self) -> SnapResult<()> {
            self.0.released.fetch_add(1, Ordering::SeqCst);
            Err(SnapError::platform("surface already gone"))
        }
    }

    struct Consumer(Arc<Counts>);
    #[async_trait::async_trait]
    impl FrameConsumer for Consumer {
        async fn next_frame(&mut self, _timeout: Duration) -> SnapResult<Option<FrameBuffer>> {
            Ok(None)
        }

        fn close(&mut self) -> SnapResult<()> {
            self.0.closed.fetch_add(1, Ordering::SeqCst);
            Err(SnapError::platform("reader closed twice"))
        }
    }

    fn bundle(counts: &Arc<Counts>) -> CaptureResources {
        let mut resources = CaptureResources::new(Box::new(Grant(counts.clone())));
        resources.attach(
            Box::new(Target(counts.clone())),
            Box::new(Consumer(counts.clone())),
        );
        resources
    }

    #[test]
    fn release_runs_every_step_once() {
        let counts = Arc::new(Counts::default());
        let mut resources = bundle(&counts);

        resources.release();
        resources.release();
        drop(resources);

        assert_eq!(counts.closed.load(Ordering::SeqCst), 1);
        assert_eq!(counts.released.load(Ordering::SeqCst), 1);
        assert_eq!(counts.revoked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_releases_a_grant_without_target() {
        let counts = Arc::new(Counts::default());
        let resources = CaptureResources::new(Box::new(Grant(counts.clone())));
        assert!(!resources.has_render_target());
        drop(resources);

        assert_eq!(counts.revoked.load(Ordering::SeqCst), 1);
        assert_eq!(counts.released.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reattaching_releases_the_previous_pair() {
        let counts = Arc::new(Counts::default());
        let mut resources = bundle(&counts);
        resources.attach(
            Box::new(Target(counts.clone())),
            Box::new(Consumer(counts.clone())),
        );
        assert_eq!(counts.released.load(Ordering::SeqCst), 1);

        resources.release();
        assert!(resources.is_released());
        assert_eq!(counts.released.load(Ordering::SeqCst), 2);
    }
}
