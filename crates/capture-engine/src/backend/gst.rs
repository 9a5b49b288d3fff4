//! X11 frame grab through GStreamer.
//!
//! The render target is a one-buffer `ximagesrc` pipeline converted to RGBA
//! and parked in an `appsink`; the consumer pulls that single sample.

use std::sync::OnceLock;
use std::time::Duration;

use gst::prelude::*;
use gstreamer as gst;

use snapcrop_common::config::CaptureConfig;
use snapcrop_common::error::{SnapError, SnapResult};
use snapcrop_platform_core::DisplayMetrics;
use snapcrop_platform_linux::{
    detect_display_metrics, detect_display_server, has_x11_display, is_session_locked,
    DisplayServer,
};

use super::{CaptureBackend, CaptureGrant, FrameConsumer, RenderTarget};
use crate::frame::{FrameBuffer, RGBA_PIXEL_STRIDE};

pub struct GstBackend {
    top_inset_override: Option<u32>,
}

impl GstBackend {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            top_inset_override: config.top_inset_override,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for GstBackend {
    fn name(&self) -> &'static str {
        "gstreamer-x11"
    }

    async fn request_grant(&self) -> SnapResult<Box<dyn CaptureGrant>> {
        if !has_x11_display() {
            let reason = match detect_display_server() {
                DisplayServer::Wayland => "Wayland session without XWayland cannot be mirrored",
                _ => "no X11 display is reachable (DISPLAY is unset)",
            };
            return Err(SnapError::permission_denied(reason));
        }
        init_gstreamer()?;
        tracing::info!("X11 capture grant acquired");
        Ok(Box::new(X11Grant))
    }

    fn is_device_locked(&self) -> bool {
        is_session_locked()
    }

    fn display_metrics(&self) -> SnapResult<DisplayMetrics> {
        let metrics = detect_display_metrics()?;
        Ok(match self.top_inset_override {
            Some(inset) => metrics.with_status_bar_inset(inset),
            None => metrics,
        })
    }

    async fn open_render_target(
        &self,
        metrics: &DisplayMetrics,
    ) -> SnapResult<(Box<dyn RenderTarget>, Box<dyn FrameConsumer>)> {
        if metrics.is_empty() {
            return Err(SnapError::no_frame("display reports zero size"));
        }

        let launch = format!(
            "ximagesrc num-buffers=1 use-damage=false show-pointer=false{} ! videoconvert ! video/x-raw,format=RGBA ! appsink name=sink sync=false max-buffers=1 drop=true",
            region_fragment(metrics)
        );

        let element = gst::parse::launch(&launch)
            .map_err(|e| SnapError::platform(format!("Failed to build grab pipeline: {e}")))?;
        let pipeline = element
            .dynamic_cast::<gst::Pipeline>()
            .map_err(|_| SnapError::platform("Launch string did not produce a pipeline"))?;
        let sink = pipeline
            .by_name("sink")
            .ok_or_else(|| SnapError::platform("Grab pipeline has no appsink"))?;

        pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| SnapError::platform(format!("Failed to start grab pipeline: {e:?}")))?;

        Ok((
            Box::new(GstRenderTarget { pipeline }),
            Box::new(GstFrameConsumer { sink: Some(sink) }),
        ))
    }
}

fn region_fragment(metrics: &DisplayMetrics) -> String {
    let startx = metrics.x.max(0);
    let starty = metrics.y.max(0);
    let endx = startx + metrics.width as i32 - 1;
    let endy = starty + metrics.height as i32 - 1;
    format!(" startx={startx} starty={starty} endx={endx} endy={endy}")
}

fn init_gstreamer() -> SnapResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(SnapError::permission_denied(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

struct X11Grant;

impl CaptureGrant for X11Grant {
    fn revoke(&mut self) -> SnapResult<()> {
        tracing::debug!("X11 capture grant released");
        Ok(())
    }
}

struct GstRenderTarget {
    pipeline: gst::Pipeline,
}

impl RenderTarget for GstRenderTarget {
    fn release(&mut self) -> SnapResult<()> {
        self.pipeline
            .set_state(gst::State::Null)
            .map_err(|e| SnapError::platform(format!("Failed to stop grab pipeline: {e:?}")))?;
        Ok(())
    }
}

struct GstFrameConsumer {
    sink: Option<gst::Element>,
}

#[async_trait::async_trait]
impl FrameConsumer for GstFrameConsumer {
    async fn next_frame(&mut self, timeout: Duration) -> SnapResult<Option<FrameBuffer>> {
        let Some(sink) = self.sink.take() else {
            return Ok(None);
        };

        tokio::task::spawn_blocking(move || pull_frame(&sink, timeout))
            .await
            .map_err(|e| SnapError::platform(format!("frame read-back panicked: {e}")))?
    }

    fn close(&mut self) -> SnapResult<()> {
        self.sink = None;
        Ok(())
    }
}

fn pull_frame(sink: &gst::Element, timeout: Duration) -> SnapResult<Option<FrameBuffer>> {
    let timeout_ns = timeout.as_nanos() as u64;
    let Some(sample) = sink.emit_by_name::<Option<gst::Sample>>("try-pull-sample", &[&timeout_ns])
    else {
        tracing::warn!(timeout_ms = timeout.as_millis() as u64, "No frame within timeout");
        return Ok(None);
    };

    let caps = sample
        .caps()
        .ok_or_else(|| SnapError::invalid_frame("sample has no caps"))?;
    let structure = caps
        .structure(0)
        .ok_or_else(|| SnapError::invalid_frame("caps have no structure"))?;
    let width = structure
        .get::<i32>("width")
        .map_err(|e| SnapError::invalid_frame(format!("caps width: {e}")))?;
    let height = structure
        .get::<i32>("height")
        .map_err(|e| SnapError::invalid_frame(format!("caps height: {e}")))?;
    if width <= 0 || height <= 0 {
        return Ok(None);
    }

    let buffer = sample
        .buffer()
        .ok_or_else(|| SnapError::no_frame("sample has no buffer"))?;
    let map = buffer
        .map_readable()
        .map_err(|e| SnapError::invalid_frame(format!("buffer not readable: {e}")))?;
    let bytes = map.as_slice().to_vec();
    let row_stride = bytes.len() / height as usize;

    tracing::debug!(width, height, row_stride, "Frame read back");
    Ok(Some(FrameBuffer::new(
        width as u32,
        height as u32,
        RGBA_PIXEL_STRIDE,
        row_stride,
        bytes,
    )))
}
