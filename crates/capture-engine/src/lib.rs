//! Snapcrop Capture Engine
//!
//! Captures one still frame of the display and writes it to a temp artifact
//! for the editor. A [`CaptureSession`] walks the permission, lock, delay,
//! acquisition, and trim steps strictly in order.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                CaptureSession                 │
//! │  ┌────────────┐  ┌──────────────────────────┐ │
//! │  │ SlotGuard  │  │    CaptureResources      │ │
//! │  │ (one per   │  │ grant / target / consumer│ │
//! │  │  process)  │  └────────────┬─────────────┘ │
//! │  └────────────┘               │ FrameBuffer   │
//! │                               ▼               │
//! │            extract_frame → trim_status_bar    │
//! │                               │               │
//! │                               ▼               │
//! │                  temp_<millis>.png (TempCache)│
//! └───────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod frame;
pub mod session;
pub mod slot;

pub use backend::{
    CaptureBackend, CaptureGrant, CaptureResources, FrameConsumer, RenderTarget, ReplayBackend,
};
#[cfg(feature = "gstreamer")]
pub use backend::GstBackend;
pub use frame::{extract_frame, trim_status_bar, FrameBuffer, Screenshot};
pub use session::*;
pub use slot::{is_capture_in_progress, SlotGuard, SlotRegistry};
