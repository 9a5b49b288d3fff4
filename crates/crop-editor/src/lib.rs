//! Snapcrop Crop Editor
//!
//! Maintains the crop rectangle over a captured image shown in a view:
//! - **Fit transform:** image pixels to view space, uniform scale + centering
//! - **Pointer protocol:** press / move / release mapped through a pure
//!   touch state machine ([`touch::transition`])
//! - **Constraints:** containment in the image footprint, minimum size,
//!   optional aspect ratio
//! - **Export:** the crop mapped back to image pixels
//!
//! All methods are synchronous and meant to run on the UI thread.

pub mod aspect;
pub mod geometry;
pub mod touch;

pub use aspect::{parse_aspect, AspectPreset, AspectRatio};
pub use geometry::{CropConfig, CropGeometry, PixelRegion};
pub use touch::{Handle, PointerEvent, TouchMode, TouchState};
