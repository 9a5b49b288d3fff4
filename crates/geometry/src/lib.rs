//! Snapcrop Geometry
//!
//! Plain 2D value types used by the crop editor:
//! - **Point2D:** a position in view or image space
//! - **RectF:** an edge-based rectangle (`left/top/right/bottom`)
//! - **Affine2D:** a 2x3 affine matrix mapping image space to view space
//!
//! Everything here is `Copy` and free of I/O.

pub mod rect;
pub mod transform;

pub use rect::*;
pub use transform::*;
