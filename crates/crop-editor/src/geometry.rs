//! Crop rectangle state over a fitted image.
//!
//! Coordinates are in view space unless noted. The forward transform maps
//! image pixels to the view: a uniform scale that fits the image inside the
//! view, plus a centering translation. `bitmap_rect` is the image's footprint
//! in the view and always contains `crop_rect`.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use snapcrop_common::error::{SnapError, SnapResult};
use snapcrop_geometry::{Affine2D, Point2D, RectF};

use crate::aspect::AspectRatio;
use crate::touch::{transition, Effect, Handle, PointerEvent, TouchMode, TouchState};

/// Tunables for pointer handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropConfig {
    /// Smallest crop width and height a resize may produce.
    pub min_size: f64,
    /// Distance from a handle within which a press grabs it.
    pub handle_touch_radius: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            min_size: 100.0,
            handle_touch_radius: 50.0,
        }
    }
}

/// A crop region in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct CropGeometry {
    config: CropConfig,
    image_width: u32,
    image_height: u32,
    view_width: f64,
    view_height: f64,
    forward: Affine2D,
    bitmap_rect: RectF,
    crop_rect: RectF,
    aspect: Option<AspectRatio>,
    touch: TouchState,
}

impl Default for CropGeometry {
    fn default() -> Self {
        Self::new(CropConfig::default())
    }
}

impl CropGeometry {
    pub fn new(config: CropConfig) -> Self {
        Self {
            config,
            image_width: 0,
            image_height: 0,
            view_width: 0.0,
            view_height: 0.0,
            forward: Affine2D::ZERO,
            bitmap_rect: RectF::EMPTY,
            crop_rect: RectF::EMPTY,
            aspect: None,
            touch: TouchState::Idle,
        }
    }

    /// Geometry for an image shown in a view of the given size.
    pub fn for_image(
        image_width: u32,
        image_height: u32,
        view_width: f64,
        view_height: f64,
    ) -> Self {
        let mut geometry = Self {
            image_width,
            image_height,
            ..Self::default()
        };
        geometry.set_view_size(view_width, view_height);
        geometry
    }

    /// Load a new image. Refits and resets the crop.
    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.image_width = width;
        self.image_height = height;
        self.fit();
    }

    /// The view was laid out at a new size. Refits and resets the crop.
    pub fn set_view_size(&mut self, width: f64, height: f64) {
        self.view_width = width.max(0.0);
        self.view_height = height.max(0.0);
        self.fit();
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    pub fn view_size(&self) -> (f64, f64) {
        (self.view_width, self.view_height)
    }

    pub fn forward_transform(&self) -> &Affine2D {
        &self.forward
    }

    pub fn bitmap_rect(&self) -> RectF {
        self.bitmap_rect
    }

    pub fn crop_rect(&self) -> RectF {
        self.crop_rect
    }

    pub fn aspect_ratio(&self) -> Option<AspectRatio> {
        self.aspect
    }

    pub fn touch_state(&self) -> TouchState {
        self.touch
    }

    pub fn touch_mode(&self) -> TouchMode {
        self.touch.mode()
    }

    pub fn active_handle(&self) -> Handle {
        self.touch.handle()
    }

    /// Anchor points of the eight resize handles, in hit-test order.
    pub fn handles(&self) -> [(Handle, Point2D); 8] {
        Handle::RESIZE.map(|handle| {
            let anchor = handle.anchor(&self.crop_rect).unwrap_or(Point2D::ORIGIN);
            (handle, anchor)
        })
    }

    /// Replace the crop rectangle directly.
    ///
    /// The rectangle goes through the same constraints as a resize: each side
    /// grows about its center to the minimum size, an active ratio reshapes
    /// it, and the result is moved into the image footprint.
    pub fn set_crop_rect(&mut self, rect: RectF) {
        let bounds = self.bitmap_rect;
        let min_w = self.config.min_size.min(bounds.width());
        let min_h = self.config.min_size.min(bounds.height());
        let mut r = rect;

        if r.width() < min_w {
            let cx = r.center().x;
            r.left = cx - min_w / 2.0;
            r.right = cx + min_w / 2.0;
        }
        if r.height() < min_h {
            let cy = r.center().y;
            r.top = cy - min_h / 2.0;
            r.bottom = cy + min_h / 2.0;
        }

        self.crop_rect = match self.aspect {
            Some(ratio) => {
                if r.aspect_ratio().map_or(true, |c| !ratio.matches(c)) {
                    r = normalize_to_ratio(&r, ratio);
                }
                r.fitted_inside(&bounds)
            }
            None => r.shifted_inside(&bounds),
        };
    }

    /// Feed one pointer event through the touch state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let (next, effect) = transition(
            self.touch,
            event,
            &self.crop_rect,
            self.config.handle_touch_radius,
        );
        self.touch = next;
        match effect {
            Effect::None => {}
            Effect::Translate { dx, dy } => self.translate(dx, dy),
            Effect::Resize { handle, dx, dy } => self.resize(handle, dx, dy),
        }
    }

    pub fn press(&mut self, x: f64, y: f64) {
        self.handle_pointer(PointerEvent::Press(Point2D::new(x, y)));
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.handle_pointer(PointerEvent::Move(Point2D::new(x, y)));
    }

    pub fn release(&mut self) {
        self.handle_pointer(PointerEvent::Release);
    }

    /// Constrain the crop to `ratio`, or lift the constraint with `None`.
    pub fn set_aspect_ratio(&mut self, ratio: Option<AspectRatio>) {
        self.aspect = ratio;
        if let Some(ratio) = ratio {
            let current = self.crop_rect.aspect_ratio();
            if current.map_or(true, |c| !ratio.matches(c)) {
                self.crop_rect = normalize_to_ratio(&self.crop_rect, ratio)
                    .fitted_inside(&self.bitmap_rect);
            }
        }
        tracing::debug!(aspect = ?self.aspect, crop = ?self.crop_rect, "Aspect ratio set");
    }

    /// Rotate the displayed image about the view center.
    ///
    /// Only the forward transform changes. `bitmap_rect` and `crop_rect`
    /// keep their view-space coordinates, so after a rotation the crop selects
    /// whatever image pixels now lie under it.
    pub fn rotate(&mut self, degrees: f64) {
        self.forward = self.forward.post_rotate(
            degrees,
            self.view_width / 2.0,
            self.view_height / 2.0,
        );
        tracing::debug!(degrees, "Display transform rotated");
    }

    /// Drop rotation and reset the crop to the whole image.
    pub fn reset(&mut self) {
        self.fit();
    }

    /// The crop as a pixel region of the image.
    ///
    /// Fails with `DegenerateTransform` when the forward transform cannot
    /// be inverted. Otherwise the region is at least 1x1 pixels.
    pub fn export_region(&self) -> SnapResult<PixelRegion> {
        let inverse = self.forward.invert().ok_or(SnapError::DegenerateTransform)?;
        let bounds = inverse.map_rect(&self.crop_rect);

        let w = self.image_width as f64;
        let h = self.image_height as f64;
        let left = snap_floor(bounds.left).clamp(0.0, (w - 1.0).max(0.0));
        let top = snap_floor(bounds.top).clamp(0.0, (h - 1.0).max(0.0));
        let right = snap_floor(bounds.right).clamp(0.0, w);
        let bottom = snap_floor(bounds.bottom).clamp(0.0, h);

        Ok(PixelRegion {
            x: left as u32,
            y: top as u32,
            width: ((right - left) as u32).max(1),
            height: ((bottom - top) as u32).max(1),
        })
    }

    /// Cut the crop out of `image`.
    pub fn export(&self, image: &RgbaImage) -> SnapResult<RgbaImage> {
        let region = self.export_region()?;
        let cropped =
            image::imageops::crop_imm(image, region.x, region.y, region.width, region.height)
                .to_image();
        tracing::debug!(?region, "Crop exported");
        Ok(cropped)
    }

    fn fit(&mut self) {
        self.touch = TouchState::Idle;

        let iw = self.image_width as f64;
        let ih = self.image_height as f64;
        if iw <= 0.0 || ih <= 0.0 || self.view_width <= 0.0 || self.view_height <= 0.0 {
            self.forward = Affine2D::ZERO;
            self.bitmap_rect = RectF::EMPTY;
            self.crop_rect = RectF::EMPTY;
            return;
        }

        let scale = (self.view_width / iw).min(self.view_height / ih);
        let dx = (self.view_width - iw * scale) / 2.0;
        let dy = (self.view_height - ih * scale) / 2.0;
        self.forward = Affine2D::scale(scale, scale).post_translate(dx, dy);
        self.bitmap_rect = self.forward.map_rect(&RectF::new(0.0, 0.0, iw, ih));
        self.crop_rect = self.bitmap_rect;

        if let Some(ratio) = self.aspect {
            self.crop_rect =
                normalize_to_ratio(&self.crop_rect, ratio).fitted_inside(&self.bitmap_rect);
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.crop_rect = self.crop_rect.offset(dx, dy).shifted_inside(&self.bitmap_rect);
    }

    fn resize(&mut self, handle: Handle, dx: f64, dy: f64) {
        let bounds = self.bitmap_rect;
        let min_w = self.config.min_size.min(bounds.width());
        let min_h = self.config.min_size.min(bounds.height());
        let mut r = self.crop_rect;

        if handle.moves_left() {
            r.left = (r.left + dx).min(r.right - min_w).max(bounds.left);
        }
        if handle.moves_right() {
            r.right = (r.right + dx).max(r.left + min_w).min(bounds.right);
        }
        if handle.moves_top() {
            r.top = (r.top + dy).min(r.bottom - min_h).max(bounds.top);
        }
        if handle.moves_bottom() {
            r.bottom = (r.bottom + dy).max(r.top + min_h).min(bounds.bottom);
        }

        if let Some(ratio) = self.aspect {
            r = normalize_to_ratio(&r, ratio).fitted_inside(&bounds);
        }
        self.crop_rect = r;
    }
}

/// Floor, treating values within float noise of the next integer as that integer.
fn snap_floor(v: f64) -> f64 {
    (v + 1e-6).floor()
}

/// Reshape `rect` to `ratio` around its center.
///
/// A rectangle wider than the ratio keeps its width and grows in height; a
/// narrower one keeps its height and grows in width.
fn normalize_to_ratio(rect: &RectF, ratio: AspectRatio) -> RectF {
    let w = rect.width();
    let h = rect.height();
    if w <= 0.0 || h <= 0.0 {
        return *rect;
    }
    let target = ratio.value();
    let c = rect.center();
    if w / h > target {
        RectF::centered(c.x, c.y, w, w / target)
    } else {
        RectF::centered(c.x, c.y, h * target, h)
    }
}
