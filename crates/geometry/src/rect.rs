//! Points and edge-based rectangles.

use serde::{Deserialize, Serialize};

/// Slack used when comparing edges that went through float arithmetic.
pub const EDGE_EPSILON: f64 = 1e-6;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Component-wise difference `self - origin`.
    pub fn delta_from(&self, origin: &Point2D) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// An axis-aligned rectangle stored by its edges.
///
/// A well-formed rectangle has `left <= right` and `top <= bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl RectF {
    pub const EMPTY: RectF = RectF {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// Rectangle of size `w x h` centered at `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Width over height, or `None` for a zero-height rectangle.
    pub fn aspect_ratio(&self) -> Option<f64> {
        let h = self.height();
        (h.abs() > f64::EPSILON).then(|| self.width() / h)
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Whether a point lies inside or on the boundary.
    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Whether `other` lies fully inside this rectangle (edges may touch).
    pub fn contains_rect(&self, other: &RectF) -> bool {
        other.left >= self.left - EDGE_EPSILON
            && other.top >= self.top - EDGE_EPSILON
            && other.right <= self.right + EDGE_EPSILON
            && other.bottom <= self.bottom + EDGE_EPSILON
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Translate so the rectangle sits inside `bounds`, keeping its size.
    ///
    /// A dimension larger than the bounds is clamped to the bounds.
    pub fn shifted_inside(&self, bounds: &RectF) -> RectF {
        let (left, right) = shift_span(self.left, self.right, bounds.left, bounds.right);
        let (top, bottom) = shift_span(self.top, self.bottom, bounds.top, bounds.bottom);
        RectF::new(left, top, right, bottom)
    }

    /// Scale uniformly about the center until the rectangle fits in
    /// `bounds`, then translate it inside. The aspect ratio is preserved.
    pub fn fitted_inside(&self, bounds: &RectF) -> RectF {
        let w = self.width();
        let h = self.height();
        if w <= 0.0 || h <= 0.0 {
            return self.shifted_inside(bounds);
        }
        let scale = (bounds.width() / w).min(bounds.height() / h).min(1.0);
        let c = self.center();
        RectF::centered(c.x, c.y, w * scale, h * scale).shifted_inside(bounds)
    }
}

fn shift_span(lo: f64, hi: f64, min: f64, max: f64) -> (f64, f64) {
    let len = hi - lo;
    if len >= max - min {
        return (min, max);
    }
    if lo < min {
        (min, min + len)
    } else if hi > max {
        (max - len, max)
    } else {
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn centered_rect_reports_center() {
        let r = RectF::centered(400.0, 500.0, 800.0, 800.0);
        assert_eq!(r, RectF::new(0.0, 100.0, 800.0, 900.0));
        assert_eq!(r.center(), Point2D::new(400.0, 500.0));
    }

    #[test]
    fn shifted_inside_keeps_size() {
        let bounds = RectF::new(0.0, 0.0, 1000.0, 2000.0);
        let r = RectF::new(900.0, -50.0, 1200.0, 250.0).shifted_inside(&bounds);
        assert_eq!(r, RectF::new(700.0, 0.0, 1000.0, 300.0));
    }

    #[test]
    fn shifted_inside_clamps_oversized_dimension() {
        let bounds = RectF::new(0.0, 0.0, 100.0, 100.0);
        let r = RectF::new(-10.0, 20.0, 150.0, 60.0).shifted_inside(&bounds);
        assert_eq!(r, RectF::new(0.0, 20.0, 100.0, 60.0));
    }

    #[test]
    fn fitted_inside_preserves_ratio() {
        let bounds = RectF::new(0.0, 0.0, 1000.0, 500.0);
        let r = RectF::centered(500.0, 250.0, 800.0, 800.0).fitted_inside(&bounds);
        assert!(bounds.contains_rect(&r));
        assert!((r.aspect_ratio().unwrap() - 1.0).abs() < 1e-9);
        assert!((r.height() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn point_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn fitted_rect_lies_inside_bounds(
            x in -500.0f64..1500.0,
            y in -500.0f64..1500.0,
            w in 1.0f64..2000.0,
            h in 1.0f64..2000.0,
        ) {
            let bounds = RectF::new(0.0, 0.0, 1000.0, 600.0);
            let rect = RectF::from_xywh(x, y, w, h);
            let fitted = rect.fitted_inside(&bounds);
            prop_assert!(bounds.contains_rect(&fitted));
            prop_assert!((fitted.width() / fitted.height() - w / h).abs() < 1e-6 * (w / h).max(1.0));

            let shifted = rect.shifted_inside(&bounds);
            prop_assert!(bounds.contains_rect(&shifted));
        }
    }
}
