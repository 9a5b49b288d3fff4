//! 2D affine transforms.
//!
//! [`Affine2D`] maps `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`. The
//! `post_*` builders append an operation, so `m.post_scale(s).post_translate(dx, dy)`
//! scales first and translates second.

use serde::{Deserialize, Serialize};

use crate::rect::{Point2D, RectF};

/// Determinants smaller than this are treated as singular.
pub const SINGULAR_EPSILON: f64 = 1e-12;

/// A 2x3 affine matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Collapses everything onto the origin. Never invertible.
    pub const ZERO: Affine2D = Affine2D {
        a: 0.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    pub fn translate(dx: f64, dy: f64) -> Self {
        Self {
            e: dx,
            f: dy,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `degrees` (clockwise in y-down space) about `(px, py)`.
    pub fn rotation_about(degrees: f64, px: f64, py: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: px - cos * px + sin * py,
            f: py - sin * px - cos * py,
        }
    }

    /// `other ∘ self`: apply `self`, then `other`.
    pub fn then(&self, other: &Affine2D) -> Affine2D {
        Affine2D {
            a: other.a * self.a + other.c * self.b,
            b: other.b * self.a + other.d * self.b,
            c: other.a * self.c + other.c * self.d,
            d: other.b * self.c + other.d * self.d,
            e: other.a * self.e + other.c * self.f + other.e,
            f: other.b * self.e + other.d * self.f + other.f,
        }
    }

    pub fn post_scale(&self, sx: f64, sy: f64) -> Affine2D {
        self.then(&Affine2D::scale(sx, sy))
    }

    pub fn post_translate(&self, dx: f64, dy: f64) -> Affine2D {
        self.then(&Affine2D::translate(dx, dy))
    }

    pub fn post_rotate(&self, degrees: f64, px: f64, py: f64) -> Affine2D {
        self.then(&Affine2D::rotation_about(degrees, px, py))
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform, or `None` if the matrix is singular.
    pub fn invert(&self) -> Option<Affine2D> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine2D {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    pub fn map_point(&self, p: Point2D) -> Point2D {
        Point2D::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Axis-aligned bounding box of the four mapped corners.
    pub fn map_rect(&self, r: &RectF) -> RectF {
        bounding_box(&self.map_corners(r))
    }

    /// The four corners of `r` mapped through this transform, in
    /// top-left, top-right, bottom-right, bottom-left order.
    pub fn map_corners(&self, r: &RectF) -> [Point2D; 4] {
        [
            self.map_point(Point2D::new(r.left, r.top)),
            self.map_point(Point2D::new(r.right, r.top)),
            self.map_point(Point2D::new(r.right, r.bottom)),
            self.map_point(Point2D::new(r.left, r.bottom)),
        ]
    }
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Smallest axis-aligned rectangle containing every point.
pub fn bounding_box(points: &[Point2D]) -> RectF {
    let mut r = RectF::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for p in points {
        r.left = r.left.min(p.x);
        r.top = r.top.min(p.y);
        r.right = r.right.max(p.x);
        r.bottom = r.bottom.max(p.y);
    }
    if points.is_empty() {
        RectF::EMPTY
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point2D, b: Point2D) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn post_ops_apply_in_order() {
        let m = Affine2D::IDENTITY.post_scale(2.0, 2.0).post_translate(10.0, 5.0);
        assert!(close(
            m.map_point(Point2D::new(3.0, 4.0)),
            Point2D::new(16.0, 13.0)
        ));
    }

    #[test]
    fn inverse_undoes_fit_and_rotation() {
        let m = Affine2D::IDENTITY
            .post_scale(0.5, 0.5)
            .post_translate(40.0, 0.0)
            .post_rotate(90.0, 500.0, 500.0);
        let inv = m.invert().unwrap();
        let p = Point2D::new(123.0, 456.0);
        assert!(close(inv.map_point(m.map_point(p)), p));
    }

    #[test]
    fn zero_scale_is_singular() {
        assert!(Affine2D::ZERO.invert().is_none());
        assert!(Affine2D::scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn quarter_turn_about_center_swaps_axes() {
        let m = Affine2D::rotation_about(90.0, 50.0, 50.0);
        assert!(close(
            m.map_point(Point2D::new(100.0, 50.0)),
            Point2D::new(50.0, 100.0)
        ));
        let r = m.map_rect(&RectF::new(0.0, 25.0, 100.0, 75.0));
        assert!((r.width() - 50.0).abs() < 1e-9);
        assert!((r.height() - 100.0).abs() < 1e-9);
    }
}
