//! Ellipse predicates.

use super::point_rotate;
use super::tolerance::{DEFAULT_THRESHOLD, ELLIPSE_ITERATIONS, EPSILON};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// An ellipse given by its center, rotation and half-axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Point,
    /// Rotation in radians about `center`.
    pub angle: f64,
    pub half_width: f64,
    pub half_height: f64,
}

impl Ellipse {
    pub fn new(center: Point, angle: f64, half_width: f64, half_height: f64) -> Self {
        Self {
            center,
            angle,
            half_width,
            half_height,
        }
    }

    /// `point` in the unrotated frame centered on the ellipse.
    fn to_local(&self, point: Point) -> Point {
        let p = point_rotate(point, -self.angle, self.center);
        Point::new(p.x - self.center.x, p.y - self.center.y)
    }
}

/// Nearest point on the outline of an axis-aligned, origin-centered
/// ellipse with half-axes `a` and `b`.
///
/// Works in the positive quadrant with a fixed number of refinement steps
/// and mirrors the answer back into the quadrant of `point`.
pub fn nearest_point_on_ellipse(point: Point, a: f64, b: f64) -> Point {
    let (px, py) = (point.x.abs(), point.y.abs());

    if a < EPSILON || b < EPSILON {
        // Degenerate ellipse: a segment along one axis, or a point.
        let x = px.min(a.max(0.0));
        let y = py.min(b.max(0.0));
        let (x, y) = if a < EPSILON { (0.0, y) } else { (x, 0.0) };
        return Point::new(x.copysign(point.x), y.copysign(point.y));
    }

    let mut tx = std::f64::consts::FRAC_1_SQRT_2;
    let mut ty = std::f64::consts::FRAC_1_SQRT_2;
    for _ in 0..ELLIPSE_ITERATIONS {
        let x = a * tx;
        let y = b * ty;
        let ex = (a * a - b * b) * tx.powi(3) / a;
        let ey = (b * b - a * a) * ty.powi(3) / b;
        let (rx, ry) = (x - ex, y - ey);
        let (qx, qy) = (px - ex, py - ey);
        let r = rx.hypot(ry);
        let q = qx.hypot(qy);
        if q < EPSILON {
            break;
        }
        tx = ((qx * r / q + ex) / a).clamp(0.0, 1.0);
        ty = ((qy * r / q + ey) / b).clamp(0.0, 1.0);
        let t = tx.hypot(ty);
        if t < EPSILON {
            break;
        }
        tx /= t;
        ty /= t;
    }
    Point::new((a * tx).copysign(point.x), (b * ty).copysign(point.y))
}

fn distance_to_ellipse(point: Point, ellipse: &Ellipse) -> f64 {
    let local = ellipse.to_local(point);
    let nearest = nearest_point_on_ellipse(local, ellipse.half_width, ellipse.half_height);
    local.distance(nearest)
}

/// [`point_on_ellipse_within`] with the default threshold.
pub fn point_on_ellipse(point: Point, ellipse: &Ellipse) -> bool {
    point_on_ellipse_within(point, ellipse, DEFAULT_THRESHOLD)
}

/// Whether `point` is within `threshold` of the outline of `ellipse`.
pub fn point_on_ellipse_within(point: Point, ellipse: &Ellipse, threshold: f64) -> bool {
    distance_to_ellipse(point, ellipse) <= threshold
}

/// Whether `point` is inside `ellipse`, outline included.
pub fn point_in_ellipse(point: Point, ellipse: &Ellipse) -> bool {
    if ellipse.half_width < EPSILON || ellipse.half_height < EPSILON {
        return false;
    }
    let local = ellipse.to_local(point);
    (local.x / ellipse.half_width).powi(2) + (local.y / ellipse.half_height).powi(2) <= 1.0
}
