//! Cubic Bézier curve predicates.

use super::line::point_on_polyline_within;
use super::tolerance::{CURVE_SEGMENTS, DEFAULT_THRESHOLD};
use kurbo::{CubicBez, Line, ParamCurve, Point};

/// A cubic Bézier curve given by four control points.
pub type Curve = CubicBez;

/// Approximate `curve` by [`CURVE_SEGMENTS`] chords.
///
/// The first and last vertices are the curve's own endpoints, so they are
/// hit exactly.
fn curve_to_polyline(curve: &Curve) -> Vec<Line> {
    let mut lines = Vec::with_capacity(CURVE_SEGMENTS);
    let mut prev = curve.p0;
    for i in 1..=CURVE_SEGMENTS {
        let next = if i == CURVE_SEGMENTS {
            curve.p3
        } else {
            curve.eval(i as f64 / CURVE_SEGMENTS as f64)
        };
        lines.push(Line::new(prev, next));
        prev = next;
    }
    lines
}

/// [`point_on_curve_within`] with the default threshold.
pub fn point_on_curve(point: Point, curve: &Curve) -> bool {
    point_on_curve_within(point, curve, DEFAULT_THRESHOLD)
}

/// Whether `point` is within `threshold` of `curve` for some `t` in `[0, 1]`.
pub fn point_on_curve_within(point: Point, curve: &Curve, threshold: f64) -> bool {
    point_on_polyline_within(point, &curve_to_polyline(curve), threshold)
}
