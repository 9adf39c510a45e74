//! Segment and polyline predicates.

use super::Polyline;
use super::tolerance::{DEFAULT_THRESHOLD, EPSILON, near_zero};
use kurbo::{Line, Point, Vec2};

/// Cross product of `line`'s direction with the vector from its start to `point`.
fn side(point: Point, line: Line) -> f64 {
    let dir = line.p1 - line.p0;
    let rel = point - line.p0;
    dir.cross(rel)
}

/// Whether `point` is strictly on the left of the directed `line`.
pub fn point_left_of_line(point: Point, line: Line) -> bool {
    side(point, line) > 0.0
}

/// Whether `point` is strictly on the right of the directed `line`.
pub fn point_right_of_line(point: Point, line: Line) -> bool {
    side(point, line) < 0.0
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// [`point_on_line_within`] with the default threshold.
pub fn point_on_line(point: Point, line: Line) -> bool {
    point_on_line_within(point, line, DEFAULT_THRESHOLD)
}

/// Whether `point` is within `threshold` of the segment `line`.
///
/// A point at distance exactly zero is always on the line, so a zero
/// threshold still accepts exact hits.
pub fn point_on_line_within(point: Point, line: Line, threshold: f64) -> bool {
    let distance = point_to_segment_dist(point, line.p0, line.p1);
    distance == 0.0 || distance < threshold
}

/// [`point_on_polyline_within`] with the default threshold.
pub fn point_on_polyline(point: Point, polyline: &Polyline) -> bool {
    point_on_polyline_within(point, polyline, DEFAULT_THRESHOLD)
}

/// Whether `point` is within `threshold` of any segment of `polyline`.
pub fn point_on_polyline_within(point: Point, polyline: &Polyline, threshold: f64) -> bool {
    polyline
        .iter()
        .any(|line| point_on_line_within(point, *line, threshold))
}

/// Whether two segments share at least one point.
///
/// Touching endpoints and collinear overlap count as intersecting;
/// collinear segments that do not overlap do not.
pub fn line_intersects_line(a: Line, b: Line) -> bool {
    if a.p0 == b.p0 || a.p1 == b.p1 {
        return true;
    }
    if point_on_line(a.p0, b) || point_on_line(a.p1, b) {
        return true;
    }
    if point_on_line(b.p0, a) || point_on_line(b.p1, a) {
        return true;
    }

    let da = a.p1 - a.p0;
    let db = b.p1 - b.p0;
    let denom = db.y * da.x - db.x * da.y;
    if near_zero(denom, da.hypot() * db.hypot()) {
        // Parallel and not touching.
        return false;
    }
    let delta: Vec2 = a.p0 - b.p0;
    let quot_a = (db.x * delta.y - db.y * delta.x) / denom;
    let quot_b = (da.x * delta.y - da.y * delta.x) / denom;
    quot_a > 0.0 && quot_a < 1.0 && quot_b > 0.0 && quot_b < 1.0
}

/// Whether two segments cross at a single point interior to both.
///
/// Unlike [`line_intersects_line`], touching and collinear overlap are not
/// crossings.
pub fn segments_cross(a: Line, b: Line) -> bool {
    let scale = (a.p1 - a.p0).hypot() * (b.p1 - b.p0).hypot();
    let orient = |line: Line, p: Point| {
        let s = side(p, line);
        if near_zero(s, scale) { 0.0 } else { s.signum() }
    };
    let d1 = orient(b, a.p0);
    let d2 = orient(b, a.p1);
    let d3 = orient(a, b.p0);
    let d4 = orient(a, b.p1);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}
