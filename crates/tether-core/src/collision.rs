//! Proximity tests between points, lines and bindable shapes.
//!
//! Every function works in the shape's local frame (unrotated, centered on
//! the origin) and maps results back to scene coordinates.

use crate::config::BindingConfig;
use crate::elements::{BindableElement, BindableKind};
use crate::geometry::tolerance::EPSILON;
use crate::geometry::{is_finite_point, nearest_point_on_ellipse, point_in_polygon};
use kurbo::{Point, Vec2};
use std::f64::consts::FRAC_1_SQRT_2;

/// A line `n·x + m·y + c = 0` with a unit normal `(n, m)`.
///
/// `c` is the signed distance of the origin to the line.
#[derive(Debug, Clone, Copy)]
struct LineEquation {
    n: f64,
    m: f64,
    c: f64,
}

impl LineEquation {
    /// The line through `a` and `b`, or `None` if they coincide.
    fn through(a: Point, b: Point) -> Option<Self> {
        let d = b - a;
        let len = d.hypot();
        if len < EPSILON || !len.is_finite() {
            return None;
        }
        let (n, m) = (d.y / len, -d.x / len);
        Some(Self {
            n,
            m,
            c: -(n * a.x + m * a.y),
        })
    }

    fn eval(&self, p: Point) -> f64 {
        self.n * p.x + self.m * p.y + self.c
    }
}

fn is_degenerate(element: &BindableElement) -> bool {
    !(element.half_width() >= EPSILON && element.half_height() >= EPSILON)
}

/// Widest gap at which `element`, sized `width` by `height`, still binds.
///
/// Scales with the smaller side and is clamped to the configured range.
pub fn max_binding_gap(
    element: &BindableElement,
    width: f64,
    height: f64,
    config: &BindingConfig,
) -> f64 {
    let shape_ratio = match element.kind {
        BindableKind::Diamond => FRAC_1_SQRT_2,
        _ => 1.0,
    };
    let smaller = width.abs().min(height.abs());
    (config.binding_gap_ratio * shape_ratio * smaller)
        .min(config.max_binding_gap)
        .max(config.min_binding_gap)
}

/// Whether `local` lies strictly inside the outline of `element`.
fn is_strictly_inside(element: &BindableElement, local: Point) -> bool {
    match element.kind {
        BindableKind::Ellipse => {
            if is_degenerate(element) {
                return false;
            }
            let (a, b) = (element.half_width(), element.half_height());
            (local.x / a).powi(2) + (local.y / b).powi(2) < 1.0
        }
        _ => point_in_polygon(local, &element.local_corners(1.0)),
    }
}

/// Signed distance from `point` to the outline of `element`, negative
/// inside.
pub fn distance_to_bindable_element(element: &BindableElement, point: Point) -> f64 {
    let local = element.to_local(point);
    let (hw, hh) = (element.half_width(), element.half_height());
    let (x, y) = (local.x.abs(), local.y.abs());
    match element.kind {
        BindableKind::Rectangle | BindableKind::Text => (x - hw).max(y - hh),
        BindableKind::Diamond => {
            let norm = hw.hypot(hh);
            if norm < EPSILON {
                return x.hypot(y);
            }
            (hh * x + hw * y - hh * hw) / norm
        }
        BindableKind::Ellipse => {
            let nearest = nearest_point_on_ellipse(local, hw, hh);
            let distance = local.distance(nearest);
            if is_strictly_inside(element, local) {
                -distance
            } else {
                distance
            }
        }
    }
}

/// Whether `point` is in the binding border of `element`: on or outside
/// the outline and closer to it than [`max_binding_gap`].
pub fn binding_border_test(
    element: &BindableElement,
    point: Point,
    config: &BindingConfig,
) -> bool {
    if !is_finite_point(point) {
        return false;
    }
    if is_strictly_inside(element, element.to_local(point)) {
        return false;
    }
    let threshold = max_binding_gap(element, element.width, element.height, config);
    let distance = distance_to_bindable_element(element, point);
    (0.0..threshold).contains(&distance)
}

/// Extent of the outline of `element` along the unit normal `(n, m)`.
fn support(element: &BindableElement, n: f64, m: f64) -> f64 {
    let (hw, hh) = (element.half_width(), element.half_height());
    match element.kind {
        BindableKind::Rectangle | BindableKind::Text => hw * n.abs() + hh * m.abs(),
        BindableKind::Diamond => (hw * n.abs()).max(hh * m.abs()),
        BindableKind::Ellipse => (hw * n).hypot(hh * m),
    }
}

/// Focus of the line from `adjacent` through `edge` relative to `element`.
///
/// The magnitude is the scale at which the shape's outline touches the
/// line (0 through the center, 1 through the outline's extreme point);
/// the sign tells which side of the line the center is on.
pub fn determine_focus_distance(element: &BindableElement, adjacent: Point, edge: Point) -> f64 {
    if is_degenerate(element) {
        return 0.0;
    }
    let Some(line) = LineEquation::through(element.to_local(adjacent), element.to_local(edge))
    else {
        return 0.0;
    };
    let extent = support(element, line.n, line.m);
    if extent < EPSILON {
        return 0.0;
    }
    line.c / extent
}

/// Candidate tangent points from `from` to the outline scaled by `scale`.
fn tangent_candidates(element: &BindableElement, scale: f64, from: Point) -> Vec<Point> {
    match element.kind {
        BindableKind::Ellipse => {
            let (a, b) = (scale * element.half_width(), scale * element.half_height());
            // Tangents to the unit circle, mapped back through the axis scaling.
            let unit = Vec2::new(from.x / a, from.y / b);
            let d = unit.hypot();
            let theta = unit.atan2();
            let spread = if d > 1.0 { (1.0 / d).acos() } else { 0.0 };
            [theta - spread, theta + spread]
                .into_iter()
                .map(|t| Point::new(a * t.cos(), b * t.sin()))
                .collect()
        }
        _ => element.local_corners(scale),
    }
}

/// Inverse of [`determine_focus_distance`]: the point on the outline of
/// `element` scaled by `|focus|` where the line from `adjacent` with that
/// focus touches it.
///
/// Zero focus maps to the center. For a rectangle or diamond containing
/// `adjacent` in its scaled outline the center is returned as well.
pub fn determine_focus_point(element: &BindableElement, focus: f64, adjacent: Point) -> Point {
    let center = element.center();
    if focus == 0.0 || !focus.is_finite() || is_degenerate(element) {
        return center;
    }
    let local = element.to_local(adjacent);
    let scale = focus.abs();
    if element.kind != BindableKind::Ellipse {
        let scaled = element.local_corners(scale);
        if point_in_polygon(local, &scaled) {
            return center;
        }
    }
    let orientation = focus.signum();
    tangent_candidates(element, scale, local)
        .into_iter()
        .filter_map(|candidate| {
            LineEquation::through(local, candidate).map(|line| (candidate, orientation * line.c))
        })
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(candidate, _)| element.to_global(candidate))
        .unwrap_or(center)
}

/// Parameters `t` where the line `p0 + t·(p1 - p0)` meets the circle.
fn line_circle_params(p0: Point, p1: Point, center: Point, radius: f64) -> Vec<f64> {
    let d = p1 - p0;
    let f = p0 - center;
    let a = d.dot(d);
    if a < EPSILON {
        return Vec::new();
    }
    let b = 2.0 * f.dot(d);
    let c = f.dot(f) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let root = disc.sqrt();
    if root == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    vec![(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)]
}

/// Where the infinite line meets the outline of a polygon offset outward
/// by `gap`, with rounded corners.
fn polygon_line_hits(
    corners: &[Point],
    line: &LineEquation,
    p0: Point,
    p1: Point,
    gap: f64,
) -> Vec<Point> {
    let mut hits = Vec::new();
    for (i, &start) in corners.iter().enumerate() {
        let end = corners[(i + 1) % corners.len()];
        let dir = end - start;
        let len = dir.hypot();
        if len < EPSILON {
            continue;
        }
        let mut normal = Vec2::new(dir.y, -dir.x) / len;
        let mid = start.midpoint(end).to_vec2();
        if normal.dot(mid) < 0.0 {
            normal = -normal;
        }
        let (a, b) = (start + normal * gap, end + normal * gap);
        let (da, db) = (line.eval(a), line.eval(b));
        if da * db > 0.0 || da == db {
            continue;
        }
        hits.push(a.lerp(b, da / (da - db)));
    }
    if gap >= EPSILON {
        for &corner in corners {
            hits.extend(
                line_circle_params(p0, p1, corner, gap)
                    .into_iter()
                    .map(|t| p0.lerp(p1, t)),
            );
        }
    }
    hits
}

/// Where the infinite line meets the ellipse with half-axes `a` and `b`.
fn ellipse_line_hits(a: f64, b: f64, p0: Point, p1: Point) -> Vec<Point> {
    let scale = |p: Point| Point::new(p.x / a, p.y / b);
    line_circle_params(scale(p0), scale(p1), Point::ORIGIN, 1.0)
        .into_iter()
        .map(|t| p0.lerp(p1, t))
        .collect()
}

/// The nearest and farthest points, seen from `line_start`, where the line
/// through `line_start` and `line_end` meets the outline of `element`
/// offset outward by `gap`.
///
/// Returns an empty vector when the line misses, only touches, or the
/// shape has no area.
pub fn intersect_element_with_line(
    element: &BindableElement,
    line_start: Point,
    line_end: Point,
    gap: f64,
) -> Vec<Point> {
    if is_degenerate(element) {
        return Vec::new();
    }
    let gap = if gap.is_finite() { gap.max(0.0) } else { 0.0 };
    let (p0, p1) = (element.to_local(line_start), element.to_local(line_end));
    let Some(line) = LineEquation::through(p0, p1) else {
        return Vec::new();
    };
    let mut hits = match element.kind {
        BindableKind::Ellipse => {
            let outline = element.local_ellipse(gap);
            ellipse_line_hits(outline.half_width, outline.half_height, p0, p1)
        }
        _ => polygon_line_hits(&element.local_corners(1.0), &line, p0, p1, gap),
    };
    if hits.len() < 2 {
        return Vec::new();
    }
    hits.sort_by(|a, b| a.distance(p0).total_cmp(&b.distance(p0)));
    let (first, last) = (hits[0], hits[hits.len() - 1]);
    vec![element.to_global(first), element.to_global(last)]
}
