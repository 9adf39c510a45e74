//! Polygon predicates, bounds and reflections.

use super::line::{point_on_line_within, segments_cross};
use super::tolerance::DEFAULT_THRESHOLD;
use super::{Polygon, is_finite_point};
use kurbo::{Line, Point};

/// Edges of a polygon, including the implicit closing edge.
fn edges(polygon: &Polygon) -> impl Iterator<Item = Line> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| Line::new(polygon[i], polygon[(i + 1) % n]))
}

/// [`point_on_polygon_within`] with the default threshold.
pub fn point_on_polygon(point: Point, polygon: &Polygon) -> bool {
    point_on_polygon_within(point, polygon, DEFAULT_THRESHOLD)
}

/// Whether `point` lies on any edge of the closed `polygon`.
pub fn point_on_polygon_within(point: Point, polygon: &Polygon, threshold: f64) -> bool {
    edges(polygon).any(|edge| point_on_line_within(point, edge, threshold))
}

/// Whether `point` is strictly inside `polygon` (even-odd rule).
///
/// Boundary points are not inside.
pub fn point_in_polygon(point: Point, polygon: &Polygon) -> bool {
    if polygon.len() < 3 || point_on_polygon(point, polygon) {
        return false;
    }
    ray_cast(point, polygon)
}

fn ray_cast(point: Point, polygon: &Polygon) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn point_in_or_on_polygon(point: Point, polygon: &Polygon) -> bool {
    point_on_polygon(point, polygon) || ray_cast(point, polygon)
}

/// Axis-aligned bounds as `[min, max]`.
///
/// Points with a non-finite coordinate are skipped. With no finite point
/// the result is `[(+∞, +∞), (-∞, -∞)]`, the bounds of nothing.
pub fn polygon_bounds(polygon: &Polygon) -> [Point; 2] {
    polygon.iter().copied().filter(|p| is_finite_point(*p)).fold(
        [
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ],
        |[min, max], p| {
            [
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            ]
        },
    )
}

/// Reflect horizontally within the polygon's own bounds.
///
/// `factor` interpolates between the original (`0.0`) and the full mirror
/// image (`1.0`); `0.5` collapses every point onto the vertical centre line.
pub fn polygon_reflect_x(polygon: &Polygon, factor: f64) -> Vec<Point> {
    let [min, max] = polygon_bounds(polygon);
    if !min.x.is_finite() {
        return polygon.to_vec();
    }
    polygon
        .iter()
        .map(|p| Point::new(reflect(p.x, min.x + max.x, factor), p.y))
        .collect()
}

/// Reflect vertically within the polygon's own bounds.
///
/// See [`polygon_reflect_x`].
pub fn polygon_reflect_y(polygon: &Polygon, factor: f64) -> Vec<Point> {
    let [min, max] = polygon_bounds(polygon);
    if !min.y.is_finite() {
        return polygon.to_vec();
    }
    polygon
        .iter()
        .map(|p| Point::new(p.x, reflect(p.y, min.y + max.y, factor)))
        .collect()
}

#[inline]
fn reflect(value: f64, span: f64, factor: f64) -> f64 {
    (1.0 - factor) * value + factor * (span - value)
}

/// Whether `inner` is contained in `outer`.
///
/// Every inner vertex must be inside or on the boundary of `outer`, no inner
/// edge may cross an outer edge, and every inner edge midpoint must be
/// inside or on `outer` (catches edges leaving through an outer vertex).
pub fn polygon_in_polygon(inner: &Polygon, outer: &Polygon) -> bool {
    if inner.is_empty() || outer.len() < 3 {
        return false;
    }
    if !inner.iter().all(|p| point_in_or_on_polygon(*p, outer)) {
        return false;
    }
    let crosses = edges(inner).any(|a| edges(outer).any(|b| segments_cross(a, b)));
    if crosses {
        return false;
    }
    edges(inner).all(|edge| point_in_or_on_polygon(edge.midpoint(), outer))
}
