//! Geometric primitives: pure predicates over points, segments, polylines,
//! polygons, cubic curves and ellipses.
//!
//! Nothing here depends on the element model. All functions are total: on
//! degenerate or non-finite input they fall back to a documented answer
//! instead of panicking.

mod curve;
mod ellipse;
mod line;
mod polygon;
pub mod tolerance;

pub use curve::{Curve, point_on_curve, point_on_curve_within};
pub use ellipse::{
    Ellipse, nearest_point_on_ellipse, point_in_ellipse, point_on_ellipse,
    point_on_ellipse_within,
};
pub use line::{
    line_intersects_line, point_left_of_line, point_on_line, point_on_line_within,
    point_on_polyline, point_on_polyline_within, point_right_of_line, point_to_segment_dist,
    segments_cross,
};
pub use polygon::{
    point_in_polygon, point_on_polygon, point_on_polygon_within, polygon_bounds,
    polygon_in_polygon, polygon_reflect_x, polygon_reflect_y,
};

use kurbo::Affine;

pub use kurbo::{Line, Point};

/// A sequence of connected segments; consecutive lines share an endpoint.
pub type Polyline = [Line];

/// A closed shape given by its vertices; the closing edge is implicit.
pub type Polygon = [Point];

/// Rotate `point` by `angle` radians about `pivot`.
pub fn point_rotate(point: Point, angle: f64, pivot: Point) -> Point {
    Affine::rotate_about(angle, pivot) * point
}

/// Rotate `point` by `angle` radians about the origin.
pub fn point_rotate_origin(point: Point, angle: f64) -> Point {
    point_rotate(point, angle, Point::ORIGIN)
}

/// Rotate both endpoints of `line` by `angle` radians about `pivot`.
pub fn line_rotate(line: Line, angle: f64, pivot: Point) -> Line {
    let rot = Affine::rotate_about(angle, pivot);
    Line::new(rot * line.p0, rot * line.p1)
}

/// Whether both coordinates are finite.
#[inline]
pub fn is_finite_point(point: Point) -> bool {
    point.x.is_finite() && point.y.is_finite()
}
