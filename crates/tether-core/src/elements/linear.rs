//! Lines and arrows.

use super::ElementId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of linear element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinearKind {
    Line,
    #[default]
    Arrow,
}

/// Which end of a linear element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingEdge {
    Start,
    End,
}

impl BindingEdge {
    pub fn opposite(self) -> Self {
        match self {
            BindingEdge::Start => BindingEdge::End,
            BindingEdge::End => BindingEdge::Start,
        }
    }
}

/// Attachment of one end of a linear element to a bindable element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointBinding {
    /// The bound shape.
    pub element_id: ElementId,
    /// Signed anchor position inside the shape, relative to the line's
    /// adjacent point.
    pub focus: f64,
    /// Clearance kept between the endpoint and the shape's outline.
    pub gap: f64,
}

impl PointBinding {
    pub fn new(element_id: ElementId, focus: f64, gap: f64) -> Self {
        Self {
            element_id,
            focus,
            gap,
        }
    }
}

/// A polyline with optional bindings at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearElement {
    pub(crate) id: ElementId,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub is_deleted: bool,
    pub kind: LinearKind,
    /// Origin that `points` are relative to.
    pub x: f64,
    pub y: f64,
    /// Local points; the first is always `(0, 0)`.
    pub points: Vec<Point>,
    #[serde(default)]
    pub start_binding: Option<PointBinding>,
    #[serde(default)]
    pub end_binding: Option<PointBinding>,
}

impl LinearElement {
    /// Create a linear element through `points` given in global coordinates.
    pub fn new(kind: LinearKind, points: Vec<Point>) -> Self {
        let origin = points.first().copied().unwrap_or(Point::ORIGIN);
        let points = points
            .into_iter()
            .map(|p| (p - origin).to_point())
            .collect();
        Self {
            id: Uuid::new_v4(),
            version: 1,
            is_deleted: false,
            kind,
            x: origin.x,
            y: origin.y,
            points,
            start_binding: None,
            end_binding: None,
        }
    }

    pub fn arrow(start: Point, end: Point) -> Self {
        Self::new(LinearKind::Arrow, vec![start, end])
    }

    pub fn line(start: Point, end: Point) -> Self {
        Self::new(LinearKind::Line, vec![start, end])
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Arrows take part in automatic binding; plain lines only bind on request.
    pub fn is_binding_element(&self) -> bool {
        self.kind == LinearKind::Arrow
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Global position of the point at `index`; negative indices count from
    /// the end.
    pub fn point_at(&self, index: isize) -> Option<Point> {
        let len = self.points.len() as isize;
        let index = if index < 0 { len + index } else { index };
        if index < 0 || index >= len {
            return None;
        }
        self.points
            .get(index as usize)
            .map(|p| self.origin() + p.to_vec2())
    }

    /// All points in global coordinates.
    pub fn global_points(&self) -> Vec<Point> {
        let origin = self.origin().to_vec2();
        self.points.iter().map(|p| *p + origin).collect()
    }

    /// Index of the point at `edge`.
    pub fn edge_index(&self, edge: BindingEdge) -> usize {
        match edge {
            BindingEdge::Start => 0,
            BindingEdge::End => self.points.len().saturating_sub(1),
        }
    }

    /// Index of the point next to the point at `edge`.
    pub fn adjacent_index(&self, edge: BindingEdge) -> usize {
        match edge {
            BindingEdge::Start => 1.min(self.points.len().saturating_sub(1)),
            BindingEdge::End => self.points.len().saturating_sub(2),
        }
    }

    /// Global position of the point at `edge`.
    pub fn edge_point(&self, edge: BindingEdge) -> Option<Point> {
        self.point_at(self.edge_index(edge) as isize)
    }

    /// Global position of the point next to the point at `edge`.
    pub fn adjacent_point(&self, edge: BindingEdge) -> Option<Point> {
        self.point_at(self.adjacent_index(edge) as isize)
    }

    pub fn binding(&self, edge: BindingEdge) -> Option<&PointBinding> {
        match edge {
            BindingEdge::Start => self.start_binding.as_ref(),
            BindingEdge::End => self.end_binding.as_ref(),
        }
    }

    /// A linear element with fewer than three points is a simple segment.
    pub fn is_simple(&self) -> bool {
        self.points.len() < 3
    }

    /// Whether either end references `element_id`.
    pub fn is_bound_to(&self, element_id: ElementId) -> bool {
        self.start_binding
            .is_some_and(|b| b.element_id == element_id)
            || self.end_binding.is_some_and(|b| b.element_id == element_id)
    }

    /// New origin and local points after moving the point at `index` to
    /// `target` (global), keeping every other point where it is.
    pub fn move_point(&self, index: usize, target: Point) -> (Point, Vec<Point>) {
        if index == 0 {
            let offset: Vec2 = target - self.origin();
            let points = self
                .points
                .iter()
                .enumerate()
                .map(|(i, p)| if i == 0 { Point::ORIGIN } else { *p - offset })
                .collect();
            return (target, points);
        }
        let local = (target - self.origin()).to_point();
        let points = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| if i == index { local } else { *p })
            .collect();
        (self.origin(), points)
    }

    /// Bounds of all points.
    pub fn bounds(&self) -> Rect {
        let origin = self.origin().to_vec2();
        let mut points = self.points.iter().map(|p| *p + origin);
        let Some(first) = points.next() else {
            return Rect::from_origin_size(self.origin(), (0.0, 0.0));
        };
        points.fold(Rect::from_points(first, first), |r, p| r.union_pt(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_point_arrow() -> LinearElement {
        LinearElement::new(
            LinearKind::Arrow,
            vec![Point::new(10.0, 10.0), Point::new(50.0, 10.0), Point::new(50.0, 60.0)],
        )
    }

    #[test]
    fn test_points_are_local() {
        let arrow = three_point_arrow();
        assert_eq!(arrow.origin(), Point::new(10.0, 10.0));
        assert_eq!(arrow.points[0], Point::ORIGIN);
        assert_eq!(arrow.points[2], Point::new(40.0, 50.0));
    }

    #[test]
    fn test_point_at() {
        let arrow = three_point_arrow();
        assert_eq!(arrow.point_at(0), Some(Point::new(10.0, 10.0)));
        assert_eq!(arrow.point_at(-1), Some(Point::new(50.0, 60.0)));
        assert_eq!(arrow.point_at(-2), Some(Point::new(50.0, 10.0)));
        assert_eq!(arrow.point_at(3), None);
        assert_eq!(arrow.point_at(-4), None);
    }

    #[test]
    fn test_edge_and_adjacent() {
        let arrow = three_point_arrow();
        assert_eq!(arrow.edge_point(BindingEdge::End), Some(Point::new(50.0, 60.0)));
        assert_eq!(arrow.adjacent_point(BindingEdge::End), Some(Point::new(50.0, 10.0)));
        assert_eq!(arrow.adjacent_point(BindingEdge::Start), Some(Point::new(50.0, 10.0)));
        assert!(!arrow.is_simple());
    }

    #[test]
    fn test_move_start_point_rebases_origin() {
        let arrow = three_point_arrow();
        let (origin, points) = arrow.move_point(0, Point::new(0.0, 0.0));
        assert_eq!(origin, Point::new(0.0, 0.0));
        assert_eq!(points[0], Point::ORIGIN);
        // The other points stay put in global coordinates.
        assert_eq!(points[1], Point::new(50.0, 10.0));
        assert_eq!(points[2], Point::new(50.0, 60.0));
    }

    #[test]
    fn test_move_end_point() {
        let arrow = three_point_arrow();
        let (origin, points) = arrow.move_point(2, Point::new(70.0, 70.0));
        assert_eq!(origin, arrow.origin());
        assert_eq!(points[2], Point::new(60.0, 60.0));
        assert_eq!(points[1], arrow.points[1]);
    }

    #[test]
    fn test_bounds() {
        let bounds = three_point_arrow().bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_binding_element_kinds() {
        assert!(LinearElement::arrow(Point::ORIGIN, Point::new(1.0, 0.0)).is_binding_element());
        assert!(!LinearElement::line(Point::ORIGIN, Point::new(1.0, 0.0)).is_binding_element());
    }
}
