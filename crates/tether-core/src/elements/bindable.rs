//! Shapes that linear elements can attach to.

use super::ElementId;
use crate::geometry::{Ellipse, point_rotate};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outline of a bindable shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BindableKind {
    #[default]
    Rectangle,
    Diamond,
    Ellipse,
    /// Text container; binds like a rectangle.
    Text,
}

/// A shape with a rotated bounding box and the ids of the linear elements
/// bound to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindableElement {
    pub(crate) id: ElementId,
    /// Incremented on every applied update.
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub is_deleted: bool,
    pub kind: BindableKind,
    /// Top-left corner of the unrotated bounding box.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in radians around the center.
    #[serde(default)]
    pub angle: f64,
    /// Linear elements currently bound to this shape. No duplicates.
    #[serde(default)]
    pub bound_element_ids: Vec<ElementId>,
}

impl BindableElement {
    pub fn new(kind: BindableKind, position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            version: 1,
            is_deleted: false,
            kind,
            x: position.x,
            y: position.y,
            width,
            height,
            angle: 0.0,
            bound_element_ids: Vec::new(),
        }
    }

    pub fn rectangle(position: Point, width: f64, height: f64) -> Self {
        Self::new(BindableKind::Rectangle, position, width, height)
    }

    pub fn diamond(position: Point, width: f64, height: f64) -> Self {
        Self::new(BindableKind::Diamond, position, width, height)
    }

    pub fn ellipse(position: Point, width: f64, height: f64) -> Self {
        Self::new(BindableKind::Ellipse, position, width, height)
    }

    pub fn text(position: Point, width: f64, height: f64) -> Self {
        Self::new(BindableKind::Text, position, width, height)
    }

    /// Builder-style rotation.
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// The unrotated bounding box.
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    /// `point` in the shape's frame: unrotated, centered on the origin.
    pub fn to_local(&self, point: Point) -> Point {
        let center = self.center();
        let p = point_rotate(point, -self.angle, center);
        Point::new(p.x - center.x, p.y - center.y)
    }

    /// Inverse of [`to_local`](Self::to_local).
    pub fn to_global(&self, local: Point) -> Point {
        let center = self.center();
        point_rotate(
            Point::new(local.x + center.x, local.y + center.y),
            self.angle,
            center,
        )
    }

    /// Corners of the polygonal outline in the local frame, scaled by
    /// `scale`. Empty for ellipses.
    pub fn local_corners(&self, scale: f64) -> Vec<Point> {
        let hx = scale * self.half_width();
        let hy = scale * self.half_height();
        match self.kind {
            BindableKind::Rectangle | BindableKind::Text => vec![
                Point::new(hx, hy),
                Point::new(hx, -hy),
                Point::new(-hx, -hy),
                Point::new(-hx, hy),
            ],
            BindableKind::Diamond => vec![
                Point::new(0.0, hy),
                Point::new(hx, 0.0),
                Point::new(0.0, -hy),
                Point::new(-hx, 0.0),
            ],
            BindableKind::Ellipse => Vec::new(),
        }
    }

    /// The outline as an ellipse in the local frame, grown by `gap`.
    pub fn local_ellipse(&self, gap: f64) -> Ellipse {
        Ellipse::new(
            Point::ORIGIN,
            0.0,
            self.half_width() + gap,
            self.half_height() + gap,
        )
    }

    /// Whether `id` is listed in `bound_element_ids`.
    pub fn is_bound_to(&self, id: ElementId) -> bool {
        self.bound_element_ids.contains(&id)
    }

    /// `bound_element_ids` plus `id`, without duplicates.
    pub(crate) fn bound_ids_with(&self, id: ElementId) -> Vec<ElementId> {
        let mut ids = self.bound_element_ids.clone();
        if !ids.contains(&id) {
            ids.push(id);
        }
        ids
    }

    /// `bound_element_ids` without `id`.
    pub(crate) fn bound_ids_without(&self, id: ElementId) -> Vec<ElementId> {
        self.bound_element_ids
            .iter()
            .copied()
            .filter(|&bound| bound != id)
            .collect()
    }
}
