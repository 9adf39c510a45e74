//! Element model shared with the scene store.

mod bindable;
mod linear;

pub use bindable::{BindableElement, BindableKind};
pub use linear::{BindingEdge, LinearElement, LinearKind, PointBinding};

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Enum wrapper for all element types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Bindable(BindableElement),
    Linear(LinearElement),
}

impl Element {
    pub fn id(&self) -> ElementId {
        match self {
            Element::Bindable(e) => e.id,
            Element::Linear(e) => e.id,
        }
    }

    pub fn version(&self) -> u32 {
        match self {
            Element::Bindable(e) => e.version,
            Element::Linear(e) => e.version,
        }
    }

    pub fn is_deleted(&self) -> bool {
        match self {
            Element::Bindable(e) => e.is_deleted,
            Element::Linear(e) => e.is_deleted,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Element::Bindable(e) => e.as_rect(),
            Element::Linear(e) => e.bounds(),
        }
    }

    pub fn as_bindable(&self) -> Option<&BindableElement> {
        match self {
            Element::Bindable(e) => Some(e),
            Element::Linear(_) => None,
        }
    }

    pub fn as_linear(&self) -> Option<&LinearElement> {
        match self {
            Element::Linear(e) => Some(e),
            Element::Bindable(_) => None,
        }
    }

    /// The next version of this element with `update` applied.
    ///
    /// Fields that do not exist on this kind of element are ignored.
    pub fn apply(&self, update: &ElementUpdate) -> Element {
        match self {
            Element::Bindable(e) => {
                let mut next = e.clone();
                if let Some(p) = update.position {
                    next.x = p.x;
                    next.y = p.y;
                }
                if let Some(size) = update.size {
                    next.width = size.width;
                    next.height = size.height;
                }
                if let Some(angle) = update.angle {
                    next.angle = angle;
                }
                if let Some(ids) = &update.bound_element_ids {
                    next.bound_element_ids = ids.clone();
                }
                if let Some(deleted) = update.is_deleted {
                    next.is_deleted = deleted;
                }
                next.version = next.version.wrapping_add(1);
                Element::Bindable(next)
            }
            Element::Linear(e) => {
                let mut next = e.clone();
                if let Some(p) = update.position {
                    next.x = p.x;
                    next.y = p.y;
                }
                if let Some(points) = &update.points {
                    next.points = points.clone();
                }
                if let Some(binding) = update.start_binding {
                    next.start_binding = binding;
                }
                if let Some(binding) = update.end_binding {
                    next.end_binding = binding;
                }
                if let Some(deleted) = update.is_deleted {
                    next.is_deleted = deleted;
                }
                next.version = next.version.wrapping_add(1);
                Element::Linear(next)
            }
        }
    }

    /// A copy of this element under a fresh id.
    pub fn duplicate(&self) -> Element {
        let new_id = Uuid::new_v4();
        let mut copy = self.clone();
        match &mut copy {
            Element::Bindable(e) => e.id = new_id,
            Element::Linear(e) => e.id = new_id,
        }
        copy
    }
}

impl From<BindableElement> for Element {
    fn from(element: BindableElement) -> Self {
        Element::Bindable(element)
    }
}

impl From<LinearElement> for Element {
    fn from(element: LinearElement) -> Self {
        Element::Linear(element)
    }
}

/// A partial update to one element; `None` leaves a field unchanged.
///
/// Bindings use a nested option: `Some(None)` clears the binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementUpdate {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub angle: Option<f64>,
    pub points: Option<Vec<Point>>,
    pub start_binding: Option<Option<PointBinding>>,
    pub end_binding: Option<Option<PointBinding>>,
    pub bound_element_ids: Option<Vec<ElementId>>,
    pub is_deleted: Option<bool>,
}

impl ElementUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }

    /// Set or clear the binding at `edge`.
    pub fn binding(mut self, edge: BindingEdge, binding: Option<PointBinding>) -> Self {
        match edge {
            BindingEdge::Start => self.start_binding = Some(binding),
            BindingEdge::End => self.end_binding = Some(binding),
        }
        self
    }

    pub fn bound_element_ids(mut self, ids: Vec<ElementId>) -> Self {
        self.bound_element_ids = Some(ids);
        self
    }

    pub fn deleted(mut self, deleted: bool) -> Self {
        self.is_deleted = Some(deleted);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
