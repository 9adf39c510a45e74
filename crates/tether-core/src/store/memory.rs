//! In-memory element store.

use super::{ElementStore, StoreError, StoreResult};
use crate::elements::{Element, ElementId, ElementUpdate};
use std::collections::HashMap;

/// In-memory scene holding all elements and their z-order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    elements: HashMap<ElementId, Element>,
    /// Z-order of elements (back to front).
    z_order: Vec<ElementId>,
    /// Bumped on every informed mutation.
    revision: u64,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element on top of the z-order and return its id.
    pub fn add_element(&mut self, element: impl Into<Element>) -> ElementId {
        let element = element.into();
        let id = element.id();
        if self.elements.insert(id, element).is_none() {
            self.z_order.push(id);
        }
        id
    }

    /// Remove an element from the scene entirely.
    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        self.z_order.retain(|&element_id| element_id != id);
        self.elements.remove(&id)
    }

    /// Tombstone an element. Returns the deleted version.
    pub fn delete_element(&mut self, id: ElementId) -> StoreResult<Element> {
        self.mutate_element(id, ElementUpdate::new().deleted(true), true)?;
        self.elements
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Insert a copy of an element, under a fresh id, just above the
    /// original. Returns the new id.
    pub fn duplicate_element(&mut self, id: ElementId) -> Option<ElementId> {
        let copy = self.elements.get(&id)?.duplicate();
        let new_id = copy.id();
        let pos = self.z_order.iter().position(|&element_id| element_id == id)?;
        self.z_order.insert(pos + 1, new_id);
        self.elements.insert(new_id, copy);
        Some(new_id)
    }

    /// Number of informed mutations so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Get the number of elements, deleted ones included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl ElementStore for Scene {
    fn elements(&self) -> Vec<&Element> {
        self.z_order
            .iter()
            .filter_map(|id| self.elements.get(id))
            .collect()
    }

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    fn non_deleted_elements(&self, ids: &[ElementId]) -> Vec<&Element> {
        ids.iter()
            .filter_map(|id| self.elements.get(id))
            .filter(|element| !element.is_deleted())
            .collect()
    }

    fn mutate_element(
        &mut self,
        id: ElementId,
        update: ElementUpdate,
        inform: bool,
    ) -> StoreResult<()> {
        let current = self.elements.get(&id).ok_or(StoreError::NotFound(id))?;
        let next = current.apply(&update);
        log::trace!("element {} -> version {}", id, next.version());
        self.elements.insert(id, next);
        if inform {
            self.revision += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BindableElement, LinearElement};
    use kurbo::Point;

    #[test]
    fn test_scene_creation() {
        let scene = Scene::new();
        assert!(scene.is_empty());
        assert_eq!(scene.revision(), 0);
    }

    #[test]
    fn test_add_and_z_order() {
        let mut scene = Scene::new();
        let a = scene.add_element(BindableElement::rectangle(Point::ORIGIN, 10.0, 10.0));
        let b = scene.add_element(LinearElement::arrow(Point::ORIGIN, Point::new(5.0, 5.0)));
        let ids: Vec<ElementId> = scene.elements().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_remove_element() {
        let mut scene = Scene::new();
        let id = scene.add_element(BindableElement::rectangle(Point::ORIGIN, 10.0, 10.0));
        assert!(scene.remove_element(id).is_some());
        assert!(scene.is_empty());
        assert!(scene.elements().is_empty());
    }

    #[test]
    fn test_delete_is_tombstone() {
        let mut scene = Scene::new();
        let id = scene.add_element(BindableElement::rectangle(Point::ORIGIN, 10.0, 10.0));
        let deleted = scene.delete_element(id).unwrap();
        assert!(deleted.is_deleted());
        assert!(scene.element(id).is_some());
        assert!(scene.non_deleted_elements(&[id]).is_empty());
    }

    #[test]
    fn test_mutate_missing_element() {
        let mut scene = Scene::new();
        let missing = uuid::Uuid::new_v4();
        let result = scene.mutate_element(missing, ElementUpdate::new(), true);
        assert_eq!(result, Err(StoreError::NotFound(missing)));
        assert_eq!(scene.revision(), 0);
    }

    #[test]
    fn test_mutate_inform_bumps_revision() {
        let mut scene = Scene::new();
        let id = scene.add_element(BindableElement::rectangle(Point::ORIGIN, 10.0, 10.0));
        scene
            .mutate_element(id, ElementUpdate::new().angle(1.0), false)
            .unwrap();
        assert_eq!(scene.revision(), 0);
        scene
            .mutate_element(id, ElementUpdate::new().angle(2.0), true)
            .unwrap();
        assert_eq!(scene.revision(), 1);
        assert_eq!(scene.element(id).unwrap().version(), 3);
    }

    #[test]
    fn test_duplicate_element() {
        let mut scene = Scene::new();
        let a = scene.add_element(BindableElement::rectangle(Point::ORIGIN, 10.0, 10.0));
        let b = scene.add_element(BindableElement::rectangle(Point::ORIGIN, 20.0, 20.0));
        let copy = scene.duplicate_element(a).unwrap();
        let ids: Vec<ElementId> = scene.elements().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![a, copy, b]);
        assert!(scene.duplicate_element(uuid::Uuid::new_v4()).is_none());
    }
}
