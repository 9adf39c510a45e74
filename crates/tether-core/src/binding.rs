//! Binding manager: keeps arrow endpoints attached to shapes.
//!
//! A binding is recorded twice: as a [`PointBinding`] on the linear
//! element's endpoint and as the linear element's id in the shape's
//! `bound_element_ids`. Every operation here reads the current state from
//! an [`ElementStore`] and writes both sides back through it.

use crate::collision::{
    binding_border_test, determine_focus_distance, determine_focus_point,
    distance_to_bindable_element, intersect_element_with_line, max_binding_gap,
};
use crate::config::BindingConfig;
use crate::elements::{
    BindableElement, BindingEdge, Element, ElementId, ElementUpdate, LinearElement, PointBinding,
};
use crate::store::ElementStore;
use kurbo::{Point, Size};
use std::collections::{HashMap, HashSet};

const EDGES: [BindingEdge; 2] = [BindingEdge::Start, BindingEdge::End];

/// What to do with one end of a linear element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingTarget {
    /// Leave the current binding alone.
    Keep,
    /// Clear the current binding.
    Unbind,
    /// Bind to this shape.
    BindTo(ElementId),
}

impl From<Option<ElementId>> for BindingTarget {
    /// `None` unbinds.
    fn from(target: Option<ElementId>) -> Self {
        target.map_or(BindingTarget::Unbind, BindingTarget::BindTo)
    }
}

/// Which ends of a linear element could bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestedEdge {
    Start,
    End,
    Both,
}

impl SuggestedEdge {
    fn includes(self, edge: BindingEdge) -> bool {
        matches!(
            (self, edge),
            (SuggestedEdge::Both, _)
                | (SuggestedEdge::Start, BindingEdge::Start)
                | (SuggestedEdge::End, BindingEdge::End)
        )
    }
}

/// A binding that would be created, for hover highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestedBinding {
    /// A shape a selected linear element could bind to.
    Bindable(ElementId),
    /// Ends of a linear element that could bind to a selected shape.
    Point {
        linear: ElementId,
        edge: SuggestedEdge,
        bindable: ElementId,
    },
}

/// Which side of a duplication keeps the bindings to elements that were
/// not duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicationRoles {
    /// The originals keep them (copy/paste, duplicate).
    #[default]
    Normal,
    /// The duplicates keep them; the originals are what moves away
    /// (alt-drag).
    Reversed,
}

/// Options for [`BindingManager::update_bound_elements`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOptions {
    /// Linear elements transformed in the same gesture; only their
    /// bindings are refreshed, their points are left alone.
    pub simultaneously_updated: Vec<ElementId>,
    /// Size the changed shape is being resized to. The store must still
    /// hold the previous size.
    pub new_size: Option<Size>,
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn simultaneously_updated(mut self, ids: Vec<ElementId>) -> Self {
        self.simultaneously_updated = ids;
        self
    }

    pub fn new_size(mut self, size: Size) -> Self {
        self.new_size = Some(size);
        self
    }
}

/// Whether binding `bindable` to one end of `linear` would form a loop: the
/// other end is already bound to it and the line is a single segment.
pub fn is_linear_element_simple_and_already_bound(
    linear: &LinearElement,
    already_bound_to: Option<ElementId>,
    bindable: &BindableElement,
) -> bool {
    already_bound_to == Some(bindable.id()) && linear.is_simple()
}

fn is_simple_and_already_bound_on_opposite_edge(
    linear: &LinearElement,
    bindable: &BindableElement,
    edge: BindingEdge,
) -> bool {
    let opposite = linear.binding(edge.opposite()).map(|b| b.element_id);
    is_linear_element_simple_and_already_bound(linear, opposite, bindable)
}

/// Shapes touched by one call, for reconciling `bound_element_ids`.
#[derive(Debug, Default)]
struct EdgeChanges {
    bound_to: Vec<ElementId>,
    unbound_from: Vec<ElementId>,
}

/// Binds, unbinds and re-anchors linear elements against bindable shapes.
///
/// Owns no element state; every operation works on the store it is given.
#[derive(Debug, Clone, Default)]
pub struct BindingManager {
    config: BindingConfig,
}

impl BindingManager {
    /// Create a new binding manager.
    pub fn new(config: BindingConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: BindingConfig) {
        self.config = config;
    }

    fn linear(&self, store: &dyn ElementStore, id: ElementId) -> Option<LinearElement> {
        match store.element(id) {
            Some(Element::Linear(linear)) if !linear.is_deleted => Some(linear.clone()),
            _ => None,
        }
    }

    fn bindable(&self, store: &dyn ElementStore, id: ElementId) -> Option<BindableElement> {
        match store.element(id) {
            Some(Element::Bindable(bindable)) if !bindable.is_deleted => Some(bindable.clone()),
            _ => None,
        }
    }

    /// Apply `update`, logging a rejected mutation. Returns whether it applied.
    fn mutate(&self, store: &mut dyn ElementStore, id: ElementId, update: ElementUpdate) -> bool {
        match store.mutate_element(id, update, true) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Binding update rejected: {}", e);
                false
            }
        }
    }

    /// Bind or unbind both ends of a linear element.
    ///
    /// Shapes that end up referenced by neither end lose the linear
    /// element's id; shapes newly bound gain it.
    pub fn bind_or_unbind_linear_element(
        &self,
        store: &mut dyn ElementStore,
        linear_id: ElementId,
        start: BindingTarget,
        end: BindingTarget,
    ) {
        if self.linear(store, linear_id).is_none() {
            log::debug!("Skipping binding of missing linear element {}", linear_id);
            return;
        }
        let mut changes = EdgeChanges::default();
        for (edge, target) in [(BindingEdge::Start, start), (BindingEdge::End, end)] {
            match target {
                BindingTarget::Keep => {}
                BindingTarget::Unbind => {
                    if let Some(previous) = self.unbind_linear_element(store, linear_id, edge) {
                        changes.unbound_from.push(previous);
                    }
                }
                BindingTarget::BindTo(bindable_id) => {
                    self.bind_linear_element(store, linear_id, bindable_id, edge, &mut changes);
                }
            }
        }

        let Some(linear) = self.linear(store, linear_id) else {
            return;
        };
        let mut seen = HashSet::new();
        let only_unbound: Vec<ElementId> = changes
            .unbound_from
            .into_iter()
            .filter(|id| !changes.bound_to.contains(id) && !linear.is_bound_to(*id))
            .filter(|id| seen.insert(*id))
            .collect();
        let stale: Vec<BindableElement> = store
            .non_deleted_elements(&only_unbound)
            .into_iter()
            .filter_map(|element| element.as_bindable().cloned())
            .collect();
        for bindable in stale {
            self.mutate(
                store,
                bindable.id(),
                ElementUpdate::new().bound_element_ids(bindable.bound_ids_without(linear_id)),
            );
        }
        self.check_linear_invariants(store, linear_id);
    }

    fn bind_linear_element(
        &self,
        store: &mut dyn ElementStore,
        linear_id: ElementId,
        bindable_id: ElementId,
        edge: BindingEdge,
        changes: &mut EdgeChanges,
    ) {
        let (Some(linear), Some(bindable)) =
            (self.linear(store, linear_id), self.bindable(store, bindable_id))
        else {
            log::debug!("Cannot bind {} to missing element {}", linear_id, bindable_id);
            return;
        };
        if is_simple_and_already_bound_on_opposite_edge(&linear, &bindable, edge) {
            log::debug!(
                "Refusing to bind both ends of {} to {}",
                linear_id,
                bindable_id
            );
            return;
        }
        let Some(binding) = calculate_focus_and_gap(&linear, &bindable, edge) else {
            return;
        };
        let previous = linear.binding(edge).map(|b| b.element_id);
        if !self.mutate(
            store,
            linear_id,
            ElementUpdate::new().binding(edge, Some(binding)),
        ) {
            return;
        }
        log::trace!(
            "Bound {:?} of {} to {} (focus {:.3}, gap {:.1})",
            edge,
            linear_id,
            bindable_id,
            binding.focus,
            binding.gap
        );
        changes.bound_to.push(bindable_id);
        if let Some(previous) = previous.filter(|&id| id != bindable_id) {
            changes.unbound_from.push(previous);
        }
        self.mutate(
            store,
            bindable_id,
            ElementUpdate::new().bound_element_ids(bindable.bound_ids_with(linear_id)),
        );
    }

    /// Clear the binding at `edge`, returning the shape it pointed to.
    fn unbind_linear_element(
        &self,
        store: &mut dyn ElementStore,
        linear_id: ElementId,
        edge: BindingEdge,
    ) -> Option<ElementId> {
        let previous = self.linear(store, linear_id)?.binding(edge)?.element_id;
        if !self.mutate(store, linear_id, ElementUpdate::new().binding(edge, None)) {
            return None;
        }
        log::trace!("Unbound {:?} of {} from {}", edge, linear_id, previous);
        Some(previous)
    }

    /// Re-bind each selected element to whatever it now touches.
    ///
    /// Linear elements bind each end to the shape under it, or unbind it;
    /// shapes pick up arrows whose ends lie in their binding border. With
    /// binding disabled the selected linear elements are unbound instead.
    pub fn bind_or_unbind_selected_elements(
        &self,
        store: &mut dyn ElementStore,
        ids: &[ElementId],
    ) {
        if !self.config.binding_enabled {
            self.unbind_linear_elements(store, ids);
            return;
        }
        for &id in ids {
            if let Some(linear) = self.linear(store, id) {
                let start = self.eligible_element_for_edge(store, &linear, BindingEdge::Start);
                let end = self.eligible_element_for_edge(store, &linear, BindingEdge::End);
                self.bind_or_unbind_linear_element(store, id, start.into(), end.into());
            } else if self.bindable(store, id).is_some() {
                self.maybe_bind_bindable_element(store, id);
            } else {
                log::debug!("Skipping missing or deleted element {}", id);
            }
        }
    }

    /// Unbind both ends of every linear element among `ids`.
    pub fn unbind_linear_elements(&self, store: &mut dyn ElementStore, ids: &[ElementId]) {
        for &id in ids {
            if self.linear(store, id).is_some() {
                self.bind_or_unbind_linear_element(
                    store,
                    id,
                    BindingTarget::Unbind,
                    BindingTarget::Unbind,
                );
            }
        }
    }

    /// Bind every arrow whose free ends lie in the binding border of a
    /// newly placed shape.
    pub fn maybe_bind_bindable_element(
        &self,
        store: &mut dyn ElementStore,
        bindable_id: ElementId,
    ) {
        if !self.config.binding_enabled {
            return;
        }
        let Some(bindable) = self.bindable(store, bindable_id) else {
            log::debug!("Skipping missing bindable element {}", bindable_id);
            return;
        };
        for (linear_id, edge) in self.eligible_linear_elements_for_bindable(store, &bindable) {
            let target = |e| {
                if edge.includes(e) {
                    BindingTarget::BindTo(bindable_id)
                } else {
                    BindingTarget::Keep
                }
            };
            self.bind_or_unbind_linear_element(
                store,
                linear_id,
                target(BindingEdge::Start),
                target(BindingEdge::End),
            );
        }
    }

    /// Bind a linear element that was just drawn: its start to
    /// `start_candidate` and its end to the shape under `pointer`.
    pub fn maybe_bind_linear_element(
        &self,
        store: &mut dyn ElementStore,
        linear_id: ElementId,
        start_candidate: Option<ElementId>,
        pointer: Point,
    ) {
        if !self.config.binding_enabled {
            return;
        }
        let start = start_candidate.map_or(BindingTarget::Keep, BindingTarget::BindTo);
        let end = self
            .get_hovered_element_for_binding(store, pointer)
            .map_or(BindingTarget::Keep, BindingTarget::BindTo);
        self.bind_or_unbind_linear_element(store, linear_id, start, end);
    }

    /// Topmost shape whose binding border contains `point`.
    pub fn get_hovered_element_for_binding(
        &self,
        store: &dyn ElementStore,
        point: Point,
    ) -> Option<ElementId> {
        store
            .elements()
            .into_iter()
            .rev()
            .filter_map(Element::as_bindable)
            .find(|b| !b.is_deleted && binding_border_test(b, point, &self.config))
            .map(BindableElement::id)
    }

    fn eligible_element_for_edge(
        &self,
        store: &dyn ElementStore,
        linear: &LinearElement,
        edge: BindingEdge,
    ) -> Option<ElementId> {
        let point = linear.edge_point(edge)?;
        self.eligible_element_for_edge_at(store, linear, edge, point)
    }

    /// Shape the end of `linear` at `edge` would bind to if it were at
    /// `point`, e.g. while that end is being dragged.
    ///
    /// A single segment is never offered the shape its other end is
    /// already bound to.
    pub fn eligible_element_for_edge_at(
        &self,
        store: &dyn ElementStore,
        linear: &LinearElement,
        edge: BindingEdge,
        point: Point,
    ) -> Option<ElementId> {
        let hovered = self.get_hovered_element_for_binding(store, point)?;
        let bindable = self.bindable(store, hovered)?;
        if is_simple_and_already_bound_on_opposite_edge(linear, &bindable, edge) {
            return None;
        }
        Some(hovered)
    }

    fn is_eligible_for_new_binding(
        &self,
        linear: &LinearElement,
        edge: BindingEdge,
        bindable: &BindableElement,
    ) -> bool {
        linear.binding(edge).is_none()
            && !is_simple_and_already_bound_on_opposite_edge(linear, bindable, edge)
            && linear
                .edge_point(edge)
                .is_some_and(|p| binding_border_test(bindable, p, &self.config))
    }

    /// Arrows with a free end in the binding border of `bindable`.
    fn eligible_linear_elements_for_bindable(
        &self,
        store: &dyn ElementStore,
        bindable: &BindableElement,
    ) -> Vec<(ElementId, SuggestedEdge)> {
        store
            .elements()
            .into_iter()
            .filter_map(Element::as_linear)
            .filter(|linear| !linear.is_deleted && linear.is_binding_element())
            .filter_map(|linear| {
                let start = self.is_eligible_for_new_binding(linear, BindingEdge::Start, bindable);
                let end = self.is_eligible_for_new_binding(linear, BindingEdge::End, bindable);
                let edge = match (start, end) {
                    (true, true) => SuggestedEdge::Both,
                    (true, false) => SuggestedEdge::Start,
                    (false, true) => SuggestedEdge::End,
                    (false, false) => return None,
                };
                Some((linear.id(), edge))
            })
            .collect()
    }

    /// Bindings the selection would create, for highlighting.
    ///
    /// Only unbound ends are considered. Pairings where both sides are
    /// selected are left out.
    pub fn get_eligible_elements_for_binding(
        &self,
        store: &dyn ElementStore,
        ids: &[ElementId],
    ) -> Vec<SuggestedBinding> {
        if !self.config.binding_enabled {
            return Vec::new();
        }
        let included: HashSet<ElementId> = ids.iter().copied().collect();
        let mut suggestions = Vec::new();
        for element in store.non_deleted_elements(ids) {
            match element {
                Element::Linear(linear) if linear.is_binding_element() => {
                    for edge in EDGES {
                        if linear.binding(edge).is_some() {
                            continue;
                        }
                        let Some(bindable) = self.eligible_element_for_edge(store, linear, edge)
                        else {
                            continue;
                        };
                        let suggestion = SuggestedBinding::Bindable(bindable);
                        if !included.contains(&bindable) && !suggestions.contains(&suggestion) {
                            suggestions.push(suggestion);
                        }
                    }
                }
                Element::Bindable(bindable) => {
                    suggestions.extend(
                        self.eligible_linear_elements_for_bindable(store, bindable)
                            .into_iter()
                            .filter(|(linear, _)| !included.contains(linear))
                            .map(|(linear, edge)| SuggestedBinding::Point {
                                linear,
                                edge,
                                bindable: bindable.id(),
                            }),
                    );
                }
                Element::Linear(_) => {}
            }
        }
        suggestions
    }

    /// Re-anchor the linear elements bound to a shape that moved, rotated
    /// or is being resized.
    ///
    /// When resizing, call this with `new_size` before the new size is
    /// applied so gaps can be scaled, then again after it is applied.
    pub fn update_bound_elements(
        &self,
        store: &mut dyn ElementStore,
        changed_id: ElementId,
        options: &UpdateOptions,
    ) {
        let Some(changed) = self.bindable(store, changed_id) else {
            return;
        };
        if changed.bound_element_ids.is_empty() {
            return;
        }
        let linear_ids: Vec<ElementId> = store
            .non_deleted_elements(&changed.bound_element_ids)
            .into_iter()
            .filter_map(Element::as_linear)
            .map(LinearElement::id)
            .collect();
        for linear_id in linear_ids {
            let Some(linear) = self.linear(store, linear_id) else {
                continue;
            };
            if !linear.is_bound_to(changed_id) {
                log::debug!("Stale bound element {} on {}", linear_id, changed_id);
                continue;
            }
            let start = self.maybe_scale_gap(&changed, linear.start_binding, options.new_size);
            let end = self.maybe_scale_gap(&changed, linear.end_binding, options.new_size);
            if options.simultaneously_updated.contains(&linear_id) {
                self.mutate(
                    store,
                    linear_id,
                    ElementUpdate::new()
                        .binding(BindingEdge::Start, start)
                        .binding(BindingEdge::End, end),
                );
                continue;
            }
            self.update_bound_point(store, linear_id, BindingEdge::Start, start, changed_id);
            self.update_bound_point(store, linear_id, BindingEdge::End, end, changed_id);
        }
    }

    fn maybe_scale_gap(
        &self,
        changed: &BindableElement,
        binding: Option<PointBinding>,
        new_size: Option<Size>,
    ) -> Option<PointBinding> {
        let binding = binding?;
        let Some(new_size) = new_size else {
            return Some(binding);
        };
        let old_size = changed.size();
        if binding.element_id != changed.id() || old_size.width == 0.0 || old_size.height == 0.0 {
            return Some(binding);
        }
        let ratio = if new_size.width < new_size.height {
            new_size.width / old_size.width
        } else {
            new_size.height / old_size.height
        };
        let max_gap = max_binding_gap(changed, new_size.width, new_size.height, &self.config);
        let gap = (binding.gap * ratio).min(max_gap).max(1.0);
        Some(PointBinding { gap, ..binding })
    }

    fn update_bound_point(
        &self,
        store: &mut dyn ElementStore,
        linear_id: ElementId,
        edge: BindingEdge,
        binding: Option<PointBinding>,
        changed_id: ElementId,
    ) {
        let Some(binding) = binding else {
            return;
        };
        let Some(linear) = self.linear(store, linear_id) else {
            return;
        };
        // Only a single segment needs its other end re-anchored.
        if binding.element_id != changed_id && linear.points.len() > 2 {
            return;
        }
        let Some(bound) = self.bindable(store, binding.element_id) else {
            log::debug!("Binding of {} points to missing {}", linear_id, binding.element_id);
            return;
        };
        let Some(adjacent) = linear.adjacent_point(edge) else {
            return;
        };
        let focus_point = determine_focus_point(&bound, binding.focus, adjacent);
        let edge_point = if binding.gap == 0.0 {
            focus_point
        } else {
            intersect_element_with_line(&bound, adjacent, focus_point, binding.gap)
                .first()
                .copied()
                .unwrap_or(focus_point)
        };
        let (origin, points) = linear.move_point(linear.edge_index(edge), edge_point);
        self.mutate(
            store,
            linear_id,
            ElementUpdate::new()
                .position(origin)
                .points(points)
                .binding(edge, Some(binding)),
        );
    }

    /// Rewrite bindings after `original_elements` were copied.
    ///
    /// `id_map` maps each original id to its duplicate. Bindings between
    /// elements copied together are redirected to the copies; bindings to
    /// elements left behind are kept by one side according to `roles`.
    pub fn fix_bindings_after_duplication(
        &self,
        store: &mut dyn ElementStore,
        original_elements: &[Element],
        id_map: &HashMap<ElementId, ElementId>,
        roles: DuplicationRoles,
    ) {
        for original in original_elements {
            let Some(&copy_id) = id_map.get(&original.id()) else {
                continue;
            };
            match original {
                Element::Linear(linear) => {
                    self.fix_duplicated_linear(store, linear, copy_id, id_map);
                }
                Element::Bindable(bindable) => {
                    self.fix_duplicated_bindable(store, bindable, copy_id, id_map, roles);
                }
            }
        }
        for &copy_id in id_map.values() {
            self.check_linear_invariants(store, copy_id);
        }
    }

    fn fix_duplicated_linear(
        &self,
        store: &mut dyn ElementStore,
        original: &LinearElement,
        copy_id: ElementId,
        id_map: &HashMap<ElementId, ElementId>,
    ) {
        let mut update = ElementUpdate::new();
        for edge in EDGES {
            let Some(binding) = original.binding(edge).copied() else {
                continue;
            };
            match id_map.get(&binding.element_id) {
                Some(&target) => {
                    let retargeted = PointBinding {
                        element_id: target,
                        ..binding
                    };
                    update = update.binding(edge, Some(retargeted));
                }
                None => {
                    // The shape stays behind; both lines stay bound to it.
                    update = update.binding(edge, Some(binding));
                    if let Some(shape) = self.bindable(store, binding.element_id) {
                        self.mutate(
                            store,
                            shape.id(),
                            ElementUpdate::new().bound_element_ids(shape.bound_ids_with(copy_id)),
                        );
                    }
                }
            }
        }
        if !update.is_empty() {
            self.mutate(store, copy_id, update);
        }
    }

    fn fix_duplicated_bindable(
        &self,
        store: &mut dyn ElementStore,
        original: &BindableElement,
        copy_id: ElementId,
        id_map: &HashMap<ElementId, ElementId>,
        roles: DuplicationRoles,
    ) {
        let mut copy_ids = Vec::new();
        let mut moved = Vec::new();
        for &bound_id in &original.bound_element_ids {
            if let Some(&mapped) = id_map.get(&bound_id) {
                copy_ids.push(mapped);
                continue;
            }
            if roles == DuplicationRoles::Reversed {
                self.retarget_linear(store, bound_id, original.id(), copy_id);
                copy_ids.push(bound_id);
                moved.push(bound_id);
            }
        }
        self.mutate(store, copy_id, ElementUpdate::new().bound_element_ids(copy_ids));

        if moved.is_empty() {
            return;
        }
        if let Some(current) = self.bindable(store, original.id()) {
            let remaining = current
                .bound_element_ids
                .iter()
                .copied()
                .filter(|id| !moved.contains(id))
                .collect();
            self.mutate(
                store,
                original.id(),
                ElementUpdate::new().bound_element_ids(remaining),
            );
        }
    }

    /// Point every end of `linear_id` bound to `from` at `to` instead.
    fn retarget_linear(
        &self,
        store: &mut dyn ElementStore,
        linear_id: ElementId,
        from: ElementId,
        to: ElementId,
    ) {
        let Some(linear) = self.linear(store, linear_id) else {
            return;
        };
        let mut update = ElementUpdate::new();
        for edge in EDGES {
            if let Some(binding) = linear.binding(edge).filter(|b| b.element_id == from) {
                update = update.binding(edge, Some(PointBinding { element_id: to, ..*binding }));
            }
        }
        if !update.is_empty() {
            self.mutate(store, linear_id, update);
        }
    }

    /// Clean up bindings after `deleted_elements` were deleted.
    ///
    /// Surviving linear elements bound to a deleted shape lose that
    /// binding; surviving shapes forget deleted linear elements.
    pub fn fix_bindings_after_deletion(
        &self,
        store: &mut dyn ElementStore,
        deleted_elements: &[Element],
    ) {
        let deleted: HashSet<ElementId> = deleted_elements.iter().map(Element::id).collect();

        let affected: Vec<LinearElement> = store
            .elements()
            .into_iter()
            .filter_map(Element::as_linear)
            .filter(|linear| !linear.is_deleted && !deleted.contains(&linear.id()))
            .filter(|linear| deleted.iter().any(|&id| linear.is_bound_to(id)))
            .cloned()
            .collect();
        for linear in affected {
            let mut update = ElementUpdate::new();
            for edge in EDGES {
                if linear.binding(edge).is_some_and(|b| deleted.contains(&b.element_id)) {
                    update = update.binding(edge, None);
                }
            }
            log::trace!("Clearing bindings of {} to deleted elements", linear.id());
            self.mutate(store, linear.id(), update);
        }

        let shapes: Vec<BindableElement> = store
            .elements()
            .into_iter()
            .filter_map(Element::as_bindable)
            .filter(|shape| !shape.is_deleted && !deleted.contains(&shape.id()))
            .filter(|shape| shape.bound_element_ids.iter().any(|id| deleted.contains(id)))
            .cloned()
            .collect();
        for shape in shapes {
            let remaining = shape
                .bound_element_ids
                .iter()
                .copied()
                .filter(|id| !deleted.contains(id))
                .collect();
            self.mutate(store, shape.id(), ElementUpdate::new().bound_element_ids(remaining));
        }
    }

    /// A single segment never binds both ends to the same shape, and each
    /// shape it is bound to lists it at most once.
    fn check_linear_invariants(&self, store: &dyn ElementStore, linear_id: ElementId) {
        if !cfg!(debug_assertions) {
            return;
        }
        let Some(linear) = self.linear(store, linear_id) else {
            return;
        };
        if let (true, Some(start), Some(end)) =
            (linear.is_simple(), linear.start_binding, linear.end_binding)
        {
            debug_assert_ne!(
                start.element_id, end.element_id,
                "both ends of {} bound to the same shape",
                linear_id
            );
        }
        for edge in EDGES {
            let Some(binding) = linear.binding(edge) else {
                continue;
            };
            if let Some(shape) = self.bindable(store, binding.element_id) {
                let count = shape.bound_element_ids.iter().filter(|&&id| id == linear_id).count();
                debug_assert!(
                    count <= 1,
                    "{} listed {} times on {}",
                    linear_id,
                    count,
                    shape.id()
                );
            }
        }
    }
}

/// Focus and gap for binding the end of `linear` at `edge` to `bindable`
/// from the current geometry.
fn calculate_focus_and_gap(
    linear: &LinearElement,
    bindable: &BindableElement,
    edge: BindingEdge,
) -> Option<PointBinding> {
    let edge_point = linear.edge_point(edge)?;
    let adjacent = linear.adjacent_point(edge)?;
    let focus = determine_focus_distance(bindable, adjacent, edge_point);
    let gap = distance_to_bindable_element(bindable, edge_point).max(1.0);
    Some(PointBinding::new(bindable.id(), focus, gap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::LinearKind;
    use crate::store::Scene;

    fn manager() -> BindingManager {
        BindingManager::default()
    }

    fn bind(scene: &mut Scene, linear: ElementId, start: BindingTarget, end: BindingTarget) {
        manager().bind_or_unbind_linear_element(scene, linear, start, end);
    }

    fn bind_end(scene: &mut Scene, linear: ElementId, bindable: ElementId) {
        bind(scene, linear, BindingTarget::Keep, BindingTarget::BindTo(bindable));
    }

    fn move_to(scene: &mut Scene, id: ElementId, position: Point) {
        scene
            .mutate_element(id, ElementUpdate::new().position(position), true)
            .unwrap();
    }

    fn linear(scene: &Scene, id: ElementId) -> LinearElement {
        scene.element(id).unwrap().as_linear().unwrap().clone()
    }

    fn bindable(scene: &Scene, id: ElementId) -> BindableElement {
        scene.element(id).unwrap().as_bindable().unwrap().clone()
    }

    fn rectangle(x: f64, y: f64, width: f64, height: f64) -> BindableElement {
        BindableElement::rectangle(Point::new(x, y), width, height)
    }

    fn arrow(points: &[(f64, f64)]) -> LinearElement {
        LinearElement::new(
            LinearKind::Arrow,
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        )
    }

    fn assert_point_near(actual: Point, expected: Point, tolerance: f64) {
        assert!(
            actual.distance(expected) < tolerance,
            "expected {expected:?}, got {actual:?}"
        );
    }

    /// A 100x100 square at (200, 0) and an arrow from (0, 50) ending 10 left
    /// of its left side.
    fn square_and_arrow() -> (Scene, ElementId, ElementId) {
        let mut scene = Scene::new();
        let square = scene.add_element(rectangle(200.0, 0.0, 100.0, 100.0));
        let arrow = scene.add_element(arrow(&[(0.0, 50.0), (190.0, 50.0)]));
        (scene, square, arrow)
    }

    #[test]
    fn test_bind_end() {
        let (mut scene, square, arrow) = square_and_arrow();
        bind_end(&mut scene, arrow, square);
        let binding = linear(&scene, arrow).end_binding.unwrap();
        assert_eq!(binding.element_id, square);
        assert!(binding.focus.abs() < 1e-9);
        assert!((binding.gap - 10.0).abs() < 1e-9);
        assert_eq!(bindable(&scene, square).bound_element_ids, vec![arrow]);
    }

    #[test]
    fn test_binding_is_idempotent() {
        let (mut scene, square, arrow) = square_and_arrow();
        for _ in 0..2 {
            bind_end(&mut scene, arrow, square);
        }
        let first = linear(&scene, arrow).end_binding.unwrap();
        bind_end(&mut scene, arrow, square);
        assert_eq!(linear(&scene, arrow).end_binding.unwrap(), first);
        assert_eq!(bindable(&scene, square).bound_element_ids, vec![arrow]);
    }

    #[test]
    fn test_unbind_removes_back_reference() {
        let (mut scene, square, arrow) = square_and_arrow();
        bind_end(&mut scene, arrow, square);
        bind(&mut scene, arrow, BindingTarget::Keep, BindingTarget::Unbind);
        assert!(linear(&scene, arrow).end_binding.is_none());
        assert!(bindable(&scene, square).bound_element_ids.is_empty());
    }

    #[test]
    fn test_rebind_moves_back_reference() {
        let (mut scene, square, arrow) = square_and_arrow();
        let circle = BindableElement::ellipse(Point::new(195.0, 20.0), 60.0, 60.0);
        let other = scene.add_element(circle);
        bind_end(&mut scene, arrow, square);
        bind_end(&mut scene, arrow, other);
        assert_eq!(linear(&scene, arrow).end_binding.unwrap().element_id, other);
        assert!(bindable(&scene, square).bound_element_ids.is_empty());
        assert_eq!(bindable(&scene, other).bound_element_ids, vec![arrow]);
    }

    #[test]
    fn test_simple_line_cannot_loop() {
        let (mut scene, square, arrow) = square_and_arrow();
        bind(
            &mut scene,
            arrow,
            BindingTarget::BindTo(square),
            BindingTarget::BindTo(square),
        );
        let arrow = linear(&scene, arrow);
        assert_eq!(arrow.start_binding.unwrap().element_id, square);
        assert!(arrow.end_binding.is_none());
        assert_eq!(bindable(&scene, square).bound_element_ids, vec![arrow.id()]);
    }

    #[test]
    fn test_multi_point_line_may_loop() {
        let mut scene = Scene::new();
        let square = scene.add_element(rectangle(0.0, 0.0, 100.0, 100.0));
        let arrow = scene.add_element(arrow(&[(50.0, -10.0), (50.0, -60.0), (110.0, 50.0)]));
        bind(
            &mut scene,
            arrow,
            BindingTarget::BindTo(square),
            BindingTarget::BindTo(square),
        );
        let current = linear(&scene, arrow);
        assert!(current.start_binding.is_some());
        assert!(current.end_binding.is_some());
        assert_eq!(bindable(&scene, square).bound_element_ids, vec![arrow]);

        // Unbinding one end keeps the back reference for the other.
        bind(&mut scene, arrow, BindingTarget::Unbind, BindingTarget::Keep);
        assert_eq!(bindable(&scene, square).bound_element_ids, vec![arrow]);
    }

    #[test]
    fn test_bind_missing_elements_is_noop() {
        let (mut scene, square, arrow) = square_and_arrow();
        let revision = scene.revision();
        bind_end(&mut scene, arrow, uuid::Uuid::new_v4());
        bind_end(&mut scene, uuid::Uuid::new_v4(), square);
        assert_eq!(scene.revision(), revision);
        assert!(linear(&scene, arrow).end_binding.is_none());
    }

    #[test]
    fn test_bind_or_unbind_selected_linear() {
        let (mut scene, square, arrow) = square_and_arrow();
        let m = manager();
        m.bind_or_unbind_selected_elements(&mut scene, &[arrow]);
        assert_eq!(linear(&scene, arrow).end_binding.unwrap().element_id, square);
        assert!(linear(&scene, arrow).start_binding.is_none());

        // Move the end away and re-run: the end unbinds.
        let current = linear(&scene, arrow);
        let (origin, points) = current.move_point(1, Point::new(120.0, 50.0));
        scene
            .mutate_element(arrow, ElementUpdate::new().position(origin).points(points), true)
            .unwrap();
        m.bind_or_unbind_selected_elements(&mut scene, &[arrow]);
        assert!(linear(&scene, arrow).end_binding.is_none());
        assert!(bindable(&scene, square).bound_element_ids.is_empty());
    }

    #[test]
    fn test_binding_disabled_unbinds_selection() {
        let (mut scene, square, arrow) = square_and_arrow();
        manager().bind_or_unbind_selected_elements(&mut scene, &[arrow]);
        assert!(linear(&scene, arrow).end_binding.is_some());

        let disabled = BindingManager::new(BindingConfig::disabled());
        disabled.bind_or_unbind_selected_elements(&mut scene, &[arrow, square]);
        assert!(linear(&scene, arrow).end_binding.is_none());
        assert!(bindable(&scene, square).bound_element_ids.is_empty());

        disabled.maybe_bind_bindable_element(&mut scene, square);
        assert!(linear(&scene, arrow).end_binding.is_none());
        assert!(disabled.get_eligible_elements_for_binding(&scene, &[square]).is_empty());
    }

    #[test]
    fn test_maybe_bind_bindable_element() {
        let mut scene = Scene::new();
        let arrow = scene.add_element(arrow(&[(0.0, 50.0), (190.0, 50.0)]));
        let line = scene.add_element(LinearElement::line(
            Point::new(0.0, 60.0),
            Point::new(190.0, 60.0),
        ));
        let square = scene.add_element(rectangle(200.0, 0.0, 100.0, 100.0));
        manager().maybe_bind_bindable_element(&mut scene, square);
        assert_eq!(linear(&scene, arrow).end_binding.unwrap().element_id, square);
        // Plain lines are not picked up automatically.
        assert!(linear(&scene, line).end_binding.is_none());
        assert_eq!(bindable(&scene, square).bound_element_ids, vec![arrow]);
    }

    #[test]
    fn test_maybe_bind_linear_element() {
        let mut scene = Scene::new();
        let source = scene.add_element(rectangle(-100.0, 0.0, 90.0, 100.0));
        let target = scene.add_element(rectangle(200.0, 0.0, 100.0, 100.0));
        let arrow = scene.add_element(arrow(&[(0.0, 50.0), (190.0, 50.0)]));
        let pointer = Point::new(190.0, 50.0);
        manager().maybe_bind_linear_element(&mut scene, arrow, Some(source), pointer);
        let arrow_el = linear(&scene, arrow);
        assert_eq!(arrow_el.start_binding.unwrap().element_id, source);
        assert_eq!(arrow_el.end_binding.unwrap().element_id, target);
        assert_eq!(bindable(&scene, source).bound_element_ids, vec![arrow]);
        assert_eq!(bindable(&scene, target).bound_element_ids, vec![arrow]);
    }

    #[test]
    fn test_hovered_element_is_topmost() {
        let mut scene = Scene::new();
        let bottom = scene.add_element(rectangle(0.0, 0.0, 100.0, 100.0));
        let top = scene.add_element(rectangle(110.0, 0.0, 100.0, 100.0));
        let m = manager();
        let hovered =
            |scene: &Scene, x, y| m.get_hovered_element_for_binding(scene, Point::new(x, y));
        // 5 right of the bottom square and 5 left of the top one.
        assert_eq!(hovered(&scene, 105.0, 50.0), Some(top));
        assert_eq!(hovered(&scene, -5.0, 50.0), Some(bottom));
        assert_eq!(hovered(&scene, 500.0, 50.0), None);

        scene.delete_element(top).unwrap();
        assert_eq!(hovered(&scene, 105.0, 50.0), Some(bottom));
    }

    #[test]
    fn test_eligible_element_for_dragged_end() {
        let (mut scene, square, arrow) = square_and_arrow();
        let m = manager();
        let current = linear(&scene, arrow);
        let at = |scene: &Scene, linear: &LinearElement, edge, x, y| {
            m.eligible_element_for_edge_at(scene, linear, edge, Point::new(x, y))
        };
        assert_eq!(at(&scene, &current, BindingEdge::End, 195.0, 50.0), Some(square));
        assert_eq!(at(&scene, &current, BindingEdge::Start, 250.0, -5.0), Some(square));
        assert_eq!(at(&scene, &current, BindingEdge::End, 500.0, 500.0), None);

        // With the start bound to the square, the end of a single segment
        // cannot bind to it too.
        bind(&mut scene, arrow, BindingTarget::BindTo(square), BindingTarget::Keep);
        let current = linear(&scene, arrow);
        assert_eq!(at(&scene, &current, BindingEdge::End, 195.0, 50.0), None);
    }

    #[test]
    fn test_moving_shape_updates_endpoint() {
        let (mut scene, square, arrow) = square_and_arrow();
        bind_end(&mut scene, arrow, square);

        move_to(&mut scene, square, Point::new(300.0, 100.0));
        manager().update_bound_elements(&mut scene, square, &UpdateOptions::new());

        let arrow = linear(&scene, arrow);
        // Start stays put; the end follows the square, keeping the gap.
        assert_point_near(arrow.point_at(0).unwrap(), Point::new(0.0, 50.0), 1e-9);
        let end = arrow.point_at(-1).unwrap();
        let square = bindable(&scene, square);
        let distance = distance_to_bindable_element(&square, end);
        assert!((distance - 10.0).abs() < 1e-6, "gap was {distance}");
        assert_eq!(arrow.end_binding.unwrap().element_id, square.id());
    }

    #[test]
    fn test_update_without_change_keeps_endpoint() {
        let (mut scene, square, arrow) = square_and_arrow();
        bind_end(&mut scene, arrow, square);
        manager().update_bound_elements(&mut scene, square, &UpdateOptions::new());
        let end = linear(&scene, arrow).point_at(-1).unwrap();
        assert_point_near(end, Point::new(190.0, 50.0), 1e-6);
    }

    #[test]
    fn test_moving_shape_updates_start_point() {
        let mut scene = Scene::new();
        let square = scene.add_element(rectangle(0.0, 0.0, 100.0, 100.0));
        let arrow = scene.add_element(arrow(&[(110.0, 50.0), (300.0, 50.0)]));
        bind(&mut scene, arrow, BindingTarget::BindTo(square), BindingTarget::Keep);

        move_to(&mut scene, square, Point::new(0.0, 20.0));
        manager().update_bound_elements(&mut scene, square, &UpdateOptions::new());

        let arrow = linear(&scene, arrow);
        assert_point_near(arrow.point_at(-1).unwrap(), Point::new(300.0, 50.0), 1e-9);
        let start = arrow.point_at(0).unwrap();
        let distance = distance_to_bindable_element(&bindable(&scene, square), start);
        assert!((distance - 10.0).abs() < 1e-6, "gap was {distance}");
    }

    #[test]
    fn test_zero_gap_lands_on_focus_point() {
        let (mut scene, square, arrow) = square_and_arrow();
        bind_end(&mut scene, arrow, square);
        let binding = linear(&scene, arrow).end_binding.unwrap();
        let flush = PointBinding { gap: 0.0, ..binding };
        let update = ElementUpdate::new().binding(BindingEdge::End, Some(flush));
        scene.mutate_element(arrow, update, true).unwrap();

        move_to(&mut scene, square, Point::new(300.0, 100.0));
        manager().update_bound_elements(&mut scene, square, &UpdateOptions::new());

        let arrow = linear(&scene, arrow);
        let square = bindable(&scene, square);
        let adjacent = arrow.point_at(0).unwrap();
        let focus_point = determine_focus_point(&square, binding.focus, adjacent);
        assert_point_near(arrow.point_at(-1).unwrap(), focus_point, 1e-9);
        // A centred arrow ends in the middle of the shape.
        assert_point_near(focus_point, square.center(), 1e-9);
        assert_eq!(arrow.end_binding.unwrap().gap, 0.0);
    }

    #[test]
    fn test_collapsed_shape_uses_focus_point() {
        let (mut scene, square, arrow) = square_and_arrow();
        bind_end(&mut scene, arrow, square);

        scene
            .mutate_element(square, ElementUpdate::new().size(Size::new(0.0, 0.0)), true)
            .unwrap();
        manager().update_bound_elements(&mut scene, square, &UpdateOptions::new());

        // Nothing left to intersect; the end falls back to the centre.
        let end = linear(&scene, arrow).point_at(-1).unwrap();
        assert_point_near(end, Point::new(200.0, 0.0), 1e-9);
        assert_point_near(end, bindable(&scene, square).center(), 1e-9);
    }

    #[test]
    fn test_simultaneously_updated_keeps_points() {
        let (mut scene, square, arrow) = square_and_arrow();
        bind_end(&mut scene, arrow, square);
        let before = linear(&scene, arrow);

        move_to(&mut scene, square, Point::new(300.0, 100.0));
        manager().update_bound_elements(
            &mut scene,
            square,
            &UpdateOptions::new().simultaneously_updated(vec![arrow]),
        );
        let after = linear(&scene, arrow);
        assert_eq!(after.points, before.points);
        assert_eq!(after.end_binding, before.end_binding);
    }

    #[test]
    fn test_resize_scales_gap() {
        let (mut scene, square, arrow) = square_and_arrow();
        let m = manager();
        bind_end(&mut scene, arrow, square);

        // Halving the square halves the gap.
        m.update_bound_elements(
            &mut scene,
            square,
            &UpdateOptions::new()
                .new_size(Size::new(50.0, 50.0))
                .simultaneously_updated(vec![arrow]),
        );
        let gap = linear(&scene, arrow).end_binding.unwrap().gap;
        assert!((gap - 5.0).abs() < 1e-9);

        // Growing is capped by the maximum binding gap.
        m.update_bound_elements(
            &mut scene,
            square,
            &UpdateOptions::new()
                .new_size(Size::new(1000.0, 1000.0))
                .simultaneously_updated(vec![arrow]),
        );
        let gap = linear(&scene, arrow).end_binding.unwrap().gap;
        assert!((gap - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_stale_bound_ids_are_skipped() {
        let (mut scene, square, arrow) = square_and_arrow();
        // The square lists the arrow, but the arrow is not bound to it.
        let listed = vec![arrow, uuid::Uuid::new_v4()];
        scene
            .mutate_element(square, ElementUpdate::new().bound_element_ids(listed), true)
            .unwrap();
        let before = linear(&scene, arrow);
        manager().update_bound_elements(&mut scene, square, &UpdateOptions::new());
        assert_eq!(linear(&scene, arrow), before);
    }

    #[test]
    fn test_two_point_line_updates_far_end() {
        let (mut scene, left, right, arrow) = bound_pair();

        move_to(&mut scene, left, Point::new(0.0, 30.0));
        manager().update_bound_elements(&mut scene, left, &UpdateOptions::new());

        let arrow = linear(&scene, arrow);
        let start = arrow.point_at(0).unwrap();
        let end = arrow.point_at(-1).unwrap();
        let left = bindable(&scene, left);
        let right = bindable(&scene, right);
        assert!((distance_to_bindable_element(&left, start) - 10.0).abs() < 1e-6);
        // The far end slid along the right square to face the new start.
        assert!(end.y > 50.0);
        assert!((distance_to_bindable_element(&right, end) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_multi_point_line_keeps_far_end() {
        let mut scene = Scene::new();
        let left = scene.add_element(rectangle(0.0, 0.0, 100.0, 100.0));
        let right = scene.add_element(rectangle(300.0, 0.0, 100.0, 100.0));
        let arrow = scene.add_element(arrow(&[(110.0, 50.0), (200.0, -50.0), (290.0, 50.0)]));
        bind(
            &mut scene,
            arrow,
            BindingTarget::BindTo(left),
            BindingTarget::BindTo(right),
        );

        move_to(&mut scene, left, Point::new(0.0, 30.0));
        manager().update_bound_elements(&mut scene, left, &UpdateOptions::new());

        let current = linear(&scene, arrow);
        let start = current.point_at(0).unwrap();
        assert!(start.distance(Point::new(110.0, 50.0)) > 1.0, "start stayed at {start:?}");
        assert_point_near(current.point_at(1).unwrap(), Point::new(200.0, -50.0), 1e-9);
        assert_point_near(current.point_at(-1).unwrap(), Point::new(290.0, 50.0), 1e-9);
        assert_eq!(current.end_binding.unwrap().element_id, right);
    }

    #[test]
    fn test_eligible_elements_for_selected_arrow() {
        let (scene, square, arrow) = square_and_arrow();
        let m = manager();
        assert_eq!(
            m.get_eligible_elements_for_binding(&scene, &[arrow]),
            vec![SuggestedBinding::Bindable(square)]
        );
        // Both selected: nothing to suggest.
        assert!(m.get_eligible_elements_for_binding(&scene, &[arrow, square]).is_empty());
    }

    #[test]
    fn test_eligible_elements_skip_bound_ends() {
        let (mut scene, square, arrow) = square_and_arrow();
        let source = scene.add_element(rectangle(-100.0, 0.0, 90.0, 100.0));
        bind_end(&mut scene, arrow, square);
        assert_eq!(
            manager().get_eligible_elements_for_binding(&scene, &[arrow]),
            vec![SuggestedBinding::Bindable(source)]
        );

        bind(&mut scene, arrow, BindingTarget::BindTo(source), BindingTarget::Keep);
        assert!(manager().get_eligible_elements_for_binding(&scene, &[arrow]).is_empty());
    }

    #[test]
    fn test_eligible_elements_for_selected_shape() {
        let mut scene = Scene::new();
        let square = scene.add_element(rectangle(100.0, 0.0, 100.0, 100.0));
        let both = scene.add_element(arrow(&[(90.0, 50.0), (150.0, -100.0), (210.0, 50.0)]));
        let start_only = scene.add_element(arrow(&[(150.0, 110.0), (150.0, 300.0)]));
        let suggestions = manager().get_eligible_elements_for_binding(&scene, &[square]);
        assert_eq!(
            suggestions,
            vec![
                SuggestedBinding::Point {
                    linear: both,
                    edge: SuggestedEdge::Both,
                    bindable: square,
                },
                SuggestedBinding::Point {
                    linear: start_only,
                    edge: SuggestedEdge::Start,
                    bindable: square,
                },
            ]
        );
    }

    #[test]
    fn test_fix_bindings_after_deletion() {
        let (mut scene, left, right, arrow) = bound_pair();

        let deleted = scene.delete_element(right).unwrap();
        manager().fix_bindings_after_deletion(&mut scene, &[deleted]);

        let arrow = linear(&scene, arrow);
        assert!(arrow.end_binding.is_none());
        assert_eq!(arrow.start_binding.unwrap().element_id, left);
        assert_eq!(bindable(&scene, left).bound_element_ids, vec![arrow.id()]);
    }

    #[test]
    fn test_deleting_linear_cleans_shapes() {
        let (mut scene, square, arrow) = square_and_arrow();
        bind_end(&mut scene, arrow, square);
        let deleted = scene.delete_element(arrow).unwrap();
        manager().fix_bindings_after_deletion(&mut scene, &[deleted]);
        assert!(bindable(&scene, square).bound_element_ids.is_empty());
    }

    /// Left square bound to an arrow whose end is on the right square.
    fn bound_pair() -> (Scene, ElementId, ElementId, ElementId) {
        let mut scene = Scene::new();
        let left = scene.add_element(rectangle(0.0, 0.0, 100.0, 100.0));
        let right = scene.add_element(rectangle(300.0, 0.0, 100.0, 100.0));
        let arrow = scene.add_element(arrow(&[(110.0, 50.0), (290.0, 50.0)]));
        bind(
            &mut scene,
            arrow,
            BindingTarget::BindTo(left),
            BindingTarget::BindTo(right),
        );
        (scene, left, right, arrow)
    }

    fn duplicate(
        scene: &mut Scene,
        ids: &[ElementId],
        roles: DuplicationRoles,
    ) -> HashMap<ElementId, ElementId> {
        let originals: Vec<Element> = ids
            .iter()
            .map(|id| scene.element(*id).unwrap().clone())
            .collect();
        let map: HashMap<ElementId, ElementId> = ids
            .iter()
            .map(|&id| (id, scene.duplicate_element(id).unwrap()))
            .collect();
        manager().fix_bindings_after_duplication(scene, &originals, &map, roles);
        map
    }

    fn assert_copied_together(
        scene: &Scene,
        map: &HashMap<ElementId, ElementId>,
        ids: [ElementId; 3],
    ) {
        let [left, right, arrow] = ids;
        let copy = linear(scene, map[&arrow]);
        assert_eq!(copy.start_binding.unwrap().element_id, map[&left]);
        assert_eq!(copy.end_binding.unwrap().element_id, map[&right]);
        assert_eq!(bindable(scene, map[&left]).bound_element_ids, vec![map[&arrow]]);
        assert_eq!(bindable(scene, map[&right]).bound_element_ids, vec![map[&arrow]]);
        // Originals are untouched.
        let original = linear(scene, arrow);
        assert_eq!(original.start_binding.unwrap().element_id, left);
        assert_eq!(original.end_binding.unwrap().element_id, right);
        assert_eq!(bindable(scene, left).bound_element_ids, vec![arrow]);
        assert_eq!(bindable(scene, right).bound_element_ids, vec![arrow]);
    }

    #[test]
    fn test_duplicate_all_together() {
        let (mut scene, left, right, arrow) = bound_pair();
        let map = duplicate(&mut scene, &[left, right, arrow], DuplicationRoles::Normal);
        assert_copied_together(&scene, &map, [left, right, arrow]);
    }

    #[test]
    fn test_duplicate_all_together_reversed() {
        let (mut scene, left, right, arrow) = bound_pair();
        let map = duplicate(&mut scene, &[left, right, arrow], DuplicationRoles::Reversed);
        assert_copied_together(&scene, &map, [left, right, arrow]);
    }

    #[test]
    fn test_duplicate_arrow_alone() {
        for roles in [DuplicationRoles::Normal, DuplicationRoles::Reversed] {
            let (mut scene, left, right, arrow) = bound_pair();
            let map = duplicate(&mut scene, &[arrow], roles);

            let copy = linear(&scene, map[&arrow]);
            assert_eq!(copy.start_binding.unwrap().element_id, left, "{roles:?}");
            assert_eq!(copy.end_binding.unwrap().element_id, right, "{roles:?}");
            let original = linear(&scene, arrow);
            assert_eq!(original.start_binding.unwrap().element_id, left, "{roles:?}");
            assert_eq!(original.end_binding.unwrap().element_id, right, "{roles:?}");
            let both = vec![arrow, copy.id()];
            assert_eq!(bindable(&scene, left).bound_element_ids, both, "{roles:?}");
            assert_eq!(bindable(&scene, right).bound_element_ids, both, "{roles:?}");
        }
    }

    #[test]
    fn test_duplicate_shape_alone() {
        let (mut scene, left, _right, arrow) = bound_pair();
        let map = duplicate(&mut scene, &[left], DuplicationRoles::Normal);

        assert!(bindable(&scene, map[&left]).bound_element_ids.is_empty());
        assert_eq!(bindable(&scene, left).bound_element_ids, vec![arrow]);
        assert_eq!(linear(&scene, arrow).start_binding.unwrap().element_id, left);
    }

    #[test]
    fn test_duplicate_shape_alone_reversed() {
        let (mut scene, left, right, arrow) = bound_pair();
        let map = duplicate(&mut scene, &[left], DuplicationRoles::Reversed);

        let copy = map[&left];
        assert_eq!(bindable(&scene, copy).bound_element_ids, vec![arrow]);
        assert!(bindable(&scene, left).bound_element_ids.is_empty());
        let arrow_el = linear(&scene, arrow);
        assert_eq!(arrow_el.start_binding.unwrap().element_id, copy);
        assert_eq!(arrow_el.end_binding.unwrap().element_id, right);
        assert_eq!(bindable(&scene, right).bound_element_ids, vec![arrow]);
    }
}
