//! Tether Core Library
//!
//! Geometric predicates and the arrow-to-shape binding engine for a
//! diagram editor. Rendering, persistence and input handling live outside
//! this crate and talk to it through [`store::ElementStore`].

pub mod binding;
pub mod collision;
pub mod config;
pub mod elements;
pub mod geometry;
pub mod store;

pub use binding::{
    BindingManager, BindingTarget, DuplicationRoles, SuggestedBinding, SuggestedEdge,
    UpdateOptions, is_linear_element_simple_and_already_bound,
};
pub use collision::{
    binding_border_test, determine_focus_distance, determine_focus_point,
    distance_to_bindable_element, intersect_element_with_line, max_binding_gap,
};
pub use config::BindingConfig;
pub use elements::{
    BindableElement, BindableKind, BindingEdge, Element, ElementId, ElementUpdate, LinearElement,
    LinearKind, PointBinding,
};
pub use store::{ElementStore, Scene, StoreError, StoreResult};
