//! Element store abstraction.
//!
//! The binding engine never owns elements. It reads the current state from
//! an [`ElementStore`] on every call and writes back through
//! [`ElementStore::mutate_element`].

mod memory;

pub use memory::Scene;

use crate::elements::{Element, ElementId, ElementUpdate};
use thiserror::Error;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Element not found: {0}")]
    NotFound(ElementId),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for element stores.
///
/// Implementations must serialize access themselves; the binding engine
/// assumes exclusive access for the duration of each call.
pub trait ElementStore {
    /// All elements in z-order (back to front), deleted ones included.
    fn elements(&self) -> Vec<&Element>;

    /// Look up an element, deleted or not.
    fn element(&self, id: ElementId) -> Option<&Element>;

    /// The elements among `ids` that exist and are not deleted, in the order
    /// of `ids`.
    fn non_deleted_elements(&self, ids: &[ElementId]) -> Vec<&Element>;

    /// Replace an element by its next version with `update` applied.
    ///
    /// `inform` notifies change listeners (renderer, version tracking).
    fn mutate_element(
        &mut self,
        id: ElementId,
        update: ElementUpdate,
        inform: bool,
    ) -> StoreResult<()>;
}
