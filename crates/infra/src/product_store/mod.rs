//! Product persistence boundary.
//!
//! The real backend sits behind the REST API; this module only fixes the
//! shape of the calls the editing workflow makes against it.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryProductStore;
pub use r#trait::{ProductStore, StoreError, StoredProduct};
