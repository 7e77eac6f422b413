//! Infrastructure layer: collaborator ports, in-memory adapters and the
//! product editing workflow that wires them to the variant session.

pub mod product_editor;
pub mod product_store;
pub mod sku_suggestion;

mod integration_tests;

pub use product_editor::{EditorError, ProductEditor, ResumedSession};
pub use product_store::{InMemoryProductStore, ProductStore, StoreError, StoredProduct};
pub use sku_suggestion::{
    LocalSkuSuggester, ServiceError, SkuSuggestion, SkuSuggestionRequest, SkuSuggestionService,
};
