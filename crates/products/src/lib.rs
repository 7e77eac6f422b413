//! Product variant engine.
//!
//! Turns user-declared attributes (Color, Size, ...) into sellable variants
//! with derived SKUs, and keeps that set consistent while attributes, the base
//! SKU or individual variants are edited. Pure, deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod assembler;
pub mod attribute;
pub mod config;
pub mod editor;
pub mod generator;
pub mod product;
pub mod session;
pub mod sku;
pub mod variant;

pub use assembler::{
    Capabilities, ProductField, ProductFields, ProductPayload, ValidationError, ValidationErrors,
    assemble,
};
pub use attribute::{Attribute, AttributeStore, AttributeValuePair, qualifying_attributes};
pub use config::EngineConfig;
pub use editor::{remove_variant, update_variant};
pub use generator::{
    CollisionError, SkuCollision, VariantDefaults, carry_over_edits, combination_count,
    generate_variants,
};
pub use product::ProductId;
pub use session::{
    SessionCommand, SessionError, SessionEvent, SessionId, SessionState, VariantSession,
};
pub use sku::{FALLBACK_BASE_SKU, base_of, derive_sku, resync_skus};
pub use variant::{Variant, VariantField};
