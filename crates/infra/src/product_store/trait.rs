use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use inventra_core::ExpectedVersion;
use inventra_products::{ProductId, ProductPayload};

/// A product as last accepted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProduct {
    pub id: ProductId,
    /// Starts at 1 on create, +1 per accepted update.
    pub revision: u64,
    pub payload: ProductPayload,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("payload could not be encoded or decoded: {0}")]
    Serialization(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether resending the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Create/update/read of product payloads.
///
/// Implementations must:
/// - assign the `ProductId` on create (payloads never carry one)
/// - reject an update whose `expected` revision does not match
pub trait ProductStore: Send + Sync {
    fn create(&self, payload: &ProductPayload) -> Result<StoredProduct, StoreError>;

    fn update(
        &self,
        id: ProductId,
        payload: &ProductPayload,
        expected: ExpectedVersion,
    ) -> Result<StoredProduct, StoreError>;

    fn get(&self, id: ProductId) -> Result<Option<StoredProduct>, StoreError>;
}

impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    fn create(&self, payload: &ProductPayload) -> Result<StoredProduct, StoreError> {
        (**self).create(payload)
    }

    fn update(
        &self,
        id: ProductId,
        payload: &ProductPayload,
        expected: ExpectedVersion,
    ) -> Result<StoredProduct, StoreError> {
        (**self).update(id, payload, expected)
    }

    fn get(&self, id: ProductId) -> Result<Option<StoredProduct>, StoreError> {
        (**self).get(id)
    }
}
