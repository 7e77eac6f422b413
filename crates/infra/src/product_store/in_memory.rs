use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use inventra_core::{AggregateId, ExpectedVersion};
use inventra_products::{ProductId, ProductPayload};

use super::r#trait::{ProductStore, StoreError, StoredProduct};

#[derive(Debug, Clone)]
struct Record {
    revision: u64,
    body: JsonValue,
    updated_at: DateTime<Utc>,
}

/// In-memory product store.
///
/// Keeps each payload as the JSON body the REST backend would receive, so
/// reads go through the same encode/decode path as the wire.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<ProductId, Record>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn encode(payload: &ProductPayload) -> Result<JsonValue, StoreError> {
        serde_json::to_value(payload).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(id: ProductId, record: &Record) -> Result<StoredProduct, StoreError> {
        let payload = serde_json::from_value(record.body.clone())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredProduct {
            id,
            revision: record.revision,
            payload,
            updated_at: record.updated_at,
        })
    }
}

impl ProductStore for InMemoryProductStore {
    fn create(&self, payload: &ProductPayload) -> Result<StoredProduct, StoreError> {
        let record = Record {
            revision: 1,
            body: Self::encode(payload)?,
            updated_at: Utc::now(),
        };

        let id = ProductId::new(AggregateId::new());
        let mut products = self
            .products
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        let stored = Self::decode(id, &record)?;
        products.insert(id, record);
        Ok(stored)
    }

    fn update(
        &self,
        id: ProductId,
        payload: &ProductPayload,
        expected: ExpectedVersion,
    ) -> Result<StoredProduct, StoreError> {
        let body = Self::encode(payload)?;
        let mut products = self
            .products
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let record = products.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        expected
            .check(record.revision)
            .map_err(|e| StoreError::Concurrency(e.to_string()))?;

        record.revision += 1;
        record.body = body;
        record.updated_at = Utc::now();
        Self::decode(id, record)
    }

    fn get(&self, id: ProductId) -> Result<Option<StoredProduct>, StoreError> {
        let products = self
            .products
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        products.get(&id).map(|r| Self::decode(id, r)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str) -> ProductPayload {
        ProductPayload {
            name: name.to_string(),
            category: "Kitchen".to_string(),
            unit: "pcs".to_string(),
            description: String::new(),
            has_variants: false,
            sku: Some("MUG".to_string()),
            selling_price: Some(800),
            cost_price: None,
            attributes: None,
            variants: None,
        }
    }

    #[test]
    fn create_assigns_id_and_first_revision() {
        let store = InMemoryProductStore::new();
        let stored = store.create(&payload("Mug")).unwrap();

        assert_eq!(stored.revision, 1);
        assert_eq!(stored.payload, payload("Mug"));
        assert_eq!(store.get(stored.id).unwrap(), Some(stored));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_bumps_revision_when_expected_matches() {
        let store = InMemoryProductStore::new();
        let created = store.create(&payload("Mug")).unwrap();

        let updated = store
            .update(created.id, &payload("Big Mug"), ExpectedVersion::Exact(1))
            .unwrap();

        assert_eq!(updated.revision, 2);
        assert_eq!(updated.payload.name, "Big Mug");
    }

    #[test]
    fn stale_update_is_a_concurrency_error() {
        let store = InMemoryProductStore::new();
        let created = store.create(&payload("Mug")).unwrap();
        store
            .update(created.id, &payload("Big Mug"), ExpectedVersion::Exact(1))
            .unwrap();

        let err = store
            .update(created.id, &payload("Small Mug"), ExpectedVersion::Exact(1))
            .unwrap_err();
        assert!(matches!(err, StoreError::Concurrency(_)));
        assert!(!err.is_transient());
        assert_eq!(store.get(created.id).unwrap().unwrap().payload.name, "Big Mug");
    }

    #[test]
    fn unknown_product() {
        let store = InMemoryProductStore::new();
        let id = ProductId::new(AggregateId::new());
        assert_eq!(store.get(id).unwrap(), None);
        assert_eq!(
            store.update(id, &payload("Mug"), ExpectedVersion::Any).unwrap_err(),
            StoreError::NotFound(id)
        );
    }
}
