//! SKU-suggestion collaborator.
//!
//! The suggestion only seeds a session's base SKU; nothing downstream depends
//! on how it was produced.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use inventra_products::sku::{SKU_SEPARATOR, value_slug};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuSuggestionRequest {
    pub product_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuSuggestion {
    pub sku: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

pub trait SkuSuggestionService: Send + Sync {
    fn suggest(&self, request: &SkuSuggestionRequest) -> Result<SkuSuggestion, ServiceError>;
}

impl<S> SkuSuggestionService for Arc<S>
where
    S: SkuSuggestionService + ?Sized,
{
    fn suggest(&self, request: &SkuSuggestionRequest) -> Result<SkuSuggestion, ServiceError> {
        (**self).suggest(request)
    }
}

/// Deterministic in-process suggester for tests and offline use.
///
/// Builds `<W1>-<W2>-NNN` from the slugs of the first two words of the name
/// (`"Cotton Shirt"` → `COT-SHI-001`), numbering repeats per prefix.
#[derive(Debug, Default)]
pub struct LocalSkuSuggester {
    issued: RwLock<HashMap<String, u32>>,
}

impl LocalSkuSuggester {
    pub fn new() -> Self {
        Self::default()
    }

    fn prefix(product_name: &str) -> Option<String> {
        let parts: Vec<String> = product_name
            .split_whitespace()
            .map(value_slug)
            .filter(|s| !s.is_empty())
            .take(2)
            .collect();
        (!parts.is_empty()).then(|| parts.join(SKU_SEPARATOR))
    }
}

impl SkuSuggestionService for LocalSkuSuggester {
    fn suggest(&self, request: &SkuSuggestionRequest) -> Result<SkuSuggestion, ServiceError> {
        let prefix = Self::prefix(&request.product_name).ok_or_else(|| {
            ServiceError::InvalidRequest("product name has no usable characters".to_string())
        })?;

        let mut issued = self
            .issued
            .write()
            .map_err(|_| ServiceError::Unavailable("lock poisoned".to_string()))?;
        let seq = issued.entry(prefix.clone()).or_insert(0);
        *seq += 1;

        Ok(SkuSuggestion {
            sku: format!("{prefix}{SKU_SEPARATOR}{seq:03}"),
        })
    }
}
