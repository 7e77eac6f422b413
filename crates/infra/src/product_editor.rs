//! Product editing workflow (application-level orchestration).
//!
//! Wires a [`VariantSession`] to its two collaborators:
//!
//! ```text
//! start(name) ──▶ SkuSuggestionService ──▶ session.base_sku
//!
//! submit(session)
//!   ↓
//! 1. handle(Submit)      pure; validation errors stop here
//!   ↓
//! 2. ProductStore        create (new product) or update (resumed product)
//!   ↓
//! 3. apply(Submitted)    only after the store accepted the payload
//! ```
//!
//! Because the session is only closed after step 2 succeeds, a failed store
//! call leaves it editable and a second `submit` sends the identical payload.

use thiserror::Error;

use inventra_core::{Aggregate, AggregateId, AggregateRoot, DomainError, ExpectedVersion};
use inventra_products::sku::base_of;
use inventra_products::{
    Capabilities, EngineConfig, ProductFields, ProductId, SessionCommand, SessionError,
    SessionEvent, SessionId, VariantSession,
};

use crate::product_store::{ProductStore, StoreError, StoredProduct};
use crate::sku_suggestion::{SkuSuggestionRequest, SkuSuggestionService};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// The session rejected the command (validation, collision, closed session).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The persistence collaborator failed; the session is still open.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A session opened on a stored product, with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumedSession {
    pub session: VariantSession,
    pub revision: u64,
}

#[derive(Debug)]
pub struct ProductEditor<S, P> {
    suggestions: S,
    store: P,
    config: EngineConfig,
}

impl<S, P> ProductEditor<S, P> {
    pub fn new(suggestions: S, store: P, config: EngineConfig) -> Self {
        Self {
            suggestions,
            store,
            config,
        }
    }

    pub fn into_parts(self) -> (S, P) {
        (self.suggestions, self.store)
    }
}

impl<S, P> ProductEditor<S, P>
where
    S: SkuSuggestionService,
    P: ProductStore,
{
    /// Open a session for a new product.
    ///
    /// The base SKU is seeded from the suggestion service. A failed suggestion
    /// is not fatal: the base stays blank and generated SKUs use the fallback
    /// prefix until the user types one.
    pub fn start(&self, product_name: &str) -> VariantSession {
        let session = VariantSession::new(SessionId::new(AggregateId::new()), self.config);

        let request = SkuSuggestionRequest {
            product_name: product_name.to_string(),
        };
        match self.suggestions.suggest(&request) {
            Ok(suggestion) => {
                tracing::debug!(sku = %suggestion.sku, "seeded base SKU from suggestion");
                session.with_base_sku(suggestion.sku)
            }
            Err(err) => {
                tracing::warn!(error = %err, "SKU suggestion failed; starting with blank base SKU");
                session
            }
        }
    }

    /// Open a session on a stored product, seeded with its attributes and
    /// variants.
    ///
    /// Variant products are stored without a product-level SKU, so the base
    /// is recovered from the first variant whose SKU still follows the
    /// derivation rule.
    pub fn resume(&self, id: ProductId) -> Result<ResumedSession, EditorError> {
        let stored = self.store.get(id)?.ok_or(StoreError::NotFound(id))?;
        let payload = &stored.payload;

        let base_sku = payload
            .sku
            .clone()
            .or_else(|| {
                payload
                    .variants()
                    .iter()
                    .enumerate()
                    .find_map(|(index, v)| base_of(v, index))
                    .map(str::to_string)
            })
            .unwrap_or_default();

        let session = VariantSession::resume(
            SessionId::new(AggregateId::new()),
            id,
            self.config,
            base_sku,
            payload.attributes().to_vec(),
            payload.variants().to_vec(),
        );

        tracing::debug!(
            product_id = %id,
            revision = stored.revision,
            variants = session.variants().len(),
            "resumed product session"
        );

        Ok(ResumedSession {
            session,
            revision: stored.revision,
        })
    }

    /// Run one editing command against the session.
    pub fn execute(
        &self,
        session: &mut VariantSession,
        command: &SessionCommand,
    ) -> Result<Vec<SessionEvent>, EditorError> {
        match session.execute(command) {
            Ok(events) => {
                for event in &events {
                    tracing::debug!(
                        session_id = %session.id_typed(),
                        event_type = event.event_type(),
                        version = session.version(),
                        "session event applied"
                    );
                }
                Ok(events)
            }
            Err(err) => {
                tracing::warn!(
                    session_id = %session.id_typed(),
                    error = %err,
                    "session command rejected"
                );
                Err(err.into())
            }
        }
    }

    /// Validate, persist, then close the session.
    ///
    /// Resumed sessions are saved with `update` under `expected`; new ones with
    /// `create` (`expected` is ignored).
    pub fn submit(
        &self,
        session: &mut VariantSession,
        fields: ProductFields,
        capabilities: Capabilities,
        expected: ExpectedVersion,
    ) -> Result<StoredProduct, EditorError> {
        let command = SessionCommand::Submit {
            fields,
            capabilities,
        };
        let events = session.handle(&command)?;

        let payload = events
            .iter()
            .find_map(|e| match e {
                SessionEvent::Submitted { payload } => Some(payload),
                _ => None,
            })
            .ok_or_else(|| {
                SessionError::from(DomainError::invariant("submit emitted no payload"))
            })?;

        let saved = match session.product_id() {
            Some(id) => self.store.update(id, payload, expected),
            None => self.store.create(payload),
        };

        let stored = match saved {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(
                    session_id = %session.id_typed(),
                    error = %err,
                    transient = err.is_transient(),
                    "product save failed; session left open"
                );
                return Err(err.into());
            }
        };

        for event in &events {
            session.apply(event);
        }

        tracing::info!(
            product_id = %stored.id,
            revision = stored.revision,
            has_variants = stored.payload.has_variants,
            variants = stored.payload.variants().len(),
            "product saved"
        );

        Ok(stored)
    }
}
