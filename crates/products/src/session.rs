//! Variant editing session (aggregate).
//!
//! Owns the attribute store, the current variant list, the `curated` flag and
//! the session state. Commands are decided by [`Aggregate::handle`], which
//! computes the complete next attribute/variant lists on copies; events carry
//! those snapshots and [`Aggregate::apply`] swaps them in. A rejected command
//! (bad index, SKU collision, failed validation) therefore leaves the session
//! untouched.
//!
//! ```text
//! NoVariants ──edit──▶ EditingAttributes ──Generate──▶ Generated ──edit variant──▶ Curated
//!      ▲                                                   ▲                          │
//!      └─ empty generation / last variant removed / ──────┴──── Generate (confirm) ───┘
//!         last qualifying attribute cleared
//!          NoVariants | Generated | Curated ──Submit──▶ Submitted
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use inventra_core::{Aggregate, AggregateId, AggregateRoot, DomainError};

use crate::assembler::{Capabilities, ProductFields, ProductPayload, ValidationErrors, assemble};
use crate::attribute::{Attribute, AttributeStore};
use crate::config::EngineConfig;
use crate::editor;
use crate::generator::{
    CollisionError, VariantDefaults, carry_over_edits, combination_count, ensure_unique_skus,
    generate_variants,
};
use crate::product::ProductId;
use crate::sku::resync_skus;
use crate::variant::{Variant, VariantField};

/// Editing session identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub AggregateId);

impl SessionId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoVariants,
    EditingAttributes,
    Generated,
    Curated,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionCommand {
    AddAttribute,
    /// Removes the attribute and regenerates from the remaining ones.
    RemoveAttribute {
        index: usize,
        defaults: VariantDefaults,
    },
    RenameAttribute {
        index: usize,
        name: String,
    },
    AddValue {
        attr_index: usize,
    },
    RemoveValue {
        attr_index: usize,
        value_index: usize,
    },
    UpdateValue {
        attr_index: usize,
        value_index: usize,
        value: String,
    },
    ChangeBaseSku {
        base_sku: String,
    },
    /// Full regeneration; replaces the variant list.
    Generate {
        defaults: VariantDefaults,
    },
    UpdateVariant {
        index: usize,
        field: VariantField,
    },
    RemoveVariant {
        index: usize,
    },
    Submit {
        fields: ProductFields,
        capabilities: Capabilities,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    AttributesEdited {
        attributes: AttributeStore,
    },
    AttributeRemoved {
        index: usize,
        attributes: AttributeStore,
        variants: Vec<Variant>,
    },
    BaseSkuChanged {
        base_sku: String,
        variants: Vec<Variant>,
    },
    VariantsGenerated {
        variants: Vec<Variant>,
    },
    VariantUpdated {
        index: usize,
        field: VariantField,
        variants: Vec<Variant>,
    },
    VariantRemoved {
        index: usize,
        variants: Vec<Variant>,
    },
    Submitted {
        payload: ProductPayload,
    },
}

impl SessionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::AttributesEdited { .. } => "products.variant_session.attributes_edited",
            SessionEvent::AttributeRemoved { .. } => "products.variant_session.attribute_removed",
            SessionEvent::BaseSkuChanged { .. } => "products.variant_session.base_sku_changed",
            SessionEvent::VariantsGenerated { .. } => "products.variant_session.variants_generated",
            SessionEvent::VariantUpdated { .. } => "products.variant_session.variant_updated",
            SessionEvent::VariantRemoved { .. } => "products.variant_session.variant_removed",
            SessionEvent::Submitted { .. } => "products.variant_session.submitted",
        }
    }
}

/// Why a session command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Generation or resync would produce duplicate SKUs.
    #[error(transparent)]
    Collision(#[from] CollisionError),

    /// The product failed submission checks.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

impl From<SessionError> for DomainError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Domain(e) => e,
            SessionError::Collision(e) => e.into(),
            SessionError::Validation(e) => e.into(),
        }
    }
}

/// Aggregate root: one product's attribute/variant editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSession {
    id: SessionId,
    product_id: Option<ProductId>,
    config: EngineConfig,
    base_sku: String,
    attributes: AttributeStore,
    variants: Vec<Variant>,
    curated: bool,
    state: SessionState,
    payload: Option<ProductPayload>,
    version: u64,
}

impl VariantSession {
    /// Session for a product that does not exist yet.
    pub fn new(id: SessionId, config: EngineConfig) -> Self {
        Self {
            id,
            product_id: None,
            config,
            base_sku: String::new(),
            attributes: AttributeStore::new(),
            variants: Vec::new(),
            curated: false,
            state: SessionState::NoVariants,
            payload: None,
            version: 0,
        }
    }

    /// Session seeded from a stored product's attributes and variants.
    ///
    /// Stored variants are taken as-is (they are not regenerated) and the
    /// session starts un-curated.
    pub fn resume(
        id: SessionId,
        product_id: ProductId,
        config: EngineConfig,
        base_sku: impl Into<String>,
        attributes: Vec<Attribute>,
        variants: Vec<Variant>,
    ) -> Self {
        let state = if !variants.is_empty() {
            SessionState::Generated
        } else if !attributes.is_empty() {
            SessionState::EditingAttributes
        } else {
            SessionState::NoVariants
        };

        Self {
            id,
            product_id: Some(product_id),
            config,
            base_sku: base_sku.into(),
            attributes: AttributeStore::from_attributes(attributes),
            variants,
            curated: false,
            state,
            payload: None,
            version: 0,
        }
    }

    /// Seed the base SKU before any command (e.g. from a suggestion).
    pub fn with_base_sku(mut self, base_sku: impl Into<String>) -> Self {
        self.base_sku = base_sku.into();
        self
    }

    pub fn id_typed(&self) -> SessionId {
        self.id
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn base_sku(&self) -> &str {
        &self.base_sku
    }

    pub fn attributes(&self) -> &[Attribute] {
        self.attributes.attributes()
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// `hasVariants` of the product being edited.
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// True once a generated list has been edited by hand; callers should
    /// confirm before regenerating.
    pub fn is_curated(&self) -> bool {
        self.curated
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Payload emitted by a successful submit.
    pub fn payload(&self) -> Option<&ProductPayload> {
        self.payload.as_ref()
    }
}

impl AggregateRoot for VariantSession {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for VariantSession {
    type Command = SessionCommand;
    type Event = SessionEvent;
    type Error = SessionError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SessionEvent::AttributesEdited { attributes } => {
                let cleared = !attributes.has_qualifying()
                    && (self.attributes.has_qualifying() || !self.variants.is_empty());
                self.attributes = attributes.clone();
                if cleared {
                    self.replace_generated(&[]);
                } else if self.state == SessionState::NoVariants {
                    self.state = SessionState::EditingAttributes;
                }
            }
            SessionEvent::AttributeRemoved {
                attributes,
                variants,
                ..
            } => {
                self.attributes = attributes.clone();
                self.replace_generated(variants);
            }
            SessionEvent::BaseSkuChanged { base_sku, variants } => {
                self.base_sku = base_sku.clone();
                self.variants = variants.clone();
            }
            SessionEvent::VariantsGenerated { variants } => {
                self.replace_generated(variants);
            }
            SessionEvent::VariantUpdated { variants, .. }
            | SessionEvent::VariantRemoved { variants, .. } => {
                self.variants = variants.clone();
                self.curated = true;
                self.state = if self.variants.is_empty() {
                    SessionState::NoVariants
                } else {
                    SessionState::Curated
                };
            }
            SessionEvent::Submitted { payload } => {
                self.payload = Some(payload.clone());
                self.state = SessionState::Submitted;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        if self.state == SessionState::Submitted {
            return Err(DomainError::conflict("session already submitted").into());
        }

        let event = match command {
            SessionCommand::AddAttribute => {
                let mut next = self.attributes.clone();
                next.add_attribute();
                SessionEvent::AttributesEdited { attributes: next }
            }
            SessionCommand::RemoveAttribute { index, defaults } => {
                let mut next = self.attributes.clone();
                next.remove_attribute(*index)?;
                let variants = self.regenerate(next.attributes(), *defaults)?;
                SessionEvent::AttributeRemoved {
                    index: *index,
                    attributes: next,
                    variants,
                }
            }
            SessionCommand::RenameAttribute { index, name } => {
                let mut next = self.attributes.clone();
                next.rename_attribute(*index, name.clone())?;
                SessionEvent::AttributesEdited { attributes: next }
            }
            SessionCommand::AddValue { attr_index } => {
                let mut next = self.attributes.clone();
                next.add_value(*attr_index)?;
                SessionEvent::AttributesEdited { attributes: next }
            }
            SessionCommand::RemoveValue {
                attr_index,
                value_index,
            } => {
                let mut next = self.attributes.clone();
                next.remove_value(*attr_index, *value_index)?;
                SessionEvent::AttributesEdited { attributes: next }
            }
            SessionCommand::UpdateValue {
                attr_index,
                value_index,
                value,
            } => {
                let mut next = self.attributes.clone();
                next.update_value(*attr_index, *value_index, value.clone())?;
                SessionEvent::AttributesEdited { attributes: next }
            }
            SessionCommand::ChangeBaseSku { base_sku } => {
                let variants = resync_skus(base_sku, &self.variants);
                ensure_unique_skus(&variants)?;
                SessionEvent::BaseSkuChanged {
                    base_sku: base_sku.clone(),
                    variants,
                }
            }
            SessionCommand::Generate { defaults } => SessionEvent::VariantsGenerated {
                variants: self.regenerate(self.attributes.attributes(), *defaults)?,
            },
            SessionCommand::UpdateVariant { index, field } => SessionEvent::VariantUpdated {
                index: *index,
                field: *field,
                variants: editor::update_variant(&self.variants, *index, field)?,
            },
            SessionCommand::RemoveVariant { index } => SessionEvent::VariantRemoved {
                index: *index,
                variants: editor::remove_variant(&self.variants, *index)?,
            },
            SessionCommand::Submit {
                fields,
                capabilities,
            } => {
                if self.state == SessionState::EditingAttributes {
                    return Err(DomainError::conflict(
                        "attributes declared but variants not generated",
                    )
                    .into());
                }
                SessionEvent::Submitted {
                    payload: self.assemble(fields, *capabilities)?,
                }
            }
        };

        Ok(vec![event])
    }
}

impl VariantSession {
    fn replace_generated(&mut self, variants: &[Variant]) {
        self.variants = variants.to_vec();
        self.curated = false;
        self.state = if self.variants.is_empty() {
            SessionState::NoVariants
        } else {
            SessionState::Generated
        };
    }

    fn regenerate(
        &self,
        attributes: &[Attribute],
        defaults: VariantDefaults,
    ) -> Result<Vec<Variant>, SessionError> {
        let count = combination_count(attributes);
        if count > self.config.max_variants {
            return Err(DomainError::validation(format!(
                "{count} combinations exceed the limit of {} variants",
                self.config.max_variants
            ))
            .into());
        }

        let fresh = generate_variants(attributes, &self.base_sku, defaults)?;
        if self.config.preserve_curated_edits {
            Ok(carry_over_edits(&self.variants, fresh))
        } else {
            Ok(fresh)
        }
    }

    /// A typed product SKU wins; a blank one falls back to the base SKU.
    fn assemble(
        &self,
        fields: &ProductFields,
        capabilities: Capabilities,
    ) -> Result<ProductPayload, ValidationErrors> {
        let sku = if fields.sku.trim().is_empty() {
            self.base_sku.clone()
        } else {
            fields.sku.clone()
        };
        let fields = ProductFields {
            sku,
            ..fields.clone()
        };
        assemble(&fields, self.attributes.attributes(), &self.variants, capabilities)
    }
}
