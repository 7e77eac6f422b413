//! Submission assembly: validate an edited product and build the payload
//! handed to the persistence collaborator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use inventra_core::DomainError;

use crate::attribute::{Attribute, qualifying_attributes};
use crate::variant::Variant;

/// Product-level form fields.
///
/// `sku`, `selling_price` and `cost_price` only matter for products without
/// variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductFields {
    pub name: String,
    pub category: String,
    pub unit: String,
    pub description: String,
    pub sku: String,
    pub selling_price: Option<u64>,
    pub cost_price: Option<u64>,
}

/// What the submitting user may see and send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Without it, every cost price is left out of the payload.
    pub can_view_cost_price: bool,
}

/// Body of the create/update call.
///
/// Carries no server-assigned identifiers, so equal inputs always produce
/// an identical body and a retried submission sends the same variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub category: String,
    pub unit: String,
    pub description: String,
    pub has_variants: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<Variant>>,
}

impl ProductPayload {
    pub fn variants(&self) -> &[Variant] {
        self.variants.as_deref().unwrap_or_default()
    }

    pub fn attributes(&self) -> &[Attribute] {
        self.attributes.as_deref().unwrap_or_default()
    }
}

/// Which input a validation message belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProductField {
    Name,
    Category,
    Sku,
    SellingPrice,
    Variant { index: usize, name: String },
}

impl core::fmt::Display for ProductField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProductField::Name => f.write_str("name"),
            ProductField::Category => f.write_str("category"),
            ProductField::Sku => f.write_str("sku"),
            ProductField::SellingPrice => f.write_str("sellingPrice"),
            ProductField::Variant { index, name } => write!(f, "variants[{index}] ({name})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: ProductField,
    pub message: String,
}

impl ValidationError {
    fn new(field: ProductField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every problem found in one assembly attempt, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}", render_errors(.0))]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<ValidationError>);

fn render_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.0.first()
    }

    pub fn for_field(&self, field: &ProductField) -> Option<&ValidationError> {
        self.0.iter().find(|e| &e.field == field)
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(err: ValidationErrors) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// Validate and package a product for persistence.
///
/// Without variants the product-level SKU and selling price are required and
/// sent. With variants they are omitted; the qualifying attributes and every
/// variant are sent instead, and each variant needs a non-zero selling price.
pub fn assemble(
    fields: &ProductFields,
    attributes: &[Attribute],
    variants: &[Variant],
    capabilities: Capabilities,
) -> Result<ProductPayload, ValidationErrors> {
    let mut errors = Vec::new();

    let name = fields.name.trim();
    if name.is_empty() {
        errors.push(ValidationError::new(ProductField::Name, "name is required"));
    }

    let category = fields.category.trim();
    if category.is_empty() {
        errors.push(ValidationError::new(ProductField::Category, "category is required"));
    }

    let has_variants = !variants.is_empty();
    let cost = |price: Option<u64>| price.filter(|_| capabilities.can_view_cost_price);

    let mut payload = ProductPayload {
        name: name.to_string(),
        category: category.to_string(),
        unit: fields.unit.trim().to_string(),
        description: fields.description.clone(),
        has_variants,
        sku: None,
        selling_price: None,
        cost_price: None,
        attributes: None,
        variants: None,
    };

    if has_variants {
        for (index, variant) in variants.iter().enumerate() {
            if variant.selling_price == 0 {
                errors.push(ValidationError::new(
                    ProductField::Variant {
                        index,
                        name: variant.name.clone(),
                    },
                    "selling price must be greater than zero",
                ));
            }
        }

        payload.attributes = Some(qualifying_attributes(attributes));
        payload.variants = Some(
            variants
                .iter()
                .map(|v| Variant {
                    cost_price: cost(v.cost_price),
                    ..v.clone()
                })
                .collect(),
        );
    } else {
        let sku = fields.sku.trim();
        if sku.is_empty() {
            errors.push(ValidationError::new(ProductField::Sku, "SKU is required"));
        }

        let selling_price = fields.selling_price.unwrap_or(0);
        if selling_price == 0 {
            errors.push(ValidationError::new(
                ProductField::SellingPrice,
                "selling price must be greater than zero",
            ));
        }

        payload.sku = Some(sku.to_string());
        payload.selling_price = Some(selling_price);
        payload.cost_price = cost(fields.cost_price);
    }

    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "product submission rejected");
        return Err(ValidationErrors(errors));
    }

    Ok(payload)
}
