//! Variants: concrete sellable combinations of attribute values.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use inventra_core::ValueObject;

use crate::attribute::AttributeValuePair;

/// Separator between values in a variant's display name.
pub const NAME_SEPARATOR: &str = " / ";

/// One sellable combination with its own SKU, prices and stock.
///
/// Prices are in the smallest currency unit (e.g. cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub name: String,
    pub sku: String,
    pub attributes: Vec<AttributeValuePair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<u64>,
    pub selling_price: u64,
    #[serde(default)]
    pub stock: u64,
}

impl ValueObject for Variant {}

impl Variant {
    /// The variant's values in attribute-declaration order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|p| p.value.as_str())
    }

    /// Display name built from the values (`"Red / S"`).
    pub fn name_for(pairs: &[AttributeValuePair]) -> String {
        pairs
            .iter()
            .map(|p| p.value.as_str())
            .collect::<Vec<_>>()
            .join(NAME_SEPARATOR)
    }

    /// Order-insensitive identity of the combination this variant represents.
    pub fn combination_key(&self) -> BTreeSet<AttributeValuePair> {
        self.attributes.iter().cloned().collect()
    }

    /// Copy with one field replaced; everything else is cloned as-is.
    pub fn with_field(&self, field: &VariantField) -> Variant {
        let mut next = self.clone();
        match *field {
            VariantField::CostPrice(price) => next.cost_price = price,
            VariantField::SellingPrice(price) => next.selling_price = price,
            VariantField::Stock(stock) => next.stock = stock,
        }
        next
    }
}

/// The per-variant fields a user may edit directly, with their new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum VariantField {
    CostPrice(Option<u64>),
    SellingPrice(u64),
    Stock(u64),
}

impl VariantField {
    pub fn name(&self) -> &'static str {
        match self {
            VariantField::CostPrice(_) => "costPrice",
            VariantField::SellingPrice(_) => "sellingPrice",
            VariantField::Stock(_) => "stock",
        }
    }
}
