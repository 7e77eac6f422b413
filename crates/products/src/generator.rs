//! Variant generation: Cartesian product of attribute values plus SKU derivation.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use inventra_core::DomainError;

use crate::attribute::{Attribute, AttributeValuePair, qualifying_attributes};
use crate::sku::derive_sku;
use crate::variant::Variant;

/// Field values every freshly generated variant starts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDefaults {
    pub selling_price: u64,
    #[serde(default)]
    pub cost_price: Option<u64>,
}

/// Several variants resolved to the same SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuCollision {
    pub sku: String,
    pub variant_names: Vec<String>,
}

impl core::fmt::Display for SkuCollision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} is shared by {}", self.sku, self.variant_names.join(", "))
    }
}

/// Generation (or resync) produced duplicate SKUs; nothing was applied.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("duplicate variant SKUs: {}", render_collisions(.collisions))]
pub struct CollisionError {
    /// Every colliding group, ordered by first occurrence.
    pub collisions: Vec<SkuCollision>,
}

fn render_collisions(collisions: &[SkuCollision]) -> String {
    collisions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<CollisionError> for DomainError {
    fn from(err: CollisionError) -> Self {
        DomainError::invariant(err.to_string())
    }
}

/// Number of variants the attributes would generate (0 when none qualify).
///
/// Saturates instead of overflowing so callers can compare it to a limit
/// before building anything.
pub fn combination_count(attributes: &[Attribute]) -> usize {
    let qualified = qualifying_attributes(attributes);
    if qualified.is_empty() {
        return 0;
    }
    qualified
        .iter()
        .fold(1usize, |acc, a| acc.saturating_mul(a.values.len()))
}

/// Expand attributes into the ordered list of variants.
///
/// Blank attributes and values are skipped. The first attribute varies
/// slowest and each attribute's values keep their declared order. Returns an
/// empty list when nothing qualifies, and a [`CollisionError`] (never a
/// partial list) when two combinations derive the same SKU.
pub fn generate_variants(
    attributes: &[Attribute],
    base_sku: &str,
    defaults: VariantDefaults,
) -> Result<Vec<Variant>, CollisionError> {
    let qualified = qualifying_attributes(attributes);
    if qualified.is_empty() {
        tracing::debug!("no qualifying attributes; product has no variants");
        return Ok(Vec::new());
    }

    let variants: Vec<Variant> = cartesian_product(&qualified)
        .into_iter()
        .enumerate()
        .map(|(index, pairs)| Variant {
            name: Variant::name_for(&pairs),
            sku: derive_sku(base_sku, pairs.iter().map(|p| p.value.as_str()), index),
            attributes: pairs,
            cost_price: defaults.cost_price,
            selling_price: defaults.selling_price,
            stock: 0,
        })
        .collect();

    ensure_unique_skus(&variants)?;

    tracing::debug!(
        attributes = qualified.len(),
        variants = variants.len(),
        "generated variants"
    );

    Ok(variants)
}

fn cartesian_product(attributes: &[Attribute]) -> Vec<Vec<AttributeValuePair>> {
    let mut combinations: Vec<Vec<AttributeValuePair>> = vec![Vec::new()];

    for attribute in attributes {
        let mut next = Vec::with_capacity(combinations.len() * attribute.values.len());
        for prefix in &combinations {
            for value in &attribute.values {
                let mut combination = prefix.clone();
                combination.push(AttributeValuePair::new(attribute.name.clone(), value.clone()));
                next.push(combination);
            }
        }
        combinations = next;
    }

    combinations
}

/// Every group of variants sharing a SKU, in first-occurrence order.
pub fn find_collisions(variants: &[Variant]) -> Vec<SkuCollision> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_sku: HashMap<&str, Vec<String>> = HashMap::new();

    for variant in variants {
        let names = by_sku.entry(variant.sku.as_str()).or_insert_with(|| {
            order.push(variant.sku.as_str());
            Vec::new()
        });
        names.push(variant.name.clone());
    }

    order
        .into_iter()
        .filter_map(|sku| {
            let names = by_sku.remove(sku)?;
            (names.len() > 1).then(|| SkuCollision {
                sku: sku.to_string(),
                variant_names: names,
            })
        })
        .collect()
}

/// Fails with every collision when any two variants share a SKU.
pub fn ensure_unique_skus(variants: &[Variant]) -> Result<(), CollisionError> {
    let collisions = find_collisions(variants);
    if collisions.is_empty() {
        return Ok(());
    }
    tracing::warn!(groups = collisions.len(), "variant SKU collision");
    Err(CollisionError { collisions })
}

/// Carry price and stock over from `previous` to regenerated variants that
/// represent the same combination.
///
/// Combinations are matched on their (attribute, value) set, ignoring order.
/// Name and SKU always come from the regenerated variant.
pub fn carry_over_edits(previous: &[Variant], regenerated: Vec<Variant>) -> Vec<Variant> {
    let by_key: HashMap<BTreeSet<AttributeValuePair>, &Variant> =
        previous.iter().map(|v| (v.combination_key(), v)).collect();

    regenerated
        .into_iter()
        .map(|variant| match by_key.get(&variant.combination_key()) {
            Some(old) => Variant {
                cost_price: old.cost_price,
                selling_price: old.selling_price,
                stock: old.stock,
                ..variant
            },
            None => variant,
        })
        .collect()
}
