//! SKU derivation and base-SKU resynchronization.
//!
//! A variant SKU is `<base>-<slug>`, where the slug is built from the variant's
//! values: each value keeps its ASCII alphanumerics, is uppercased and cut to
//! [`SLUG_LEN`] characters, and the per-value slugs are joined with `-`.
//! The truncation rule decides which inputs collide, so it must stay exact.

use crate::variant::Variant;

/// Base used when the product has no SKU yet.
pub const FALLBACK_BASE_SKU: &str = "PROD";

/// Characters kept from each value.
pub const SLUG_LEN: usize = 3;

/// Joins the base and slug, and the per-value slugs.
pub const SKU_SEPARATOR: &str = "-";

/// Trimmed base SKU, or [`FALLBACK_BASE_SKU`] when blank.
pub fn effective_base(base_sku: &str) -> &str {
    let trimmed = base_sku.trim();
    if trimmed.is_empty() {
        FALLBACK_BASE_SKU
    } else {
        trimmed
    }
}

/// Slug fragment for one value (`"Blue"` → `"BLU"`, `"x-l"` → `"XL"`).
pub fn value_slug(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(SLUG_LEN)
        .collect()
}

/// Slug for a whole combination: per-value slugs joined with `-`, empty
/// ones included. `None` only when the joined string is empty, which needs a
/// single value with no slug characters (`["!!", "??"]` gives `"-"`).
pub fn combination_slug<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let slug = values
        .into_iter()
        .map(value_slug)
        .collect::<Vec<_>>()
        .join(SKU_SEPARATOR);
    (!slug.is_empty()).then_some(slug)
}

/// SKU for the combination at `index` (0-based position in the list).
///
/// Falls back to `<base>-V<index+1>` when the joined slug is empty.
pub fn derive_sku<'a, I>(base_sku: &str, values: I, index: usize) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let base = effective_base(base_sku);
    match combination_slug(values) {
        Some(slug) => format!("{base}{SKU_SEPARATOR}{slug}"),
        None => format!("{base}{SKU_SEPARATOR}V{}", index + 1),
    }
}

/// Re-derive every variant's SKU under a new base.
///
/// Slugs come from each variant's own `attributes`, not from the attribute
/// store, so the combination space is never recomputed. Only `sku` changes;
/// length and order are preserved.
pub fn resync_skus(new_base_sku: &str, variants: &[Variant]) -> Vec<Variant> {
    let resynced: Vec<Variant> = variants
        .iter()
        .enumerate()
        .map(|(index, variant)| Variant {
            sku: derive_sku(new_base_sku, variant.values(), index),
            ..variant.clone()
        })
        .collect();

    tracing::debug!(
        base_sku = effective_base(new_base_sku),
        variants = resynced.len(),
        "resynced variant SKUs"
    );

    resynced
}

/// Recover the base a variant's SKU was derived from, if it still follows
/// the derivation rule for its values and list position.
pub fn base_of(variant: &Variant, index: usize) -> Option<&str> {
    let suffix = match combination_slug(variant.values()) {
        Some(slug) => format!("{SKU_SEPARATOR}{slug}"),
        None => format!("{SKU_SEPARATOR}V{}", index + 1),
    };
    variant
        .sku
        .strip_suffix(&suffix)
        .filter(|base| !base.trim().is_empty())
}
