//! Targeted edits to a generated variant list.
//!
//! Both operations build a new list (clone and patch) and never mutate the
//! input, so "only this field of this variant changed" holds by construction.

use inventra_core::{DomainError, DomainResult};

use crate::variant::{Variant, VariantField};

/// Replace one field of `variants[index]`; every other variant and field is
/// carried over unchanged.
pub fn update_variant(
    variants: &[Variant],
    index: usize,
    field: &VariantField,
) -> DomainResult<Vec<Variant>> {
    let target = variants
        .get(index)
        .ok_or_else(|| DomainError::out_of_range("variant", index, variants.len()))?;

    let mut next = variants.to_vec();
    next[index] = target.with_field(field);
    Ok(next)
}

/// Drop one variant. Remaining SKUs are not renumbered or re-derived.
pub fn remove_variant(variants: &[Variant], index: usize) -> DomainResult<Vec<Variant>> {
    if index >= variants.len() {
        return Err(DomainError::out_of_range("variant", index, variants.len()));
    }

    let mut next = variants.to_vec();
    next.remove(index);
    Ok(next)
}
