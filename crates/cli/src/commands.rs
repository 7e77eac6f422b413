//! Subcommand bodies. Each takes the raw JSON input and returns the JSON to
//! print, so they can be exercised without touching the filesystem.

use anyhow::{Context, bail};
use serde::Deserialize;

use inventra_products::{
    Attribute, Capabilities, EngineConfig, ProductFields, Variant, VariantDefaults, assemble,
    combination_count, generate_variants, resync_skus,
};

/// Product form as saved by the editor: plain fields plus the session's
/// attributes and variants.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    #[serde(flatten)]
    pub fields: ProductFields,
    pub attributes: Vec<Attribute>,
    pub variants: Vec<Variant>,
}

pub fn generate(
    attributes_json: &str,
    base_sku: &str,
    defaults: VariantDefaults,
    config: &EngineConfig,
) -> anyhow::Result<String> {
    let attributes: Vec<Attribute> =
        serde_json::from_str(attributes_json).context("attributes file is not a JSON attribute list")?;

    let count = combination_count(&attributes);
    if count > config.max_variants {
        bail!(
            "{count} combinations exceed the limit of {} variants",
            config.max_variants
        );
    }

    let variants = generate_variants(&attributes, base_sku, defaults)?;
    tracing::info!(variants = variants.len(), "generated variants");
    Ok(serde_json::to_string_pretty(&variants)?)
}

pub fn resync(variants_json: &str, base_sku: &str) -> anyhow::Result<String> {
    let variants: Vec<Variant> =
        serde_json::from_str(variants_json).context("variants file is not a JSON variant list")?;
    Ok(serde_json::to_string_pretty(&resync_skus(base_sku, &variants))?)
}

pub fn assemble_draft(draft_json: &str, capabilities: Capabilities) -> anyhow::Result<String> {
    let draft: Draft = serde_json::from_str(draft_json).context("draft file is not a JSON product draft")?;
    let payload = assemble(&draft.fields, &draft.attributes, &draft.variants, capabilities)?;
    Ok(serde_json::to_string_pretty(&payload)?)
}
