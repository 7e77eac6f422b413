//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Env var toggling [`EngineConfig::preserve_curated_edits`].
pub const ENV_PRESERVE_CURATED_EDITS: &str = "INVENTRA_PRESERVE_CURATED_EDITS";
/// Env var overriding [`EngineConfig::max_variants`].
pub const ENV_MAX_VARIANTS: &str = "INVENTRA_MAX_VARIANTS";

/// Tunables for variant editing sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// On regeneration, keep price and stock of combinations that survive.
    pub preserve_curated_edits: bool,
    /// Upper bound on the number of variants one generation may produce.
    pub max_variants: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preserve_curated_edits: true,
            max_variants: 1000,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `INVENTRA_*` environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_PRESERVE_CURATED_EDITS) {
            match parse_bool(&raw) {
                Some(value) => config.preserve_curated_edits = value,
                None => tracing::warn!(
                    var = ENV_PRESERVE_CURATED_EDITS,
                    value = %raw,
                    "ignoring unparsable boolean"
                ),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_VARIANTS) {
            match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => config.max_variants = value,
                _ => tracing::warn!(
                    var = ENV_MAX_VARIANTS,
                    value = %raw,
                    "ignoring invalid variant limit"
                ),
            }
        }

        config
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
