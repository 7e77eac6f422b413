//! inventra: offline driver for the variant engine.
//!
//! Reads JSON fixtures, runs one engine operation and prints the result as
//! JSON on stdout. Failures (collisions, validation) exit non-zero.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use inventra_products::{Capabilities, EngineConfig, VariantDefaults};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "inventra")]
#[command(about = "Generate, resync and assemble product variants from JSON files")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build every variant for a list of attributes
    Generate {
        /// JSON file holding `[{ "name": ..., "values": [...] }, ...]`
        #[arg(long)]
        attributes: PathBuf,

        /// Base SKU (blank falls back to PROD)
        #[arg(long, default_value = "")]
        base_sku: String,

        /// Default selling price, in minor units
        #[arg(long)]
        selling_price: u64,

        /// Default cost price, in minor units
        #[arg(long)]
        cost_price: Option<u64>,
    },

    /// Re-derive SKUs of an existing variant list under a new base
    Resync {
        /// JSON file holding a variant list
        #[arg(long)]
        variants: PathBuf,

        #[arg(long)]
        base_sku: String,
    },

    /// Validate a product draft and print its persistence payload
    Assemble {
        /// JSON file holding product fields plus `attributes` and `variants`
        #[arg(long)]
        draft: PathBuf,

        /// Keep cost prices in the payload
        #[arg(long)]
        can_view_cost_price: bool,
    },
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    inventra_observability::init();

    let args = Args::parse();
    let output = match args.command {
        Command::Generate {
            attributes,
            base_sku,
            selling_price,
            cost_price,
        } => commands::generate(
            &read(&attributes)?,
            &base_sku,
            VariantDefaults {
                selling_price,
                cost_price,
            },
            &EngineConfig::from_env(),
        )?,
        Command::Resync { variants, base_sku } => commands::resync(&read(&variants)?, &base_sku)?,
        Command::Assemble {
            draft,
            can_view_cost_price,
        } => commands::assemble_draft(&read(&draft)?, Capabilities { can_view_cost_price })?,
    };

    println!("{output}");
    Ok(())
}
