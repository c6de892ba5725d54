//! Bundle generation binary - reads a contract manifest and writes the
//! backing `.properties` resource bundles.
//!
//! Usage:
//!   cargo run --bin generate                 # Generate bundles from the manifest
//!
//! Required environment variables:
//! - I18N_MANIFEST (path to the contract manifest JSON)
//! - I18N_OUTPUT_DIR (directory the bundle files are written under)
//!
//! Optional:
//! - I18N_DEFAULT_LOCALE (defaults to $LANG, then "en")
//! - I18N_VERIFY (defaults to true)
//! - I18N_PEDANTIC (defaults to false)
//! - I18N_APPEND (defaults to false)
//! - I18N_AGGREGATE / I18N_AGGREGATE_NAME (defaults to false / "Messages")
//! - I18N_PERMISSIONS_NAME (defaults to "Permissions")
//! - I18N_VERBOSE (defaults to false)

use anyhow::{Context, Result};
use tracing::info;

use i18n_bundles::config::Config;
use i18n_bundles::generator::BundleGenerator;
use i18n_bundles::manifest;

fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("i18n_bundles=info".parse()?),
        )
        .init();

    info!("Starting resource bundle generation");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Step 1: Load the contract manifest
    info!(
        "Loading message contracts from {}",
        config.manifest_path.display()
    );
    let contracts = manifest::load(&config.manifest_path)?;

    if contracts.is_empty() {
        info!("Manifest declares no contracts, nothing to generate");
        return Ok(());
    }

    info!("Loaded {} message contract(s)", contracts.len());

    // Step 2: Generate the resource bundles
    let mut generator = BundleGenerator::new(config.generator_config());
    let report = generator
        .run(&contracts)
        .context("bundle generation failed")?;

    if config.verbose {
        for (identity, count) in &report.counters {
            println!("-> {}: {} messages", identity, count);
        }
    }
    println!("{}", report.summary());

    Ok(())
}
