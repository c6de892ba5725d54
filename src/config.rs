use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::generator::{GeneratorConfig, VerifyMode};
use crate::locale::Locale;

#[derive(Debug, Clone)]
pub struct Config {
    // Input
    pub manifest_path: PathBuf,

    // Output
    pub output_dir: PathBuf,
    pub default_locale: Locale,

    // Verification
    pub verify: bool,
    pub pedantic: bool,

    // Write behavior
    pub append: bool,
    pub aggregate: bool,
    pub aggregate_name: String,
    pub permissions_name: String,

    // Reporting
    pub verbose: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Input
            manifest_path: std::env::var("I18N_MANIFEST")
                .context("I18N_MANIFEST not set")?
                .into(),

            // Output
            output_dir: std::env::var("I18N_OUTPUT_DIR")
                .context("I18N_OUTPUT_DIR not set")?
                .into(),
            default_locale: default_locale()?,

            // Verification
            verify: flag("I18N_VERIFY", true),
            pedantic: flag("I18N_PEDANTIC", false),

            // Write behavior
            append: flag("I18N_APPEND", false),
            aggregate: flag("I18N_AGGREGATE", false),
            aggregate_name: std::env::var("I18N_AGGREGATE_NAME")
                .unwrap_or_else(|_| "Messages".to_string()),
            permissions_name: std::env::var("I18N_PERMISSIONS_NAME")
                .unwrap_or_else(|_| "Permissions".to_string()),

            // Reporting
            verbose: flag("I18N_VERBOSE", false),
        })
    }

    /// Translate the env surface into generator settings. `verify` gates
    /// all three passes at once; `pedantic` upgrades them from logging
    /// violations to aborting on the first one.
    pub fn generator_config(&self) -> GeneratorConfig {
        let mode = if !self.verify {
            VerifyMode::Off
        } else if self.pedantic {
            VerifyMode::Pedantic
        } else {
            VerifyMode::Lenient
        };

        let mut config = GeneratorConfig::new(self.output_dir.clone(), self.default_locale.clone());
        config.duplicate_keys = mode;
        config.quoted_placeholders = mode;
        config.unescaped_newlines = mode;
        config.append = self.append;
        config.aggregate = self.aggregate;
        config.aggregate_name = self.aggregate_name.clone();
        config.permissions_name = self.permissions_name.clone();
        config.verbose = self.verbose;
        config
    }
}

/// The default locale: `I18N_DEFAULT_LOCALE` when set, else the process
/// locale from `LANG` (encoding and modifier suffixes stripped), else `en`.
fn default_locale() -> Result<Locale> {
    if let Ok(tag) = std::env::var("I18N_DEFAULT_LOCALE") {
        return Locale::parse(&tag)
            .with_context(|| format!("I18N_DEFAULT_LOCALE `{}` is not a valid locale tag", tag));
    }

    if let Ok(lang) = std::env::var("LANG") {
        // e.g. LANG=en_US.UTF-8 or LANG=de_DE@euro
        let tag = lang
            .split(|c| c == '.' || c == '@')
            .next()
            .unwrap_or_default();
        if !tag.is_empty() && tag != "C" && tag != "POSIX" {
            if let Ok(locale) = Locale::parse(tag) {
                return Ok(locale);
            }
        }
    }

    Ok(Locale::new("en", "", ""))
}

fn flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
