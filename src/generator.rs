//! Build-time bundle generation.
//!
//! The generator turns a batch of message contracts into `.properties`
//! files. Each contract maps to one bundle identity (base name plus
//! declared or default locale); static defines are written ahead of the
//! operation lines, permission descriptions go to a shared bundle, and an
//! optional aggregate bundle collects every message in one place. After
//! the scan, every bundle generated in the default locale is copied to its
//! locale-less sibling so bare base-name lookups succeed at runtime.
//!
//! Three verification passes guard the emitted text: duplicate keys within
//! one bundle, placeholders trapped inside single-quoted spans, and
//! literal newlines missing a continuation backslash. Each pass is
//! independently off, lenient (log and keep going) or pedantic (abort the
//! run, leaving already-written files as-is).

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::bundle::{BundleIdentity, BundleKind};
use crate::contract::{MessageContract, ReturnShape};
use crate::error::GeneratorError;
use crate::locale::Locale;
use crate::source::relative_path;

/// How a verification pass reacts to a violation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerifyMode {
    /// Pass disabled.
    Off,
    /// Log the violation at error level and keep going.
    #[default]
    Lenient,
    /// Abort the run on the first violation. Files written before the
    /// violation are left in place.
    Pedantic,
}

/// Generator settings.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory bundle files are written under. Dotted base names map to
    /// subdirectories the same way the runtime source resolves them.
    pub output_dir: PathBuf,

    /// Locale assumed for contracts that declare none. Bundles generated
    /// in this locale are promoted to the locale-less filename.
    pub default_locale: Locale,

    // Verification passes
    pub duplicate_keys: VerifyMode,
    pub quoted_placeholders: VerifyMode,
    pub unescaped_newlines: VerifyMode,

    /// Keep the existing contents of bundle files instead of truncating
    /// them on the first write of the run.
    pub append: bool,

    /// Also collect every message into one aggregate bundle.
    pub aggregate: bool,
    pub aggregate_name: String,

    /// Base name of the shared bundle holding permission descriptions.
    pub permissions_name: String,

    /// List per-bundle counters in the final report log.
    pub verbose: bool,
}

impl GeneratorConfig {
    pub fn new(output_dir: impl Into<PathBuf>, default_locale: Locale) -> GeneratorConfig {
        GeneratorConfig {
            output_dir: output_dir.into(),
            default_locale,
            duplicate_keys: VerifyMode::Lenient,
            quoted_placeholders: VerifyMode::Lenient,
            unescaped_newlines: VerifyMode::Lenient,
            append: false,
            aggregate: false,
            aggregate_name: "Messages".to_string(),
            permissions_name: "Permissions".to_string(),
            verbose: false,
        }
    }
}

/// Outcome of one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratorReport {
    pub bundles: usize,
    pub messages: usize,

    /// Message count per bundle identity, promoted bundles included.
    pub counters: BTreeMap<String, usize>,
}

impl GeneratorReport {
    pub fn summary(&self) -> String {
        if self.bundles == 0 {
            "No resource bundles generated because no i18n messages were found.".to_string()
        } else {
            format!(
                "{} resource bundle(s) created with {} message(s) in total.",
                self.bundles, self.messages
            )
        }
    }
}

/// Writes message contracts out as `.properties` resource bundles.
pub struct BundleGenerator {
    config: GeneratorConfig,
    counters: HashMap<BundleIdentity, usize>,
    written_keys: HashMap<BundleIdentity, Vec<String>>,
}

impl BundleGenerator {
    pub fn new(config: GeneratorConfig) -> BundleGenerator {
        BundleGenerator {
            config,
            counters: HashMap::new(),
            written_keys: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate bundle files for every contract, in input order. Returns
    /// the run report, or the first fatal error. Pedantic verification
    /// violations abort with files written so far left as-is.
    pub fn run(
        &mut self,
        contracts: &[MessageContract],
    ) -> Result<GeneratorReport, GeneratorError> {
        self.counters.clear();
        self.written_keys.clear();

        info!("scanning {} message contract(s)", contracts.len());

        let permissions = BundleIdentity::new(
            &self.config.permissions_name,
            Some(self.config.default_locale.clone()),
            BundleKind::Property,
        );

        let aggregate = if self.config.aggregate {
            if self.config.aggregate_name.is_empty() {
                return Err(GeneratorError::InvalidConfig(
                    "aggregate name must be the fully qualified name of the message bundle"
                        .to_string(),
                ));
            }
            Some(BundleIdentity::new(
                &self.config.aggregate_name,
                Some(self.config.default_locale.clone()),
                BundleKind::Property,
            ))
        } else {
            None
        };

        for contract in contracts {
            self.process_contract(contract, &permissions, aggregate.as_ref())?;
        }

        self.promote_default_bundles()?;

        let report = self.report();
        if self.config.verbose && report.bundles > 0 {
            info!("the following resource bundles were generated");
            for (identity, count) in &report.counters {
                info!("-> {}: {} messages", identity, count);
            }
        } else {
            info!("{}", report.summary());
        }

        Ok(report)
    }

    fn process_contract(
        &mut self,
        contract: &MessageContract,
        permissions: &BundleIdentity,
        aggregate: Option<&BundleIdentity>,
    ) -> Result<(), GeneratorError> {
        match contract.kind() {
            BundleKind::None => {
                debug!(
                    "contract {} declares no bundle and was skipped",
                    contract.type_identity()
                );
                return Ok(());
            }
            BundleKind::Property => {}
            kind @ (BundleKind::Xml | BundleKind::Xliff) => {
                return Err(GeneratorError::UnsupportedBundleType {
                    base_name: contract.base_name().to_string(),
                    kind,
                });
            }
        }

        let locale = contract
            .bundle()
            .locale()
            .unwrap_or(&self.config.default_locale)
            .clone();
        let identity = BundleIdentity::new(contract.base_name(), Some(locale), BundleKind::Property);

        debug!(
            "contract {} maps to resource bundle {}",
            contract.type_identity(),
            identity
        );

        // Static defines land ahead of the operation lines.
        for define in contract.bundle().defines() {
            let (key, value) = define.split_once('=').ok_or_else(|| {
                GeneratorError::InvalidConfig(format!(
                    "static define `{}` on contract `{}` is missing `=`",
                    define,
                    contract.type_identity()
                ))
            })?;

            self.write_message(&identity, key, value)?;
            if let Some(aggregate) = aggregate {
                self.write_message(aggregate, key, value)?;
            }
        }

        for entry in contract.entries() {
            if entry.shape() == ReturnShape::Opaque {
                warn!(
                    "operation {}.{} does not produce text and was ignored",
                    contract.type_identity(),
                    entry.name()
                );
                continue;
            }

            self.write_message(&identity, entry.effective_key(), entry.text_literal())?;
            if let Some(aggregate) = aggregate {
                self.write_message(aggregate, entry.effective_key(), entry.text_literal())?;
            }
        }

        for permission in contract.permissions() {
            self.write_message(permissions, &permission.key, &permission.description)?;
            if let Some(aggregate) = aggregate {
                self.write_message(aggregate, &permission.key, &permission.description)?;
            }
        }

        Ok(())
    }

    /// Append one `key=text` line to the identity's bundle file. Blank
    /// text is a translation placeholder and is skipped with a warning.
    fn write_message(
        &mut self,
        identity: &BundleIdentity,
        key: &str,
        text: &str,
    ) -> Result<(), GeneratorError> {
        if text.trim().is_empty() {
            warn!(
                "text for message key `{}` in bundle `{}` is empty and was ignored",
                key,
                identity
            );
            return Ok(());
        }

        self.check_newlines(identity, key, text)?;
        self.check_single_quotes(identity, key, text)?;
        self.check_duplicate(identity, key)?;

        // The first write to an identity this run decides whether the file
        // is truncated or kept.
        let open_for_append = self.counters.contains_key(identity) || self.config.append;
        *self.counters.entry(identity.clone()).or_insert(0) += 1;

        let path = self.bundle_path(identity);
        debug!("writing `{}={}` to {}", key, text, path.display());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| GeneratorError::Io {
                path: parent.to_path_buf(),
                source: err,
            })?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if open_for_append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        let mut file = options.open(&path).map_err(|err| GeneratorError::Io {
            path: path.clone(),
            source: err,
        })?;
        writeln!(file, "{}={}", key, text).map_err(|err| GeneratorError::Io {
            path,
            source: err,
        })?;

        Ok(())
    }

    fn bundle_path(&self, identity: &BundleIdentity) -> PathBuf {
        self.config
            .output_dir
            .join(relative_path(identity.canonical(), ".properties"))
    }

    // ==================== Verification passes ====================

    fn enforce(mode: VerifyMode, violation: GeneratorError) -> Result<(), GeneratorError> {
        match mode {
            VerifyMode::Off => Ok(()),
            VerifyMode::Lenient => {
                error!("{}", violation);
                Ok(())
            }
            VerifyMode::Pedantic => Err(violation),
        }
    }

    /// A literal newline in message text almost always wants a trailing
    /// continuation backslash, so flag every one that lacks it.
    fn check_newlines(
        &self,
        identity: &BundleIdentity,
        key: &str,
        text: &str,
    ) -> Result<(), GeneratorError> {
        if self.config.unescaped_newlines == VerifyMode::Off {
            return Ok(());
        }

        let bytes = text.as_bytes();
        for (index, byte) in bytes.iter().enumerate() {
            if *byte != b'\n' {
                continue;
            }
            let line_end = if index > 0 && bytes[index - 1] == b'\r' {
                index - 1
            } else {
                index
            };
            if line_end == 0 || bytes[line_end - 1] != b'\\' {
                Self::enforce(
                    self.config.unescaped_newlines,
                    GeneratorError::UnescapedNewline {
                        identity: identity.to_string(),
                        key: key.to_string(),
                    },
                )?;
            }
        }

        Ok(())
    }

    /// A `{N}` placeholder inside a single-quoted span is emitted verbatim
    /// at format time, which is almost never what the author meant.
    fn check_single_quotes(
        &self,
        identity: &BundleIdentity,
        key: &str,
        text: &str,
    ) -> Result<(), GeneratorError> {
        if self.config.quoted_placeholders == VerifyMode::Off {
            return Ok(());
        }

        if quoted_placeholder(text) {
            Self::enforce(
                self.config.quoted_placeholders,
                GeneratorError::QuotedPlaceholder {
                    identity: identity.to_string(),
                    key: key.to_string(),
                },
            )?;
        }

        Ok(())
    }

    /// Message keys may not be written twice to one bundle in a single
    /// run. Overloading is not permitted.
    fn check_duplicate(
        &mut self,
        identity: &BundleIdentity,
        key: &str,
    ) -> Result<(), GeneratorError> {
        if self.config.duplicate_keys == VerifyMode::Off {
            return Ok(());
        }

        let keys = self.written_keys.entry(identity.clone()).or_default();
        let duplicate = keys.iter().any(|written| written == key);
        keys.push(key.to_string());

        if duplicate {
            Self::enforce(
                self.config.duplicate_keys,
                GeneratorError::DuplicateKey {
                    identity: identity.to_string(),
                    key: key.to_string(),
                },
            )?;
        }

        Ok(())
    }

    // ==================== Promotion ====================

    /// Copy every bundle generated in the default locale to its
    /// locale-less sibling file so bare base-name lookups resolve to the
    /// default language. Promoted bundles join the report counters.
    fn promote_default_bundles(&mut self) -> Result<(), GeneratorError> {
        let mut promoted = Vec::new();
        for (identity, count) in &self.counters {
            if identity.locale() == Some(&self.config.default_locale) {
                let target = BundleIdentity::new(identity.base_name(), None, identity.kind());
                promoted.push((identity.clone(), target, *count));
            }
        }

        for (source, target, count) in promoted {
            let from = self.bundle_path(&source);
            let to = self.bundle_path(&target);

            debug!(
                "promoting default locale bundle {} to {}",
                from.display(),
                to.display()
            );

            fs::copy(&from, &to).map_err(|err| GeneratorError::Io {
                path: to.clone(),
                source: err,
            })?;
            self.counters.insert(target, count);
        }

        Ok(())
    }

    fn report(&self) -> GeneratorReport {
        let counters: BTreeMap<String, usize> = self
            .counters
            .iter()
            .map(|(identity, count)| (identity.to_string(), *count))
            .collect();

        GeneratorReport {
            bundles: counters.len(),
            messages: counters.values().sum(),
            counters,
        }
    }
}

/// True when a `{N}` placeholder sits inside a single-quoted span. A
/// doubled quote is a literal apostrophe and does not open a span; an
/// unterminated span runs to the end of the text.
fn quoted_placeholder(text: &str) -> bool {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let placeholder = PLACEHOLDER.get_or_init(|| Regex::new(r"(?s)\{[0-9]").unwrap());

    let mut first = text.find('\'');
    while let Some(start) = first {
        match text[start + 1..].find('\'') {
            Some(0) => {
                first = text[start + 2..].find('\'').map(|i| i + start + 2);
            }
            Some(offset) => {
                let end = start + 1 + offset;
                if placeholder.is_match(&text[start..end]) {
                    return true;
                }
                first = text[end + 1..].find('\'').map(|i| i + end + 1);
            }
            None => {
                return placeholder.is_match(&text[start..]);
            }
        }
    }

    false
}
