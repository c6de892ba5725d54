//! Message contract descriptors.
//!
//! A contract is the declarative side of the system: a named type carrying
//! a list of message operations, each with literal text and an optional key
//! override, plus bundle-level settings (name, locale, kind, static
//! defines). The runtime resolves handlers from contracts; the generator
//! turns the same contracts into `.properties` files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bundle::{BundleKind, MessageBundle};
use crate::error::I18nError;
use crate::locale::Locale;

/// What a message operation returns.
///
/// Only `Text` operations produce formatted strings; `Opaque` operations
/// are carried through scanning but skipped by the generator with a
/// warning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnShape {
    #[default]
    Text,
    Opaque,
}

/// One declared message operation.
#[derive(Debug, Clone)]
pub struct MessageEntry {
    name: String,
    key: Option<String>,
    text: String,
    shape: ReturnShape,
}

impl MessageEntry {
    /// A text-returning operation, keyed by its own name unless overridden.
    pub fn text(name: &str, text: &str) -> MessageEntry {
        MessageEntry {
            name: name.to_string(),
            key: None,
            text: text.to_string(),
            shape: ReturnShape::Text,
        }
    }

    /// An operation whose return value is not formattable text.
    pub fn opaque(name: &str, text: &str) -> MessageEntry {
        MessageEntry {
            shape: ReturnShape::Opaque,
            ..MessageEntry::text(name, text)
        }
    }

    /// Override the bundle key this operation reads.
    pub fn with_key(mut self, key: &str) -> MessageEntry {
        if !key.is_empty() {
            self.key = Some(key.to_string());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text_literal(&self) -> &str {
        &self.text
    }

    pub fn shape(&self) -> ReturnShape {
        self.shape
    }

    /// The bundle key this operation resolves through: the explicit
    /// override when present, the operation name otherwise.
    pub fn effective_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
}

/// A permission constant exported for localization: the permission string
/// itself is the bundle key, the human-readable description is the text.
#[derive(Debug, Clone)]
pub struct PermissionEntry {
    pub key: String,
    pub description: String,
}

/// Bundle-level settings declared on a contract.
#[derive(Debug, Clone, Default)]
pub struct BundleSpec {
    name: Option<String>,
    locale: Option<Locale>,
    kind: BundleKind,
    defines: Vec<String>,
}

impl BundleSpec {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    /// Raw `key=value` statics, written before any operation lines.
    pub fn defines(&self) -> &[String] {
        &self.defines
    }
}

/// A validated message contract.
#[derive(Debug, Clone)]
pub struct MessageContract {
    type_identity: String,
    bundle: BundleSpec,
    entries: Vec<MessageEntry>,
    permissions: Vec<PermissionEntry>,
}

impl MessageContract {
    pub fn type_identity(&self) -> &str {
        &self.type_identity
    }

    pub fn bundle(&self) -> &BundleSpec {
        &self.bundle
    }

    /// The bundle base name: the declared override when present, the
    /// contract's own type identity otherwise.
    pub fn base_name(&self) -> &str {
        self.bundle.name().unwrap_or(&self.type_identity)
    }

    pub fn kind(&self) -> BundleKind {
        self.bundle.kind()
    }

    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn permissions(&self) -> &[PermissionEntry] {
        &self.permissions
    }

    /// Look up an operation by name.
    pub fn entry(&self, name: &str) -> Option<&MessageEntry> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    /// Build an in-memory bundle from the declared literals, for contracts
    /// with no file backing. Entries with empty text are translation
    /// placeholders and are left out. The bundle is tagged with the
    /// contract's locale override, or `fallback` when it has none.
    pub fn fabricated_bundle(&self, fallback: &Locale) -> MessageBundle {
        let mut entries = BTreeMap::new();
        for entry in &self.entries {
            if entry.text_literal().is_empty() {
                continue;
            }
            entries.insert(
                entry.effective_key().to_string(),
                entry.text_literal().to_string(),
            );
        }

        let locale = self.bundle.locale().unwrap_or(fallback).clone();
        MessageBundle::fabricated(entries, locale)
    }
}

/// Assembles and validates a [`MessageContract`].
#[derive(Debug, Default)]
pub struct ContractBuilder {
    type_identity: String,
    bundle: BundleSpec,
    entries: Vec<MessageEntry>,
    permissions: Vec<PermissionEntry>,
}

impl ContractBuilder {
    pub fn new(type_identity: &str) -> ContractBuilder {
        ContractBuilder {
            type_identity: type_identity.to_string(),
            ..ContractBuilder::default()
        }
    }

    /// Override the bundle base name. Empty overrides are ignored so a
    /// blank declaration falls back to the type identity.
    pub fn bundle_name(mut self, name: &str) -> ContractBuilder {
        if !name.is_empty() {
            self.bundle.name = Some(name.to_string());
        }
        self
    }

    /// Declare the bundle's locale as an underscore tag. Empty or
    /// whitespace tags are ignored.
    pub fn locale(mut self, tag: &str) -> ContractBuilder {
        if let Ok(locale) = Locale::parse(tag) {
            self.bundle.locale = Some(locale);
        }
        self
    }

    pub fn kind(mut self, kind: BundleKind) -> ContractBuilder {
        self.bundle.kind = kind;
        self
    }

    /// Add a static `key=value` line written ahead of the operations.
    pub fn define(mut self, raw: &str) -> ContractBuilder {
        self.bundle.defines.push(raw.to_string());
        self
    }

    pub fn entry(mut self, entry: MessageEntry) -> ContractBuilder {
        self.entries.push(entry);
        self
    }

    pub fn permission(mut self, key: &str, description: &str) -> ContractBuilder {
        self.permissions.push(PermissionEntry {
            key: key.to_string(),
            description: description.to_string(),
        });
        self
    }

    pub fn build(self) -> Result<MessageContract, I18nError> {
        if self.type_identity.trim().is_empty() {
            return Err(I18nError::InvalidContract {
                contract: self.type_identity,
                reason: "type identity must not be empty".to_string(),
            });
        }
        for entry in &self.entries {
            if entry.name().is_empty() {
                return Err(I18nError::InvalidContract {
                    contract: self.type_identity,
                    reason: "operation name must not be empty".to_string(),
                });
            }
        }

        Ok(MessageContract {
            type_identity: self.type_identity,
            bundle: self.bundle,
            entries: self.entries,
            permissions: self.permissions,
        })
    }
}
