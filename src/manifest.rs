//! Contract manifest loading.
//!
//! The scanner that walks compiled sources and extracts message contracts
//! lives outside this crate; its output is a JSON manifest that this module
//! deserializes and validates into [`MessageContract`] values. A manifest
//! looks like:
//!
//! ```json
//! {
//!   "contracts": [
//!     {
//!       "type": "app.Messages",
//!       "bundle": { "locale": "en", "kind": "property" },
//!       "messages": [
//!         { "name": "greeting", "text": "Hello, {0}!" },
//!         { "name": "farewell", "key": "exit.message", "text": "Goodbye" }
//!       ],
//!       "permissions": [
//!         { "key": "app.read", "description": "Read access" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Every field except `type` and the message `name` is optional.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::bundle::BundleKind;
use crate::contract::{ContractBuilder, MessageContract, MessageEntry, ReturnShape};
use crate::error::GeneratorError;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    contracts: Vec<ContractSpec>,
}

#[derive(Debug, Deserialize)]
struct ContractSpec {
    #[serde(rename = "type")]
    type_identity: String,
    #[serde(default)]
    bundle: BundleDecl,
    #[serde(default)]
    messages: Vec<MessageDecl>,
    #[serde(default)]
    permissions: Vec<PermissionDecl>,
}

#[derive(Debug, Default, Deserialize)]
struct BundleDecl {
    #[serde(default)]
    name: String,
    #[serde(default)]
    locale: String,
    #[serde(default)]
    kind: BundleKind,
    #[serde(default)]
    defines: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MessageDecl {
    name: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    returns: ReturnShape,
}

#[derive(Debug, Deserialize)]
struct PermissionDecl {
    key: String,
    #[serde(default)]
    description: String,
}

impl ContractSpec {
    fn into_contract(self) -> Result<MessageContract, String> {
        let mut builder = ContractBuilder::new(&self.type_identity)
            .bundle_name(&self.bundle.name)
            .locale(&self.bundle.locale)
            .kind(self.bundle.kind);

        for define in &self.bundle.defines {
            builder = builder.define(define);
        }
        for message in self.messages {
            let entry = match message.returns {
                ReturnShape::Text => MessageEntry::text(&message.name, &message.text),
                ReturnShape::Opaque => MessageEntry::opaque(&message.name, &message.text),
            };
            builder = builder.entry(entry.with_key(&message.key));
        }
        for permission in self.permissions {
            builder = builder.permission(&permission.key, &permission.description);
        }

        builder.build().map_err(|err| err.to_string())
    }
}

/// Read and validate a manifest file.
pub fn load(path: &Path) -> Result<Vec<MessageContract>, GeneratorError> {
    let text = fs::read_to_string(path).map_err(|err| GeneratorError::Manifest {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    let manifest: Manifest = serde_json::from_str(&text).map_err(|err| GeneratorError::Manifest {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    let mut contracts = Vec::with_capacity(manifest.contracts.len());
    for spec in manifest.contracts {
        let contract = spec
            .into_contract()
            .map_err(|reason| GeneratorError::Manifest {
                path: path.to_path_buf(),
                reason,
            })?;
        contracts.push(contract);
    }

    debug!("loaded {} contract(s) from {}", contracts.len(), path.display());
    Ok(contracts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, json: &str) -> std::path::PathBuf {
        let path = dir.path().join("contracts.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_load_full_manifest() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"{
                "contracts": [
                    {
                        "type": "app.Messages",
                        "bundle": {
                            "locale": "en_US",
                            "defines": ["product.name=Widget"]
                        },
                        "messages": [
                            { "name": "greeting", "text": "Hello, {0}!" },
                            { "name": "farewell", "key": "exit.message", "text": "Goodbye" }
                        ],
                        "permissions": [
                            { "key": "app.read", "description": "Read access" }
                        ]
                    }
                ]
            }"#,
        );

        let contracts = load(&path).unwrap();
        assert_eq!(contracts.len(), 1);

        let contract = &contracts[0];
        assert_eq!(contract.type_identity(), "app.Messages");
        assert_eq!(contract.bundle().locale().unwrap().to_string(), "en_US");
        assert_eq!(contract.bundle().defines(), ["product.name=Widget"]);
        assert_eq!(contract.entries().len(), 2);
        assert_eq!(
            contract.entry("farewell").unwrap().effective_key(),
            "exit.message"
        );
        assert_eq!(contract.permissions().len(), 1);
    }

    #[test]
    fn test_defaults_fill_in() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"{
                "contracts": [
                    {
                        "type": "app.Messages",
                        "messages": [{ "name": "greeting", "text": "Hi" }]
                    }
                ]
            }"#,
        );

        let contracts = load(&path).unwrap();
        let contract = &contracts[0];
        assert_eq!(contract.kind(), BundleKind::Property);
        assert!(contract.bundle().locale().is_none());
        assert_eq!(contract.base_name(), "app.Messages");
        assert_eq!(
            contract.entry("greeting").unwrap().shape(),
            ReturnShape::Text
        );
    }

    #[test]
    fn test_kind_and_shape_strings() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"{
                "contracts": [
                    {
                        "type": "app.Counters",
                        "bundle": { "kind": "none" },
                        "messages": [
                            { "name": "total", "text": "42", "returns": "opaque" }
                        ]
                    }
                ]
            }"#,
        );

        let contracts = load(&path).unwrap();
        let contract = &contracts[0];
        assert_eq!(contract.kind(), BundleKind::None);
        assert_eq!(
            contract.entry("total").unwrap().shape(),
            ReturnShape::Opaque
        );
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(GeneratorError::Manifest { .. })));
    }

    #[test]
    fn test_malformed_json_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "{ not json");
        assert!(matches!(load(&path), Err(GeneratorError::Manifest { .. })));
    }

    #[test]
    fn test_invalid_contract_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"{ "contracts": [ { "type": "   " } ] }"#,
        );
        assert!(matches!(load(&path), Err(GeneratorError::Manifest { .. })));
    }

    #[test]
    fn test_empty_manifest_yields_no_contracts() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "{}");
        assert!(load(&path).unwrap().is_empty());
    }
}
