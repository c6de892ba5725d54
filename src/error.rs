//! Error types for the resolution and generation paths.
//!
//! Runtime resolution and build-time generation fail in different ways and
//! are consumed by different callers, so each side gets its own enum rather
//! than one catch-all error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bundle::BundleKind;

/// Errors surfaced while resolving messages at runtime.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum I18nError {
    /// A required input was empty or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No backing resource exists for any candidate name and the contract
    /// does not permit fabricating a bundle in memory.
    #[error("no resource bundle found for `{name}` (locale `{locale}`)")]
    MissingBundle { name: String, locale: String },

    /// A contract manifest entry could not be used to build a handler.
    #[error("contract `{contract}` is invalid: {reason}")]
    InvalidContract { contract: String, reason: String },

    /// A bundle source failed while reading a candidate resource.
    #[error("failed to read resource `{name}`")]
    Source {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A properties payload could not be parsed.
    #[error("malformed properties resource `{name}`: {reason}")]
    MalformedResource { name: String, reason: String },
}

/// Errors raised by the bundle generator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    /// The same key was written twice to one bundle during a single run.
    /// Overloading message names is not permitted.
    #[error("duplicate message key `{key}` in bundle `{identity}`")]
    DuplicateKey { identity: String, key: String },

    /// A numbered placeholder sits inside a single-quoted span, so it would
    /// be emitted verbatim instead of substituted at format time.
    #[error("quoted placeholder in message `{key}` of bundle `{identity}`")]
    QuotedPlaceholder { identity: String, key: String },

    /// A literal newline not preceded by a line-continuation backslash.
    #[error("unescaped newline in message `{key}` of bundle `{identity}`")]
    UnescapedNewline { identity: String, key: String },

    /// Only property-backed contracts can be written to disk.
    #[error("unsupported bundle type `{kind}` for `{base_name}`")]
    UnsupportedBundleType { base_name: String, kind: BundleKind },

    /// The generator configuration is unusable.
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),

    /// The contract manifest could not be read or parsed.
    #[error("failed to load manifest `{}`: {reason}", .path.display())]
    Manifest { path: PathBuf, reason: String },

    /// A file system failure while writing or copying a bundle file.
    #[error("failed to write bundle file `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GeneratorError {
    /// Violations that lenient verification downgrades to error logs.
    /// Everything else aborts the run regardless of mode.
    pub fn is_verification(&self) -> bool {
        matches!(
            self,
            GeneratorError::DuplicateKey { .. }
                | GeneratorError::QuotedPlaceholder { .. }
                | GeneratorError::UnescapedNewline { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_bundle_message_names_bundle_and_locale() {
        let err = I18nError::MissingBundle {
            name: "app.Messages".to_string(),
            locale: "en_US".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("app.Messages"));
        assert!(rendered.contains("en_US"));
    }

    #[test]
    fn test_verification_classification() {
        let dup = GeneratorError::DuplicateKey {
            identity: "Messages_en".to_string(),
            key: "greeting".to_string(),
        };
        assert!(dup.is_verification());

        let config = GeneratorError::InvalidConfig("empty aggregate name".to_string());
        assert!(!config.is_verification());
    }
}
