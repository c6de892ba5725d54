//! Locale-aware message resolution and properties bundle generation.
//!
//! The runtime half resolves message handlers from declarative contracts:
//! locale candidate expansion with most-specific-first fallback, cached
//! at-most-once handler construction, MessageFormat-style pattern
//! rendering that degrades gracefully instead of failing, and optional
//! in-memory bundle fabrication when no backing resource exists. The
//! build-time half scans the same contracts and writes `.properties`
//! resource bundles, verifying message text and promoting default-locale
//! bundles to their locale-less filenames.

pub mod bundle;
pub mod config;
pub mod context;
pub mod contract;
pub mod error;
pub mod format;
pub mod generator;
pub mod handler;
pub mod locale;
pub mod manifest;
pub mod metrics;
pub mod resolver;
pub mod source;

pub use bundle::{BundleIdentity, BundleKind, MessageBundle};
pub use context::LocaleContext;
pub use contract::{ContractBuilder, MessageContract, MessageEntry, PermissionEntry, ReturnShape};
pub use error::{GeneratorError, I18nError};
pub use format::FormatArg;
pub use generator::{BundleGenerator, GeneratorConfig, GeneratorReport, VerifyMode};
pub use handler::{MessageHandler, Messages, MISSING_KEY_MARKER};
pub use locale::Locale;
pub use metrics::{MetricsSnapshot, ResolutionMetrics};
pub use resolver::{MessageResolver, ResolverStats};
pub use source::{BundleSource, DirSource, StaticSource};
