//! Cached message resolution.
//!
//! A [`MessageResolver`] owns everything the runtime path needs: the
//! bundle source, the locale context, the handler cache, the fabrication
//! flag and the counters. Handlers are constructed at most once per
//! `baseName_locale` cache key and live for the resolver's lifetime; the
//! cache is append-only, entries are never replaced or evicted.
//!
//! Construction happens inside one coarse critical section covering
//! lookup, load and insert. Concurrent callers of the same key therefore
//! observe exactly one construction; callers of unrelated keys serialize
//! against it too, which is acceptable for a bounded local lookup that
//! runs once per key per process lifetime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, warn};

use crate::bundle::{BundleKind, MessageBundle};
use crate::context::LocaleContext;
use crate::contract::MessageContract;
use crate::error::I18nError;
use crate::handler::MessageHandler;
use crate::locale::{self, Locale};
use crate::metrics::{MetricsSnapshot, ResolutionMetrics};
use crate::source::BundleSource;

/// Long-lived resolver, constructed once at process start and shared.
pub struct MessageResolver {
    source: Box<dyn BundleSource>,
    context: LocaleContext,
    handlers: Mutex<HashMap<String, Arc<MessageHandler>>>,
    fabricate: AtomicBool,
    metrics: ResolutionMetrics,
}

impl MessageResolver {
    /// Create a resolver over `source`. `default_locale` seeds the locale
    /// context and tags fabricated bundles with no declared locale.
    /// Fabrication starts disabled.
    pub fn new(source: impl BundleSource + 'static, default_locale: Locale) -> MessageResolver {
        MessageResolver {
            source: Box::new(source),
            context: LocaleContext::new(default_locale),
            handlers: Mutex::new(HashMap::new()),
            fabricate: AtomicBool::new(false),
            metrics: ResolutionMetrics::new(),
        }
    }

    // ==================== Locale passthroughs ====================

    /// Set the locale for every thread.
    pub fn set_global_locale(&self, locale: Locale) {
        self.context.set_global(locale);
    }

    /// Set the locale for the calling thread only.
    pub fn set_thread_locale(&self, locale: Locale) {
        self.context.set_thread(locale);
    }

    /// The locale resolution uses when none is passed explicitly.
    pub fn current_locale(&self) -> Locale {
        self.context.current()
    }

    pub fn context(&self) -> &LocaleContext {
        &self.context
    }

    // ==================== Fabrication toggle ====================

    /// Allow contracts without a backing resource to fall back to an
    /// in-memory bundle built from their declared literals. Contracts of
    /// kind `none` always fabricate regardless of this flag.
    pub fn set_fabrication(&self, enabled: bool) {
        self.fabricate.store(enabled, Ordering::SeqCst);
    }

    pub fn fabrication_enabled(&self) -> bool {
        self.fabricate.load(Ordering::SeqCst)
    }

    // ==================== Resolution ====================

    /// Resolve a handler for the context's current locale.
    pub fn resolve(&self, contract: &MessageContract) -> Result<Arc<MessageHandler>, I18nError> {
        let locale = self.context.current();
        self.resolve_with(contract, &locale)
    }

    /// Resolve a handler for an underscore locale tag such as `es_MX`.
    pub fn resolve_tag(
        &self,
        contract: &MessageContract,
        tag: &str,
    ) -> Result<Arc<MessageHandler>, I18nError> {
        let locale = Locale::parse(tag)?;
        self.resolve_with(contract, &locale)
    }

    /// Resolve a handler for an explicit locale. Concurrent calls with the
    /// same contract and locale all receive the same handler.
    pub fn resolve_with(
        &self,
        contract: &MessageContract,
        locale: &Locale,
    ) -> Result<Arc<MessageHandler>, I18nError> {
        let cache_key = format!("{}_{}", contract.base_name(), locale);

        let mut handlers = self.handlers.lock().unwrap();
        if let Some(handler) = handlers.get(&cache_key) {
            self.metrics.record_cache_hit();
            return Ok(Arc::clone(handler));
        }

        self.metrics.record_cache_miss();
        debug!("creating message handler for bundle {}", cache_key);

        let bundle = self.load_bundle(contract, locale)?;
        let handler = Arc::new(MessageHandler::new(bundle, contract));
        handlers.insert(cache_key, Arc::clone(&handler));
        Ok(handler)
    }

    /// Probe candidate names most specific first; first hit wins and the
    /// bundle is tagged with the locale of the candidate that matched.
    fn load_bundle(
        &self,
        contract: &MessageContract,
        locale: &Locale,
    ) -> Result<MessageBundle, I18nError> {
        let candidates = locale::expand(contract.base_name(), locale, "")?;
        let matched_locales = locale::truncations(locale);

        for (name, matched) in candidates.iter().zip(matched_locales) {
            match self.source.load(name) {
                Ok(Some(text)) => return MessageBundle::from_properties(name, &text, matched),
                Ok(None) => continue,
                Err(err) => {
                    return Err(I18nError::Source {
                        name: name.clone(),
                        source: err,
                    })
                }
            }
        }

        self.metrics.record_missing_bundle();

        if contract.kind() == BundleKind::None || self.fabrication_enabled() {
            warn!(
                "no resource bundle found for `{}` (locale {}); fabricating bundle dynamically",
                contract.base_name(),
                locale
            );
            self.metrics.record_fabrication();
            return Ok(contract.fabricated_bundle(self.context.default_locale()));
        }

        Err(I18nError::MissingBundle {
            name: contract.base_name().to_string(),
            locale: locale.to_string(),
        })
    }

    // ==================== Telemetry ====================

    pub fn metrics(&self) -> &ResolutionMetrics {
        &self.metrics
    }

    /// Cache keys of every handler resolved so far, sorted.
    pub fn bundle_identities(&self) -> Vec<String> {
        let handlers = self.handlers.lock().unwrap();
        let mut identities: Vec<String> = handlers.keys().cloned().collect();
        identities.sort();
        identities
    }

    /// Snapshot of the control surface: counters, cache contents, locale
    /// state and the fabrication flag.
    pub fn stats(&self) -> ResolverStats {
        let identities = self.bundle_identities();
        ResolverStats {
            active_bundles: identities.len(),
            bundle_identities: identities,
            current_locale: self.context.current().to_string(),
            fabrication_enabled: self.fabrication_enabled(),
            metrics: self.metrics.snapshot(),
        }
    }
}

/// Serializable view of a resolver's state.
#[derive(Debug, Clone, Serialize)]
pub struct ResolverStats {
    pub active_bundles: usize,
    pub bundle_identities: Vec<String>,
    pub current_locale: String,
    pub fabrication_enabled: bool,
    pub metrics: MetricsSnapshot,
}
