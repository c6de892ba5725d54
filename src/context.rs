//! Current-locale storage.
//!
//! A [`LocaleContext`] tracks which locale message lookups should use when
//! the caller does not pass one explicitly. It runs in one of two modes:
//! a single shared slot that every thread reads, or one slot per thread.
//! The mode is flipped by whichever setter ran last, so callers that set a
//! locale for the whole process and callers that scope it to a worker
//! thread can coexist against the same context.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::locale::Locale;

static NEXT_CONTEXT_ID: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    // Slots for every live context on this thread, keyed by context id so
    // independently created contexts never observe each other's locale.
    static THREAD_SLOTS: RefCell<HashMap<usize, Locale>> = RefCell::new(HashMap::new());
}

/// Mutable locale state shared by resolvers and handlers.
pub struct LocaleContext {
    id: usize,
    thread_scoped: AtomicBool,
    shared: RwLock<Locale>,
    default: Locale,
}

impl LocaleContext {
    /// Create a context that starts in per-thread mode and answers with
    /// `default` until a locale is set.
    pub fn new(default: Locale) -> LocaleContext {
        LocaleContext {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            thread_scoped: AtomicBool::new(true),
            shared: RwLock::new(default.clone()),
            default,
        }
    }

    /// The fallback locale used when no thread slot has been populated.
    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    /// True when lookups read the calling thread's slot rather than the
    /// shared one.
    pub fn is_thread_scoped(&self) -> bool {
        self.thread_scoped.load(Ordering::SeqCst)
    }

    /// Switch mode without writing a locale. Takes effect for all threads
    /// immediately; both slots keep their contents across switches.
    pub fn set_thread_scoped(&self, thread_scoped: bool) {
        self.thread_scoped.store(thread_scoped, Ordering::SeqCst);
    }

    /// Store `locale` in the shared slot and switch every thread to it.
    pub fn set_global(&self, locale: Locale) {
        *self.shared.write().unwrap() = locale;
        self.thread_scoped.store(false, Ordering::SeqCst);
    }

    /// Store `locale` for the calling thread and switch lookups to
    /// per-thread mode. Other threads keep their own slots and fall back to
    /// the default locale until they set one.
    pub fn set_thread(&self, locale: Locale) {
        THREAD_SLOTS.with(|slots| {
            slots.borrow_mut().insert(self.id, locale);
        });
        self.thread_scoped.store(true, Ordering::SeqCst);
    }

    /// The locale lookups should use right now, per the active mode.
    pub fn current(&self) -> Locale {
        if self.is_thread_scoped() {
            THREAD_SLOTS
                .with(|slots| slots.borrow().get(&self.id).cloned())
                .unwrap_or_else(|| self.default.clone())
        } else {
            self.shared.read().unwrap().clone()
        }
    }
}

impl Drop for LocaleContext {
    fn drop(&mut self) {
        // Only the calling thread's slot can be cleared here; slots on other
        // threads are reclaimed when those threads exit.
        let _ = THREAD_SLOTS.try_with(|slots| {
            slots.borrow_mut().remove(&self.id);
        });
    }
}
