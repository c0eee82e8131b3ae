//! The live set of resolvable subdomains.
//!
//! Starts from a static default list, grows by one name per registration and
//! can be swapped back to the defaults in one step. Readers take the lock only
//! for the membership check.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::defaults::normalize;
use crate::metrics;

/// Thread-safe set of fully-qualified names (lowercase, trailing dot).
#[derive(Debug, Clone)]
pub struct SubdomainSet {
    inner: Arc<SubdomainSetInner>,
}

#[derive(Debug)]
struct SubdomainSetInner {
    /// Names the set is reset to.
    defaults: HashSet<String>,

    /// Names currently resolvable.
    live: RwLock<HashSet<String>>,
}

impl SubdomainSet {
    /// Create a set seeded with `defaults`.
    pub fn new<I, S>(defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let defaults: HashSet<String> = defaults
            .into_iter()
            .map(|name| normalize(name.as_ref()))
            .collect();
        let live = RwLock::new(defaults.clone());

        Self {
            inner: Arc::new(SubdomainSetInner { defaults, live }),
        }
    }

    /// Check whether `name` is currently resolvable.
    pub fn contains(&self, name: &str) -> bool {
        let key = normalize(name);
        self.inner.live.read().contains(&key)
    }

    /// Add `name` to the live set. Adding an existing name is a no-op.
    pub fn insert(&self, name: &str) {
        let key = normalize(name);
        let inserted = self.inner.live.write().insert(key);
        debug!(name, inserted, "registered subdomain");
    }

    /// Replace the live set with a fresh copy of the defaults.
    pub fn reset(&self) {
        self.reset_with(|| {});
    }

    /// Reset to the defaults, running `on_reset` while the write lock is
    /// still held so readers observe both changes together.
    pub fn reset_with<F: FnOnce()>(&self, on_reset: F) {
        let fresh = self.inner.defaults.clone();
        let previous = {
            let mut live = self.inner.live.write();
            let previous = std::mem::replace(&mut *live, fresh);
            on_reset();
            previous
        };
        debug!(
            discarded = previous.len().saturating_sub(self.inner.defaults.len()),
            "reset subdomains to defaults"
        );
    }

    /// Number of names currently resolvable.
    pub fn len(&self) -> usize {
        self.inner.live.read().len()
    }

    /// True when no names are resolvable.
    pub fn is_empty(&self) -> bool {
        self.inner.live.read().is_empty()
    }

    /// Number of names in the default list.
    pub fn defaults_len(&self) -> usize {
        self.inner.defaults.len()
    }

    /// Emit gauges describing the set.
    pub fn emit_metrics(&self) {
        metrics::record_name_counts(self.len(), self.defaults_len());
    }
}
