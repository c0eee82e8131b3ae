//! Memoized record sets.
//!
//! Answers are built from a handful of templates: the apex NS record, its
//! glue, the SOA, and one A record per subdomain. Each is built once and shared
//! afterwards.

use dashmap::DashMap;
use hickory_proto::rr::{LowerName, RecordSet};
use std::sync::Arc;

/// Identifies a record set the zone can produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// NS record at the apex.
    ApexNs,
    /// A record for the nameserver, served as additional data.
    ApexGlue,
    /// SOA record at the apex.
    ApexSoa,
    /// A record for a registered subdomain.
    Subdomain(LowerName),
}

/// Concurrent cache of constructed record sets.
///
/// `Zone::reset` clears the cache together with the name set. A lookup that
/// passed its membership check just before a reset may still store its
/// subdomain entry afterwards; that entry is unreachable for answers (the
/// name set is always consulted first) and is dropped by the next reset.
#[derive(Debug, Default)]
pub struct RecordCache {
    entries: DashMap<RecordKey, Arc<RecordSet>>,
}

impl RecordCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached set for `key`, building and storing it on a miss.
    ///
    /// Two callers racing on the same key may both build; the first stored
    /// value wins and both receive an equal set.
    pub fn get_or_build<F>(&self, key: RecordKey, build: F) -> Arc<RecordSet>
    where
        F: FnOnce() -> RecordSet,
    {
        if let Some(hit) = self.entries.get(&key) {
            return Arc::clone(hit.value());
        }

        let built = Arc::new(build());
        Arc::clone(self.entries.entry(key).or_insert(built).value())
    }

    /// Number of cached record sets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached set.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
