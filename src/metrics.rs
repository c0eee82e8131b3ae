//! Metrics instrumentation for subdomain-dns.
//!
//! All metrics are prefixed with `subdomain_dns.`

use metrics::{counter, gauge, histogram};
use std::time::Instant;

/// Record a DNS query.
pub fn record_query(record_type: &str, result: QueryResult, duration: std::time::Duration) {
    let result_str = match result {
        QueryResult::Success => "success",
        QueryResult::NoData => "nodata",
        QueryResult::NxDomain => "nxdomain",
    };

    counter!("subdomain_dns.query.count", "type" => record_type.to_string(), "result" => result_str)
        .increment(1);
    histogram!("subdomain_dns.query.duration.seconds", "type" => record_type.to_string())
        .record(duration.as_secs_f64());
}

/// Query result type for metrics.
#[derive(Debug, Clone, Copy)]
pub enum QueryResult {
    /// Query returned records.
    Success,
    /// Name exists, no records of the requested type.
    NoData,
    /// Domain not found.
    NxDomain,
}

/// Record a subdomain registration.
pub fn record_register() {
    counter!("subdomain_dns.registry.register.count").increment(1);
}

/// Record a reset to the default name list.
pub fn record_reset() {
    counter!("subdomain_dns.registry.reset.count").increment(1);
}

/// Record name set sizes (call periodically or on change).
pub fn record_name_counts(live: usize, defaults: usize) {
    gauge!("subdomain_dns.state.names.count").set(live as f64);
    gauge!("subdomain_dns.state.names.registered").set(live.saturating_sub(defaults) as f64);
}

/// Record the number of cached record sets.
pub fn record_cache_entries(entries: usize) {
    gauge!("subdomain_dns.cache.entries.count").set(entries as f64);
}

/// Helper for timing operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}
