//! Error types for subdomain-dns.

use thiserror::Error;

/// Errors that can occur while building or running the DNS server.
#[derive(Debug, Error)]
pub enum DnsError {
    /// IO error (socket bind, signal handler, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A configured name is not a valid domain name
    #[error("Invalid domain name {name:?}: {reason}")]
    InvalidName {
        /// The offending name as written in the configuration.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}
