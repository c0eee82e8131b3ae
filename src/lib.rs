//! Subdomain DNS - an authoritative DNS responder for one zone whose names are
//! registered at runtime.
//!
//! Every user who signs up on the platform gets `<username>.<zone>`, which must
//! resolve immediately. Benchmark re-initialization drops all registered names
//! and returns the zone to its static default list.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        subdomain-dns                          │
//! │                                                               │
//! │  account layer ──register/reset──▶ ┌────────────────────┐     │
//! │  (SubdomainRegistry)               │ Zone               │     │
//! │                                    │  SubdomainSet      │     │
//! │                                    │  RecordCache       │     │
//! │                                    └─────────┬──────────┘     │
//! │                                              │ resolve        │
//! │                                    ┌─────────▼──────────┐     │
//! │                                    │ ZoneAuthority      │◀── UDP/TCP
//! │                                    │ (Hickory Catalog)  │    :53 │
//! │                                    └────────────────────┘     │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use subdomain_dns::{DnsConfig, DnsServer, Shutdown, SubdomainRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DnsConfig::new("u.isucon.dev.", "ns1.u.isucon.dev.", "10.0.0.1".parse().unwrap());
//!
//!     let (shutdown, worker) = Shutdown::new_signals();
//!     tokio::spawn(worker);
//!
//!     let server = DnsServer::new(config).unwrap();
//!     let registry = server.zone().clone();
//!     registry.register_label("alice");
//!
//!     server.run(shutdown).await.unwrap();
//! }
//! ```

#![warn(missing_docs)]

pub mod authority;
pub mod cache;
pub mod config;
pub mod defaults;
pub mod error;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod state;
pub mod telemetry;
pub mod zone;

// Re-export main types
pub use config::{Config, DnsConfig, SoaConfig, TelemetryConfig};
pub use error::DnsError;
pub use server::DnsServer;
pub use shutdown::{Shutdown, ShutdownTrigger};
pub use state::SubdomainSet;
pub use zone::{Answer, SubdomainRegistry, Zone};
