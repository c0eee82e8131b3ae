//! Configuration types for subdomain-dns.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// DNS server configuration.
    pub dns: DnsConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// DNS server and zone configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    /// Address for the DNS server to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Also serve DNS over TCP on `listen_addr`.
    #[serde(default)]
    pub tcp: bool,

    /// Zone apex (e.g., "u.isucon.dev.").
    pub zone: String,

    /// Nameserver hostname published in the apex NS record.
    pub nameserver: String,

    /// Address of the nameserver, served as the glue record.
    pub nameserver_addr: Ipv4Addr,

    /// Address every registered subdomain resolves to.
    /// Falls back to `nameserver_addr` when unset.
    #[serde(default)]
    pub answer_addr: Option<Ipv4Addr>,

    /// TTL for NS, glue and A answers in seconds.
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Replaces the built-in pool of pre-registered user labels.
    /// Reserved names (apex, nameserver, `pipe`, `test001`) are always present.
    #[serde(default)]
    pub default_labels: Option<Vec<String>>,

    /// SOA record configuration.
    #[serde(default)]
    pub soa: SoaConfig,
}

impl DnsConfig {
    /// Build a configuration for `zone` with every optional field defaulted.
    pub fn new(zone: &str, nameserver: &str, nameserver_addr: Ipv4Addr) -> Self {
        Self {
            listen_addr: default_listen_addr(),
            tcp: false,
            zone: zone.to_string(),
            nameserver: nameserver.to_string(),
            nameserver_addr,
            answer_addr: None,
            ttl: default_ttl(),
            default_labels: None,
            soa: SoaConfig::default(),
        }
    }

    /// The address A answers point at.
    pub fn answer_addr(&self) -> Ipv4Addr {
        self.answer_addr.unwrap_or(self.nameserver_addr)
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "debug", "subdomain_dns=debug,warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus metrics exporter address.
    #[serde(default)]
    pub prometheus_addr: Option<SocketAddr>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            prometheus_addr: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 53))
}

/// SOA (Start of Authority) record configuration.
///
/// The primary nameserver (MNAME) is always the zone's `nameserver`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoaConfig {
    /// Responsible mailbox in DNS format. Defaults to `hostmaster.<zone>`.
    #[serde(default)]
    pub rname: Option<String>,

    /// Zone serial.
    #[serde(default)]
    pub serial: u32,

    /// Refresh interval in seconds.
    #[serde(default = "default_refresh")]
    pub refresh: u32,

    /// Retry interval in seconds.
    #[serde(default = "default_retry")]
    pub retry: u32,

    /// Expire time in seconds.
    #[serde(default = "default_expire")]
    pub expire: u32,

    /// Minimum TTL (negative caching) in seconds.
    #[serde(default = "default_minimum")]
    pub minimum: u32,

    /// TTL of the SOA record itself.
    #[serde(default = "default_soa_ttl")]
    pub ttl: u32,
}

fn default_ttl() -> u32 {
    120
}

fn default_refresh() -> u32 {
    10800
}

fn default_retry() -> u32 {
    3600
}

fn default_expire() -> u32 {
    604800
}

fn default_minimum() -> u32 {
    3600
}

fn default_soa_ttl() -> u32 {
    60
}

impl Default for SoaConfig {
    fn default() -> Self {
        Self {
            rname: None,
            serial: 0,
            refresh: default_refresh(),
            retry: default_retry(),
            expire: default_expire(),
            minimum: default_minimum(),
            ttl: default_soa_ttl(),
        }
    }
}
