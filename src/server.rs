//! DNS server setup and lifecycle management.

use hickory_server::authority::{AuthorityObject, Catalog};
use hickory_server::ServerFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tracing::{debug, error, info};

use crate::authority::ZoneAuthority;
use crate::config::DnsConfig;
use crate::error::DnsError;
use crate::shutdown::Shutdown;
use crate::zone::Zone;

/// Interval for emitting state metrics.
const METRICS_INTERVAL: Duration = Duration::from_secs(10);

/// Idle timeout for TCP connections.
const TCP_TIMEOUT: Duration = Duration::from_secs(30);

/// Periodically emit state metrics.
async fn metrics_loop(zone: Arc<Zone>, mut shutdown: Shutdown) {
    let mut interval = tokio::time::interval(METRICS_INTERVAL);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                zone.emit_metrics();
                debug!(names = zone.len(), "emitted state metrics");
            }
            _ = shutdown.wait() => {
                debug!("metrics loop shutting down");
                return;
            }
        }
    }
}

/// Build a catalog serving `zone`.
pub fn build_catalog(zone: Arc<Zone>) -> Catalog {
    let authority = ZoneAuthority::new(zone);
    let origin = authority.zone().origin().clone();
    let authority: Arc<dyn AuthorityObject> = Arc::new(authority);

    let mut catalog = Catalog::new();
    catalog.upsert(origin, vec![authority]);
    catalog
}

/// Authoritative DNS server for a single zone.
pub struct DnsServer {
    config: DnsConfig,
    zone: Arc<Zone>,
}

impl DnsServer {
    /// Create a new DNS server, loading the zone from configuration.
    pub fn new(config: DnsConfig) -> Result<Self, DnsError> {
        let zone = Arc::new(Zone::new(&config)?);
        Ok(Self { config, zone })
    }

    /// Create a server around an existing zone.
    pub fn with_zone(config: DnsConfig, zone: Arc<Zone>) -> Self {
        Self { config, zone }
    }

    /// The shared zone handle. Hand this to whatever registers users.
    pub fn zone(&self) -> &Arc<Zone> {
        &self.zone
    }

    /// Bind the configured listeners and serve until shutdown.
    ///
    /// A bind failure is returned immediately.
    pub async fn run(self, shutdown: Shutdown) -> Result<(), DnsError> {
        let listen_addr = self.config.listen_addr;

        let udp_socket = UdpSocket::bind(listen_addr).await?;
        info!(addr = %listen_addr, "DNS UDP listening");

        let tcp_listener = if self.config.tcp {
            let listener = TcpListener::bind(listen_addr).await?;
            info!(addr = %listen_addr, "DNS TCP listening");
            Some(listener)
        } else {
            None
        };

        self.serve(udp_socket, tcp_listener, shutdown).await
    }

    /// Serve on already-bound listeners until shutdown.
    pub async fn serve(
        self,
        udp_socket: UdpSocket,
        tcp_listener: Option<TcpListener>,
        shutdown: Shutdown,
    ) -> Result<(), DnsError> {
        let local_addr: SocketAddr = udp_socket.local_addr()?;

        let mut server = ServerFuture::new(build_catalog(self.zone.clone()));
        server.register_socket(udp_socket);
        if let Some(listener) = tcp_listener {
            server.register_listener(listener, TCP_TIMEOUT);
        }

        info!(
            addr = %local_addr,
            zone = %self.zone.origin(),
            names = self.zone.len(),
            "DNS server ready to serve queries"
        );

        let metrics_handle = tokio::spawn(metrics_loop(self.zone.clone(), shutdown.clone()));

        // Emit initial metrics
        self.zone.emit_metrics();

        let mut dns_shutdown = shutdown;
        tokio::select! {
            _ = dns_shutdown.wait() => {
                info!("DNS server shutdown requested");
            }
            result = server.block_until_done() => {
                if let Err(e) = result {
                    error!("DNS server error: {}", e);
                }
            }
        }

        // The metrics loop stops on the same signal; abort it when the
        // server ended on its own.
        metrics_handle.abort();
        let _ = metrics_handle.await;

        info!("DNS server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn test_config() -> DnsConfig {
        let mut config =
            DnsConfig::new("example.test.", "ns1.example.test.", Ipv4Addr::new(10, 0, 0, 1));
        config.listen_addr = "127.0.0.1:0".parse().unwrap();
        config
    }

    #[test]
    fn test_server_creation() {
        let server = DnsServer::new(test_config()).unwrap();
        assert!(server.zone().contains("ns1.example.test."));
    }

    #[test]
    fn test_server_creation_rejects_bad_zone() {
        let mut config = test_config();
        config.nameserver = "ns1.elsewhere.test.".to_string();
        assert!(DnsServer::new(config).is_err());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let server = DnsServer::new(test_config()).unwrap();
        let (trigger, shutdown) = Shutdown::new();

        let handle = tokio::spawn(server.run(shutdown));
        trigger.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_fails_when_port_taken() {
        let taken = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut config = test_config();
        config.listen_addr = taken.local_addr().unwrap();

        let server = DnsServer::new(config).unwrap();
        let (_trigger, shutdown) = Shutdown::new();
        assert!(matches!(server.run(shutdown).await, Err(DnsError::Io(_))));
    }
}
