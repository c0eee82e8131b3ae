//! subdomain-dns binary entry point.

use clap::Parser;
use std::path::PathBuf;
use subdomain_dns::{telemetry, Config, DnsServer, Shutdown};
use tracing::{error, info};

/// Authoritative DNS server for a zone of runtime-registered subdomains.
#[derive(Parser, Debug)]
#[command(name = "subdomain-dns")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML).
    #[arg(short, long, default_value = "subdomain-dns.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let config: Config = config::Config::builder()
        .add_source(config::File::from(args.config.clone()))
        .add_source(
            config::Environment::with_prefix("SUBDOMAIN_DNS")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    telemetry::init(&config.telemetry).map_err(|e| e as Box<dyn std::error::Error>)?;

    info!(
        config_file = %args.config.display(),
        listen_addr = %config.dns.listen_addr,
        zone = %config.dns.zone,
        nameserver = %config.dns.nameserver,
        "Starting subdomain-dns"
    );

    // Setup graceful shutdown
    let (shutdown, shutdown_worker) = Shutdown::new_signals();
    tokio::spawn(shutdown_worker);

    let server = DnsServer::new(config.dns)?;
    if let Err(e) = server.run(shutdown).await {
        error!("DNS server error: {}", e);
        return Err(e.into());
    }

    info!("subdomain-dns shutdown complete");
    Ok(())
}
