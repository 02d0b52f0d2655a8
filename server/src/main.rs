mod command;
mod config;
mod listener;
mod session;

use anyhow::Result;
use clap::Parser;
use command::{CommandDispatcher, SharedDeviceState};
use config::ServerConfig;
use devctl_shared::{defaults, shutdown, FileRecordStore};
use listener::CommandServer;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Line-protocol server for the device mode, output flag and record log
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to bind (default: every address family)
    #[arg(long, env = "DEVCTL_ADDRESS")]
    address: Option<IpAddr>,

    #[arg(long, env = "DEVCTL_PORT", default_value_t = defaults::SERVER_PORT)]
    port: u16,

    /// Record log served by GET LAST
    #[arg(long, env = "DEVCTL_STORE", default_value = defaults::STORE_PATH)]
    store: PathBuf,

    #[arg(long, env = "DEVCTL_MAX_CONNECTIONS", default_value_t = defaults::MAX_CONNECTIONS)]
    max_connections: usize,

    /// Longest accepted request line in bytes
    #[arg(long, env = "DEVCTL_MAX_LINE_LEN", default_value_t = defaults::MAX_LINE_LEN)]
    max_line_len: usize,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let config = ServerConfig::default()
            .with_port(self.port)
            .with_store_path(self.store)
            .with_max_connections(self.max_connections)
            .with_max_line_len(self.max_line_len);
        match self.address {
            Some(address) => config.with_address(address),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = Args::parse().into_config();
    info!("Device control server starting");
    info!("  Record store: {}", config.store_path.display());

    let store = Arc::new(FileRecordStore::new(&config.store_path));
    let dispatcher = CommandDispatcher::new(SharedDeviceState::new(), store);
    let server = CommandServer::bind(&config, dispatcher).await?;

    let shutdown = CancellationToken::new();
    shutdown::spawn_signal_watcher(shutdown.clone());

    let sessions = server.sessions();
    server.run(shutdown).await?;

    info!(open_sessions = sessions.active(), "Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let config = Args::parse_from(["server"]).into_config();
        assert_eq!(config.port, defaults::SERVER_PORT);
        assert_eq!(config.address, None);
        assert_eq!(config.max_connections, defaults::MAX_CONNECTIONS);
    }

    #[test]
    fn test_args_overrides() {
        let config = Args::parse_from([
            "server",
            "--address",
            "127.0.0.1",
            "--port",
            "9100",
            "--store",
            "/tmp/records",
            "--max-line-len",
            "512",
        ])
        .into_config();

        assert_eq!(config.address, Some("127.0.0.1".parse().unwrap()));
        assert_eq!(config.port, 9100);
        assert_eq!(config.store_path, PathBuf::from("/tmp/records"));
        assert_eq!(config.max_line_len, 512);
    }

    #[test]
    fn test_args_zero_limits_fail_validation() {
        let config = Args::parse_from(["server", "--max-connections", "0"]).into_config();
        assert!(config.validate().is_err());

        let config = Args::parse_from(["server", "--max-line-len", "0"]).into_config();
        assert!(config.validate().is_err());
    }
}
