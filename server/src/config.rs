//! Server configuration

use anyhow::{ensure, Result};
use devctl_shared::defaults;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use tokio::sync::Semaphore;

/// Configuration for the command server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind; `None` listens on every address family
    pub address: Option<IpAddr>,
    /// TCP port to listen on
    pub port: u16,
    /// Record log served by GET LAST
    pub store_path: PathBuf,
    /// Maximum concurrent client sessions
    pub max_connections: usize,
    /// Longest accepted request line in bytes
    pub max_line_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: defaults::SERVER_PORT,
            store_path: PathBuf::from(defaults::STORE_PATH),
            max_connections: defaults::MAX_CONNECTIONS,
            max_line_len: defaults::MAX_LINE_LEN,
        }
    }
}

impl ServerConfig {
    pub fn with_address(mut self, address: IpAddr) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_max_line_len(mut self, max: usize) -> Self {
        self.max_line_len = max;
        self
    }

    /// Reject limits that would leave the server unable to serve anyone
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (1..=Semaphore::MAX_PERMITS).contains(&self.max_connections),
            "max_connections must be between 1 and {}, got {}",
            Semaphore::MAX_PERMITS,
            self.max_connections
        );
        ensure!(
            self.max_line_len > 0,
            "max_line_len must be at least 1 byte"
        );
        Ok(())
    }

    /// Candidate listen addresses, in the order they should be tried
    ///
    /// Without an explicit address the IPv6 wildcard comes first; on a
    /// dual-stack host it also accepts IPv4 clients.
    pub fn bind_addrs(&self) -> Vec<SocketAddr> {
        match self.address {
            Some(ip) => vec![SocketAddr::new(ip, self.port)],
            None => vec![
                SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), self.port),
                SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port),
            ],
        }
    }
}
