//! TCP accept loop

use crate::command::CommandDispatcher;
use crate::config::ServerConfig;
use crate::session::{ClientSession, SessionManager};
use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Listening socket plus everything a new session needs
///
/// One task is spawned per accepted connection and never joined. Shutdown
/// only stops the accept loop; live sessions end when their peer does.
pub struct CommandServer {
    listener: TcpListener,
    sessions: Arc<SessionManager>,
    dispatcher: CommandDispatcher,
    max_line_len: usize,
}

impl CommandServer {
    /// Bind the first usable address from the config
    ///
    /// Fails before binding if the config's limits are unusable.
    pub async fn bind(config: &ServerConfig, dispatcher: CommandDispatcher) -> Result<Self> {
        config.validate().context("invalid server configuration")?;
        let mut last_err = None;

        for addr in config.bind_addrs() {
            match TcpListener::bind(addr).await {
                Ok(listener) => {
                    info!(
                        addr = %listener.local_addr()?,
                        max_connections = config.max_connections,
                        "Server listening"
                    );
                    return Ok(Self {
                        listener,
                        sessions: Arc::new(SessionManager::new(config.max_connections)),
                        dispatcher,
                        max_line_len: config.max_line_len,
                    });
                }
                Err(e) => {
                    warn!(%addr, error = %e, "Bind failed");
                    last_err = Some(anyhow::Error::new(e).context(format!("failed to bind {}", addr)));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("no address to bind")))
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("failed to read listener address")
    }

    /// Session accounting for this server
    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }

    /// Accept connections until `shutdown` is cancelled, then release the socket
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        loop {
            if self.sessions.active() >= self.sessions.max_sessions() {
                warn!(
                    active = self.sessions.active(),
                    "At connection limit, waiting for a session to close"
                );
            }

            let slot = tokio::select! {
                _ = shutdown.cancelled() => break,
                slot = self.sessions.reserve() => match slot {
                    Some(slot) => slot,
                    None => break,
                },
            };

            let (stream, addr) = tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.listener.accept() => match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        // Transient accept errors shouldn't stop the server
                        error!(error = %e, "Accept error");
                        continue;
                    }
                },
            };

            let permit = self.sessions.open(slot);
            let session =
                ClientSession::new(permit.id(), addr.to_string(), stream, self.max_line_len);
            let dispatcher = self.dispatcher.clone();
            tokio::spawn(async move {
                session.run(dispatcher).await;
                drop(permit);
            });
        }

        info!(
            active_sessions = self.sessions.active(),
            "Shutdown requested, no longer accepting connections"
        );
        self.sessions.close();
        drop(self.listener);
        info!("Listener closed");

        let state = self.dispatcher.state().snapshot().await;
        info!(mode = %state.mode(), output = %state.output(), "Final device state");

        Ok(())
    }
}
