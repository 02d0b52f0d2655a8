//! Signal-driven shutdown shared by the server and the sensor daemon

use std::io;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Wait for SIGTERM or SIGINT
pub async fn wait_for_signal() -> io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}

/// Cancel `token` when a termination signal arrives
///
/// The token is also cancelled if the handlers cannot be installed.
pub fn spawn_signal_watcher(token: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = wait_for_signal().await {
            error!(error = %e, "Signal handling unavailable, shutting down");
        }
        token.cancel();
    });
}
