mod config;
mod producer;

use anyhow::Result;
use clap::Parser;
use config::ProducerConfig;
use devctl_shared::{defaults, shutdown, FileRecordStore};
use producer::SensorProducer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Appends simulated sensor readings to the record log
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Record log to append to
    #[arg(long, env = "DEVCTL_STORE", default_value = defaults::STORE_PATH)]
    store: PathBuf,

    /// Seconds between records
    #[arg(long, env = "SENSOR_INTERVAL_SECS", default_value_t = defaults::LOG_INTERVAL_SECS)]
    interval_secs: u64,
}

impl Args {
    fn into_config(self) -> ProducerConfig {
        ProducerConfig::default()
            .with_store_path(self.store)
            .with_interval(Duration::from_secs(self.interval_secs))
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
    let period = config.period();

    info!("Sensor daemon starting");
    info!("  Record store: {}", config.store_path.display());
    info!("  Interval: {:?}", period);

    let shutdown = CancellationToken::new();
    shutdown::spawn_signal_watcher(shutdown.clone());

    let producer = SensorProducer::new(Arc::new(FileRecordStore::new(config.store_path)));
    producer.run(period, shutdown).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let config = Args::parse_from(["sensor-daemon"]).into_config();
        assert_eq!(config.store_path, PathBuf::from(defaults::STORE_PATH));
        assert_eq!(config.interval, Duration::from_secs(5));
    }

    #[test]
    fn test_args_overrides() {
        let config = Args::parse_from([
            "sensor-daemon",
            "--store",
            "/tmp/records",
            "--interval-secs",
            "0",
        ])
        .into_config();

        assert_eq!(config.store_path, PathBuf::from("/tmp/records"));
        assert_eq!(config.period(), Duration::from_secs(1));
    }
}
