//! Periodic sensor record producer
//!
//! Appends one timestamped record per tick to the record log. The presence
//! reading is simulated by toggling it on every record.

use chrono::{Local, NaiveDateTime};
use devctl_shared::RecordStore;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Format one record line: `<YYYY-MM-DD HH:MM:SS>; presence=<0|1>; seq=<n>`
pub fn format_record(timestamp: NaiveDateTime, presence: bool, seq: u64) -> String {
    format!(
        "{}; presence={}; seq={}\n",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        u8::from(presence),
        seq
    )
}

/// Writes simulated sensor readings into a record store
pub struct SensorProducer {
    store: Arc<dyn RecordStore>,
    presence: bool,
    seq: u64,
}

impl SensorProducer {
    /// Create a new producer; the first record has `presence=1; seq=1`
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            presence: false,
            seq: 0,
        }
    }

    /// Sequence number of the last record written
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Append the next record stamped with `timestamp`
    ///
    /// Presence and sequence only advance when the append succeeds.
    pub fn produce_at(&mut self, timestamp: NaiveDateTime) -> io::Result<String> {
        let presence = !self.presence;
        let seq = self.seq + 1;
        let record = format_record(timestamp, presence, seq);

        self.store.append(&record)?;

        self.presence = presence;
        self.seq = seq;
        Ok(record)
    }

    /// Append the next record stamped with the local wall clock
    pub fn produce(&mut self) -> io::Result<String> {
        self.produce_at(Local::now().naive_local())
    }

    /// Produce a record every `period` until `shutdown` is cancelled
    pub async fn run(mut self, period: Duration, shutdown: CancellationToken) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.produce() {
                Ok(record) => debug!(record = record.trim_end(), "Record appended"),
                Err(e) => warn!(store = self.store.name(), error = %e, "Failed to append record"),
            }
        }

        info!(seq = self.seq, "Producer stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use devctl_shared::{FileRecordStore, MemoryRecordStore};

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(7, 5, 30))
            .expect("valid timestamp")
    }

    #[test]
    fn test_format_record() {
        assert_eq!(
            format_record(timestamp(), true, 12),
            "2024-03-09 07:05:30; presence=1; seq=12\n"
        );
    }

    #[test]
    fn test_presence_toggles_and_seq_counts() {
        let store = Arc::new(MemoryRecordStore::default());
        let mut producer = SensorProducer::new(store.clone());

        producer.produce_at(timestamp()).unwrap();
        producer.produce_at(timestamp()).unwrap();
        producer.produce_at(timestamp()).unwrap();

        assert_eq!(
            store.read_all().unwrap(),
            vec![
                "2024-03-09 07:05:30; presence=1; seq=1\n",
                "2024-03-09 07:05:30; presence=0; seq=2\n",
                "2024-03-09 07:05:30; presence=1; seq=3\n",
            ]
        );
        assert_eq!(producer.seq(), 3);
    }

    #[test]
    fn test_failed_append_does_not_advance() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("envchar");
        let mut producer = SensorProducer::new(Arc::new(FileRecordStore::new(&path)));

        // Append never creates the device node
        assert!(producer.produce_at(timestamp()).is_err());
        assert_eq!(producer.seq(), 0);

        std::fs::File::create(&path).unwrap();
        let record = producer.produce_at(timestamp()).unwrap();
        assert_eq!(record, "2024-03-09 07:05:30; presence=1; seq=1\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_cancelled() {
        let store = Arc::new(MemoryRecordStore::default());
        let producer = SensorProducer::new(store.clone());
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(producer.run(Duration::from_secs(5), shutdown.clone()));

        // First tick fires immediately, then one every period
        tokio::time::sleep(Duration::from_secs(11)).await;
        shutdown.cancel();
        handle.await.unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[2].ends_with("; presence=1; seq=3\n"));
    }
}
