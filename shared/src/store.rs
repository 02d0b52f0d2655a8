//! Append-only record log access
//!
//! The control server only reads records; the sensor daemon appends them.
//! Records are newline-terminated text and are returned in append order.

use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::defaults::MEMORY_STORE_CAPACITY;

/// Read/append access to an ordered log of text records
///
/// Implementations must be safe for concurrent independent reads.
pub trait RecordStore: Send + Sync {
    /// Human-readable location, used in error responses
    fn name(&self) -> &str;

    /// Read every record currently stored, oldest first
    fn read_all(&self) -> io::Result<Vec<String>>;

    /// Append one record; a trailing newline is added if missing
    fn append(&self, record: &str) -> io::Result<()>;
}

/// Record log backed by a file or character device, opened per call
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
    name: String,
}

impl FileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl RecordStore for FileRecordStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_all(&self) -> io::Result<Vec<String>> {
        let file = OpenOptions::new().read(true).open(&self.path)?;
        let mut reader = BufReader::new(file);
        let mut records = Vec::new();
        let mut line = Vec::new();

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            records.push(String::from_utf8_lossy(&line).into_owned());
        }

        Ok(records)
    }

    fn append(&self, record: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        let mut buf = Vec::with_capacity(record.len() + 1);
        buf.extend_from_slice(record.as_bytes());
        if !record.ends_with('\n') {
            buf.push(b'\n');
        }
        // One write per record so readers never see half of one
        file.write_all(&buf)
    }
}

/// Bounded in-process record log
///
/// Mirrors the character device: an append that does not fit in the
/// remaining space clears the log first, and a record larger than the
/// whole capacity is cut down to it.
#[derive(Debug)]
pub struct MemoryRecordStore {
    data: Mutex<Vec<u8>>,
    capacity: usize,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new(MEMORY_STORE_CAPACITY)
    }
}

impl MemoryRecordStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Create a store pre-filled with `records`
    pub fn with_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let store = Self::default();
        for record in records {
            // Infallible for the in-memory store
            let _ = store.append(record.as_ref());
        }
        store
    }

    /// Number of bytes currently stored
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordStore for MemoryRecordStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn read_all(&self) -> io::Result<Vec<String>> {
        let data = self.lock();
        Ok(data
            .split_inclusive(|&b| b == b'\n')
            .map(|record| String::from_utf8_lossy(record).into_owned())
            .collect())
    }

    fn append(&self, record: &str) -> io::Result<()> {
        let mut bytes = record.as_bytes().to_vec();
        if !record.ends_with('\n') {
            bytes.push(b'\n');
        }
        bytes.truncate(self.capacity);

        let mut data = self.lock();
        if bytes.len() > self.capacity - data.len() {
            data.clear();
        }
        data.extend_from_slice(&bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_reads_in_order() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let store = FileRecordStore::new(file.path());

        store.append("r1\n").unwrap();
        store.append("r2").unwrap();
        store.append("r3\n").unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records, vec!["r1\n", "r2\n", "r3\n"]);
    }

    #[test]
    fn test_file_store_empty() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let store = FileRecordStore::new(file.path());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_torn_last_record() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"r1\nr2").unwrap();

        let store = FileRecordStore::new(file.path());
        assert_eq!(store.read_all().unwrap(), vec!["r1\n", "r2"]);
    }

    #[test]
    fn test_file_store_missing_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing");
        let store = FileRecordStore::new(&path);

        assert!(store.read_all().is_err());
        assert!(store.append("r1").is_err());
        assert_eq!(store.name(), path.display().to_string());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryRecordStore::with_records(["r1", "r2\n"]);
        assert_eq!(store.read_all().unwrap(), vec!["r1\n", "r2\n"]);
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_memory_store_resets_when_full() {
        let store = MemoryRecordStore::new(8);
        store.append("abc").unwrap();
        store.append("def").unwrap();
        assert_eq!(store.len(), 8);

        // No room left: log is cleared before the write
        store.append("gh").unwrap();
        assert_eq!(store.read_all().unwrap(), vec!["gh\n"]);
    }

    #[test]
    fn test_memory_store_truncates_oversized_record() {
        let store = MemoryRecordStore::new(4);
        store.append("abcdefgh").unwrap();

        assert_eq!(store.len(), 4);
        assert_eq!(store.read_all().unwrap(), vec!["abcd"]);
        assert!(!store.is_empty());
    }
}
