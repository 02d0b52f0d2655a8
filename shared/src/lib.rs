//! Device Control Shared Protocol Types
//!
//! This crate provides the line protocol, codec, device state machine and
//! record store shared by the control server and the sensor daemon, along
//! with their common signal handling.

pub mod codec;
pub mod protocol;
pub mod shutdown;
pub mod state_machine;
pub mod store;

// Re-export commonly used types at crate root
pub use protocol::{parse, Command, Mode, Output, ParseError, Response};
pub use state_machine::{DeviceState, StateError};
pub use store::{FileRecordStore, MemoryRecordStore, RecordStore};

/// Process-wide defaults for the system
pub mod defaults {
    /// TCP port the control server listens on
    pub const SERVER_PORT: u16 = 9000;

    /// Location of the append-only record log
    pub const STORE_PATH: &str = "/dev/envchar";

    /// Longest accepted command line, in bytes, before the connection is dropped
    pub const MAX_LINE_LEN: usize = 256;

    /// Maximum number of concurrently served clients
    pub const MAX_CONNECTIONS: usize = 64;

    /// Seconds between records written by the sensor daemon
    pub const LOG_INTERVAL_SECS: u64 = 5;

    /// Capacity of the in-memory record log, matching the character device
    pub const MEMORY_STORE_CAPACITY: usize = 4096;
}
