//! Command dispatcher applying parsed commands to device state and the record log

use super::device::SharedDeviceState;
use devctl_shared::{parse, Command, RecordStore, Response};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Applies commands from every session to the shared state
///
/// Cheap to clone; each session holds its own copy.
#[derive(Clone)]
pub struct CommandDispatcher {
    state: SharedDeviceState,
    store: Arc<dyn RecordStore>,
}

impl CommandDispatcher {
    /// Create a new command dispatcher
    pub fn new(state: SharedDeviceState, store: Arc<dyn RecordStore>) -> Self {
        Self { state, store }
    }

    /// Shared device state this dispatcher mutates
    pub fn state(&self) -> &SharedDeviceState {
        &self.state
    }

    /// Parse and execute one trimmed request line
    pub async fn dispatch_line(&self, line: &str) -> Response {
        let response = match parse(line) {
            Ok(command) => self.dispatch(command).await,
            Err(e) => e.into(),
        };
        if response.is_error() {
            debug!(line, ?response, "Command rejected");
        }
        response
    }

    /// Execute a command and produce its response
    ///
    /// Store failures become `ERR IO`; nothing here touches the socket.
    pub async fn dispatch(&self, command: Command) -> Response {
        match command {
            Command::GetMode => Response::Mode(self.state.get_mode().await),
            Command::SetMode(mode) => Response::Mode(self.state.set_mode(mode).await),
            Command::SetOutput(output) => match self.state.set_output(output).await {
                Ok(output) => Response::Output(output),
                Err(e) => Response::InvalidState(e.to_string()),
            },
            Command::GetLast(n) => self.get_last(n).await,
        }
    }

    async fn get_last(&self, n: NonZeroUsize) -> Response {
        let store = Arc::clone(&self.store);

        // Store reads are blocking file I/O
        let result = tokio::task::spawn_blocking(move || store.read_all()).await;

        match result {
            Ok(Ok(records)) => Response::Records(select_last(records, n.get())),
            Ok(Err(e)) => {
                warn!(store = self.store.name(), error = %e, "Record store read failed");
                Response::Io(format!("Cannot open {}", self.store.name()))
            }
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "Record store read task failed");
                Response::Io(format!("Cannot open {}", self.store.name()))
            }
        }
    }
}

/// Keep the `n` most recent records, or all of them if fewer exist
pub fn select_last(mut records: Vec<String>, n: usize) -> Vec<String> {
    let start = records.len().saturating_sub(n);
    records.split_off(start)
}
