//! Process-wide device state behind a single exclusive lock

use devctl_shared::{DeviceState, Mode, Output, StateError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cloneable handle to the one device state shared by every session
///
/// Every accessor holds the lock only for the O(1) read or write and never
/// across network I/O.
#[derive(Debug, Clone, Default)]
pub struct SharedDeviceState {
    inner: Arc<Mutex<DeviceState>>,
}

impl SharedDeviceState {
    /// Create a new handle in AUTO mode with the output OFF
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_mode(&self) -> Mode {
        self.inner.lock().await.mode()
    }

    pub async fn set_mode(&self, mode: Mode) -> Mode {
        self.inner.lock().await.set_mode(mode)
    }

    pub async fn get_output(&self) -> Output {
        self.inner.lock().await.output()
    }

    /// Set the output; fails and leaves it unchanged unless in MANUAL mode
    pub async fn set_output(&self, output: Output) -> Result<Output, StateError> {
        self.inner.lock().await.set_output(output)
    }

    /// Consistent copy of mode and output taken under one lock
    pub async fn snapshot(&self) -> DeviceState {
        *self.inner.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initial_values() {
        let state = SharedDeviceState::new();
        assert_eq!(state.get_mode().await, Mode::Auto);
        assert_eq!(state.get_output().await, Output::Off);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let state = SharedDeviceState::new();
        let other = state.clone();

        other.set_mode(Mode::Manual).await;
        assert_eq!(state.get_mode().await, Mode::Manual);

        assert_eq!(state.set_output(Output::On).await, Ok(Output::On));
        let snapshot = other.snapshot().await;
        assert_eq!(snapshot.mode(), Mode::Manual);
        assert_eq!(snapshot.output(), Output::On);
    }

    #[tokio::test]
    async fn test_set_output_rejected_in_auto() {
        let state = SharedDeviceState::new();
        assert!(state.set_output(Output::On).await.is_err());
        assert_eq!(state.get_output().await, Output::Off);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mode_writers() {
        let state = SharedDeviceState::new();
        let mut handles = Vec::new();

        for i in 0..32 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                let mode = if i % 2 == 0 { Mode::Auto } else { Mode::Manual };
                state.set_mode(mode).await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mode = state.get_mode().await;
        assert!(mode == Mode::Auto || mode == Mode::Manual);
    }
}
