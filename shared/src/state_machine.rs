//! Device State Machine
//!
//! Holds the operating mode and output flag and enforces that the output
//! can only change while the device is in manual mode.

use thiserror::Error;

use crate::{Mode, Output};

/// Rejected state transitions
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// Output change attempted outside manual mode
    #[error("Cannot SET OUTPUT while in {mode} mode")]
    InvalidState { mode: Mode },
}

/// The device mode/output state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceState {
    mode: Mode,
    output: Output,
}

impl DeviceState {
    /// Create a new state machine in AUTO mode with the output OFF
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get current output
    pub fn output(&self) -> Output {
        self.output
    }

    /// Overwrite the mode unconditionally and return it
    pub fn set_mode(&mut self, mode: Mode) -> Mode {
        self.mode = mode;
        self.mode
    }

    /// Set the output, only allowed in manual mode
    ///
    /// On rejection the output is left unchanged.
    pub fn set_output(&mut self, output: Output) -> Result<Output, StateError> {
        if self.mode != Mode::Manual {
            return Err(StateError::InvalidState { mode: self.mode });
        }
        self.output = output;
        Ok(self.output)
    }
}
