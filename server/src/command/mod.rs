//! Command dispatch for the server
//!
//! This module handles:
//! - Holding the shared device state behind one lock
//! - Parsing request lines into commands
//! - Applying commands to the device state or the record log
//! - Producing the response for each command

mod device;
mod dispatcher;

pub use device::SharedDeviceState;
pub use dispatcher::CommandDispatcher;
