//! Session management for connected clients
//!
//! This module handles:
//! - Capping and tracking concurrent client sessions
//! - Line framing over each client's byte stream
//! - Feeding each line to the dispatcher and writing the response back

mod connection;
mod manager;

pub use connection::ClientSession;
pub use manager::SessionManager;
