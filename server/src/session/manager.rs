//! Session manager for admitting and tracking client connections

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps concurrent sessions and hands out session ids
///
/// Workers are never joined; a slot frees up when a worker drops its
/// [`SessionPermit`].
pub struct SessionManager {
    slots: Arc<Semaphore>,
    max_sessions: usize,
    next_id: AtomicU64,
    active: Arc<AtomicUsize>,
}

/// A reserved but not yet used session slot
#[derive(Debug)]
pub struct SessionSlot {
    permit: OwnedSemaphorePermit,
}

impl SessionManager {
    /// Create a new session manager allowing `max_sessions` concurrent clients
    pub fn new(max_sessions: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(max_sessions)),
            max_sessions,
            next_id: AtomicU64::new(0),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wait for a free session slot
    ///
    /// Returns `None` only if the manager has been closed.
    pub async fn reserve(&self) -> Option<SessionSlot> {
        let permit = Arc::clone(&self.slots).acquire_owned().await.ok()?;
        Some(SessionSlot { permit })
    }

    /// Turn a reserved slot into a live session with a fresh id
    pub fn open(&self, slot: SessionSlot) -> SessionPermit {
        self.active.fetch_add(1, Ordering::SeqCst);
        SessionPermit {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            active: Arc::clone(&self.active),
            _permit: slot.permit,
        }
    }

    /// Stop handing out slots; pending and future reservations return `None`
    pub fn close(&self) {
        self.slots.close();
    }

    /// Get the number of live sessions
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Get the configured session cap
    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}

/// A live session's slot; releases it when dropped
#[derive(Debug)]
pub struct SessionPermit {
    id: u64,
    active: Arc<AtomicUsize>,
    _permit: OwnedSemaphorePermit,
}

impl SessionPermit {
    /// Session id used to correlate log lines
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for SessionPermit {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
