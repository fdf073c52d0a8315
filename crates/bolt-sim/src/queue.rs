//! Outbound event queue
//!
//! Event sentences (strike, noise) are encoded at enqueue time and drained
//! by the transmit loop one entry per tick. The queue is unbounded; the
//! only producers are control-surface calls, which are far slower than the
//! drain rate, so backpressure is not modeled.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable FIFO of pre-encoded sentences shared between the control
/// surface (producer) and the transmit loop (consumer).
///
/// `push` and `try_pop` never block beyond the internal lock, which is
/// only held for the queue operation itself.
#[derive(Debug, Clone, Default)]
pub struct OutboundQueue {
    inner: Arc<Mutex<VecDeque<Vec<u8>>>>,
}

impl OutboundQueue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an encoded sentence to the tail
    pub fn push(&self, frame: Vec<u8>) {
        self.lock().push_back(frame);
    }

    /// Remove and return the head entry, or `None` if the queue is empty
    pub fn try_pop(&self) -> Option<Vec<u8>> {
        self.lock().pop_front()
    }

    /// Number of entries waiting to be transmitted
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue holds no entries
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Vec<u8>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
