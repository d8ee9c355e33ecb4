use std::collections::VecDeque;

use crossing_core::GameEvent;
use tracing::trace;

/// Process-wide FIFO of posted events.
///
/// Posting never dispatches. The engine drains the whole queue once per
/// frame, so anything posted while that batch is being delivered waits for
/// the next frame.
#[derive(Debug, Default)]
pub struct EventBus {
    queue: VecDeque<GameEvent>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an event for the next dispatch pass.
    pub fn post(&mut self, event: GameEvent) {
        trace!(event = ?event.name(), "event posted");
        self.queue.push_back(event);
    }

    /// Removes and returns every queued event in posting order.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.queue.drain(..).collect()
    }

    /// Events waiting for the next dispatch pass.
    pub fn pending(&self) -> impl Iterator<Item = &GameEvent> {
        self.queue.iter()
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
