//! Replication channel backed by `tokio::sync::broadcast`
//!
//! Every connection subscribes once when seated and forwards what it
//! receives in order. A connection that falls behind sees `Lagged` and asks
//! the host for a fresh snapshot instead.

use board_engine::{MatchEvent, ReplicationChannel};
use tokio::sync::broadcast;

/// Events buffered per subscriber before it counts as lagging
pub const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone)]
pub struct BroadcastChannel {
    tx: broadcast::Sender<MatchEvent>,
}

impl BroadcastChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.tx.subscribe()
    }

    pub fn subscribers(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastChannel {
    fn default() -> Self {
        Self::new(EVENT_BUFFER)
    }
}

impl ReplicationChannel for BroadcastChannel {
    fn broadcast(&mut self, event: MatchEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("[REPLICATION] No participants listening, event dropped");
        }
    }
}
