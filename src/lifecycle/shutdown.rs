//! Cancellation coordination for long-running watches.

use tokio::sync::broadcast;

/// Coordinator for cancelling polling loops.
///
/// Provides a broadcast channel that every cancellable watch subscribes to.
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the cancellation signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Cancel every subscribed watch.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of watches still subscribed.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking check whether a receiver has been signalled.
///
/// A closed or lagged channel counts as cancelled.
pub fn is_cancelled(rx: &mut broadcast::Receiver<()>) -> bool {
    !matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty))
}
