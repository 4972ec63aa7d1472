//! Cross-screen invalidation signal.
//!
//! Transaction mutations invalidate the goals dashboard: the platform
//! recomputes goal actuals server-side, so the dashboard must re-fetch
//! after any transaction create, update, or delete. The signal carries no
//! payload — it only says "your data is stale" — and duplicate deliveries
//! are harmless because the handler re-fetches idempotently.
//!
//! The signal is an explicit service instance handed to both publisher and
//! subscriber; there is no process-global channel to reach around the
//! dependency graph.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

const CHANNEL_CAPACITY: usize = 16;

/// Payload-less publish/subscribe channel for dashboard invalidation.
///
/// Cloning shares the underlying channel, so a clone given to a publisher
/// reaches subscribers of any other clone.
///
/// # Examples
/// ```
/// use client::domain::RefreshSignal;
///
/// let signal = RefreshSignal::new();
/// let mut listener = signal.subscribe();
/// signal.publish();
/// assert!(listener.try_changed());
/// ```
#[derive(Debug, Clone)]
pub struct RefreshSignal {
    sender: broadcast::Sender<()>,
}

impl RefreshSignal {
    /// Create an independent signal.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Notify all current subscribers that dependent data changed.
    ///
    /// Publishing with zero subscribers is a no-op, never an error, and the
    /// event is not replayed to later subscribers.
    pub fn publish(&self) {
        // send only errors when there are no receivers; that is fine here.
        let _ = self.sender.send(());
    }

    /// Subscribe to notifications published from now on.
    pub fn subscribe(&self) -> RefreshListener {
        RefreshListener {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`RefreshSignal`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct RefreshListener {
    receiver: broadcast::Receiver<()>,
}

impl RefreshListener {
    /// Wait for the next notification.
    ///
    /// Returns `false` only when every publisher handle has been dropped.
    /// A backlog overflow collapses into a single notification, which is
    /// correct for an idempotent re-fetch.
    pub async fn changed(&mut self) -> bool {
        match self.receiver.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => true,
            Err(RecvError::Closed) => false,
        }
    }

    /// Drain any pending notification without waiting.
    pub fn try_changed(&mut self) -> bool {
        let mut notified = false;
        loop {
            match self.receiver.try_recv() {
                Ok(()) | Err(TryRecvError::Lagged(_)) => notified = true,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return notified,
            }
        }
    }
}
