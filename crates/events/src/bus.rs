//! Broadcast bus for auth-state changes.
//!
//! - Best-effort fan-out; publishing with no live subscribers is not an error
//! - At-least-once acceptable; a slow subscriber that lags simply skips to
//!   the most recent changes (the session store only cares about the latest
//!   state, not the full history)

use tokio::sync::broadcast;

use crate::change::AuthChange;

const BUS_CAPACITY: usize = 32;

/// In-process pub/sub bus for [`AuthChange`] notifications.
#[derive(Debug)]
pub struct AuthBus {
    tx: broadcast::Sender<AuthChange>,
}

impl AuthBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publish a change to all live subscribers.
    pub fn publish(&self, change: AuthChange) {
        // Err here only means "no subscribers right now".
        let _ = self.tx.send(change);
    }

    /// Register an observer; the returned subscription doubles as the
    /// disposer.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: Some(self.tx.subscribe()),
        }
    }
}

impl Default for AuthBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A live registration on an [`AuthBus`].
///
/// Disposal is exactly-once: the first `dispose` (or the drop) detaches the
/// receiver; later calls are no-ops.
#[derive(Debug)]
pub struct Subscription {
    rx: Option<broadcast::Receiver<AuthChange>>,
}

impl Subscription {
    /// Wait for the next change.
    ///
    /// Returns `None` once the subscription is disposed or the bus is gone.
    /// Lagged deliveries are skipped, not surfaced.
    pub async fn next(&mut self) -> Option<AuthChange> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "auth change subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Detach from the bus. Idempotent.
    pub fn dispose(&mut self) {
        if self.rx.take().is_some() {
            tracing::debug!("auth change subscription disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.rx.is_none()
    }
}
