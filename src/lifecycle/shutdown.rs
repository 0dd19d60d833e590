//! Shutdown coordination.

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// Cloneable trigger side of a watch channel. Every [`ShutdownSignal`]
/// handed out by [`Shutdown::subscribe`] resolves once [`Shutdown::trigger`]
/// has been called, including subscribers created afterwards.
#[derive(Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half, suitable for `with_graceful_shutdown`.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve when shutdown has been triggered.
    pub async fn recv(mut self) {
        // A dropped coordinator also counts as shutdown.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}
