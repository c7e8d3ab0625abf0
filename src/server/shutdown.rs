//! Shutdown coordination.

use tokio::sync::broadcast;

/// Broadcast-based shutdown coordinator.
///
/// The serve task and any other long-running work subscribe; triggering
/// resolves every subscriber's `recv` and starts graceful drain.
#[derive(Debug)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// A future that resolves once shutdown is triggered. Suitable for
    /// `axum::serve(..).with_graceful_shutdown(..)`.
    pub fn triggered(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_resolves_subscribers() {
        let shutdown = Shutdown::new();
        let waiter = shutdown.triggered();
        shutdown.trigger();
        waiter.await;
    }

    #[tokio::test]
    async fn late_subscriber_still_resolves_on_new_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let waiter = shutdown.triggered();
        shutdown.trigger();
        waiter.await;
    }
}
