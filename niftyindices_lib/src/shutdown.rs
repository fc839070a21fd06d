//! Cooperative cancellation for a running batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cloneable cancellation handle.
///
/// Once [`Shutdown::cancel`] is called every clone reports cancelled and
/// every pending [`Shutdown::cancelled`] future completes.
#[derive(Clone, Debug, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Completes once the handle is cancelled.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel is not missed.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Cancels this handle when the process receives Ctrl-C.
    pub fn cancel_on_ctrl_c(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted by user, finishing up");
                shutdown.cancel();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_not_cancelled() {
        assert!(!Shutdown::new().is_cancelled());
    }

    #[test]
    fn cancel_is_visible_to_clones() {
        let shutdown = Shutdown::new();
        let clone = shutdown.clone();
        shutdown.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_returns_immediately_after_cancel() {
        let shutdown = Shutdown::new();
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), shutdown.cancelled())
            .await
            .expect("cancelled() should complete");
    }

    #[tokio::test]
    async fn cancelled_wakes_pending_waiter() {
        let shutdown = Shutdown::new();
        let waiter = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { shutdown.cancelled().await })
        };
        tokio::task::yield_now().await;
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
