//! Cancellation for an in-progress checkout.

use std::future::Future;

use tokio::sync::watch;

/// Creates a linked handle/token pair.
///
/// The workflow observes the token; the caller keeps the handle. Calling
/// [`CancelHandle::cancel`] or dropping the handle stops the workflow at its
/// next suspension point.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Caller side. Dropping it cancels as well.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Cancels once `signal` fires.
    ///
    /// If the signal cannot be listened for, the handle is kept alive so
    /// the checkout runs on uncancelled instead of stopping at once.
    pub async fn cancel_on<F>(self, signal: F)
    where
        F: Future<Output = std::io::Result<()>>,
    {
        match signal.await {
            Ok(()) => self.cancel(),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for cancellation signal");
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Workflow side.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// True once cancelled or once the handle is gone.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves when the checkout should stop.
    pub async fn cancelled(mut self) {
        // Err means the handle was dropped, which counts as cancellation.
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}
