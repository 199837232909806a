//! Cooperative shutdown signal.
//!
//! The pipeline polls this between videos and between segments; an
//! in-flight encode is never interrupted, so cancellation lands on clean
//! boundaries where partial work can be discarded safely.

use tokio::sync::watch;

/// Create a linked shutdown handle/signal pair.
pub fn shutdown_channel() -> (ShutdownHandle, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx }, Shutdown { rx })
}

/// Held by the embedding application (signal handler, test harness).
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    /// Request shutdown. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Passed into the pipeline and polled at suspension points.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// A signal that never fires, for tool bins and tests.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Keep the sender alive forever so the channel never closes.
        std::mem::forget(tx);
        Self { rx }
    }
}
