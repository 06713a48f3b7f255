// src/engine/signal.rs

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

/// Pool-wide, one-way abort flag.
///
/// Raised by a worker under `FailurePolicy::Abort` or by Ctrl-C. Once raised
/// it stays raised. Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        let was_raised = self.tx.send_replace(true);
        if !was_raised {
            info!("abort signal raised");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the flag is raised (immediately if it already is).
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Unreachable while `self` holds the sender.
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}
