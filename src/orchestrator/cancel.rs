//! Cancellation token for in-flight polling loops.
//!
//! Interruption is a first-class operation: the CLI trips one token on
//! Ctrl-C and every watch loop observes it at its next suspension point,
//! so no polling timer outlives the process teardown.

use tokio::sync::watch;

/// Cloneable cancellation token.
///
/// All clones observe the same cancellation; cancelling is idempotent.
#[derive(Debug, Clone)]
pub struct CancelToken {
    /// Shared trip switch.
    sender: std::sync::Arc<watch::Sender<bool>>,
    /// Receiver observed by watch loops.
    receiver: watch::Receiver<bool>,
}

impl CancelToken {
    /// Creates a new, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: std::sync::Arc::new(sender),
            receiver,
        }
    }

    /// Trips the token.
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }

    /// Returns true if the token has been tripped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once the token is tripped.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        if *receiver.borrow() {
            return;
        }
        while receiver.changed().await.is_ok() {
            if *receiver.borrow() {
                return;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
