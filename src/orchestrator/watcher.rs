//! State watcher for asynchronous deployment operations.
//!
//! Deploy and undeploy are asynchronous on the platform: the initiating
//! call returns immediately and the function converges in the background.
//! The watcher polls the remote record at a fixed interval until the
//! terminal condition for the operation is observed, or until the watch
//! is cancelled.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::Result;
use crate::platform::{FunctionDirectory, FunctionState, RemoteFunctionRecord};

use super::cancel::CancelToken;
use super::outcome::{DeploymentTask, WatchKind};

/// Interval between remote state checks, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 3000;

/// Result of watching one deployment task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchResult {
    /// The terminal condition was observed.
    Completed,
    /// The watch was cancelled before reaching a terminal state.
    Cancelled,
}

/// Watcher that polls remote state until a deployment task resolves.
///
/// Each watched task gets its own watcher invocation with its own timer;
/// watchers share nothing but the directory handle.
pub struct StateWatcher<D> {
    /// Remote function directory.
    directory: Arc<D>,
    /// Interval between polls.
    interval: Duration,
    /// Cancellation token observed between polls.
    cancel: CancelToken,
}

impl<D: FunctionDirectory> StateWatcher<D> {
    /// Creates a watcher with the default polling interval.
    #[must_use]
    pub fn new(directory: Arc<D>, cancel: CancelToken) -> Self {
        Self {
            directory,
            interval: Duration::from_millis(POLL_INTERVAL_MS),
            cancel,
        }
    }

    /// Overrides the polling interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Polls the remote record until the task reaches its terminal state.
    ///
    /// # Errors
    ///
    /// Returns an error if a state read fails.
    pub async fn watch(&self, task: &DeploymentTask) -> Result<WatchResult> {
        debug!(
            "Watching '{}' until {:?} completes",
            task.function_name, task.kind
        );

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    debug!("Watch for '{}' cancelled", task.function_name);
                    return Ok(WatchResult::Cancelled);
                }
                () = tokio::time::sleep(self.interval) => {}
            }

            let record = self.directory.get_by_uuid(task.uuid).await?;
            trace!(
                "Function '{}' is {} (deployed_at: {:?})",
                task.function_name,
                record.state,
                record.deployed_at
            );

            if Self::is_terminal(task.kind, &record) {
                debug!("Function '{}' reached terminal state", task.function_name);
                return Ok(WatchResult::Completed);
            }
        }
    }

    /// Terminal condition for a watched operation.
    ///
    /// A deploy is only terminal once the state flip is accompanied by a
    /// deployment timestamp; the state can flip before the manifest has
    /// propagated.
    fn is_terminal(kind: WatchKind, record: &RemoteFunctionRecord) -> bool {
        match kind {
            WatchKind::Deploy => {
                record.state == FunctionState::Productive && record.deployed_at.is_some()
            }
            WatchKind::Undeploy => record.state == FunctionState::Draft,
        }
    }
}
