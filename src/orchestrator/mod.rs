//! Deployment orchestration.
//!
//! This module contains the concurrent task runner, the state watcher for
//! asynchronous deploy/undeploy operations, and the cancellation token
//! that ties in-flight polling loops to process interruption.

mod cancel;
mod outcome;
mod runner;
mod watcher;

pub use cancel::CancelToken;
pub use outcome::{DeploymentTask, Operation, TaskOutcome, TaskStatus, WatchKind};
pub use runner::TaskOrchestrator;
pub use watcher::{StateWatcher, WatchResult, POLL_INTERVAL_MS};
