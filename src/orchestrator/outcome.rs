//! Operations, deployment tasks, and task outcomes.
//!
//! This module defines the units of work the orchestrator executes and
//! the per-function outcomes it reports upward to the CLI.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::sync::{ChangeSet, ConfirmedOperation};

/// A unit of work for one function, executed by the orchestrator.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Create or update the remote record from an approved change.
    Push(ConfirmedOperation),
    /// Copy the remote code and configuration into the local tree.
    Pull {
        /// Function name.
        name: String,
        /// Uuid of the remote record.
        uuid: Uuid,
    },
    /// Deploy the function.
    Deploy {
        /// Function name.
        name: String,
        /// Uuid of the remote record.
        uuid: Uuid,
    },
    /// Undeploy the function.
    Undeploy {
        /// Function name.
        name: String,
        /// Uuid of the remote record.
        uuid: Uuid,
    },
}

/// Direction of an asynchronous deployment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKind {
    /// Waiting for a deployment to complete.
    Deploy,
    /// Waiting for an undeployment to complete.
    Undeploy,
}

/// A deployment in flight, watched until it reaches a terminal state.
///
/// Created when an orchestration run begins a deploy or undeploy and
/// dropped when the task resolves.
#[derive(Debug, Clone)]
pub struct DeploymentTask {
    /// Name of the function being deployed.
    pub function_name: String,
    /// Uuid of the remote record.
    pub uuid: Uuid,
    /// Direction of the operation.
    pub kind: WatchKind,
    /// When the orchestrator issued the initiating call.
    pub started_at: DateTime<Utc>,
}

/// Terminal status of one orchestrated task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// The operation completed.
    Succeeded,
    /// The operation was skipped.
    Skipped {
        /// Why the task was skipped.
        message: String,
    },
    /// The operation failed.
    Failed {
        /// Why the task failed.
        message: String,
    },
}

/// Outcome of one orchestrated task.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// Name of the function the task concerned.
    pub function_name: String,
    /// Title of the task, as shown in the progress display.
    pub title: String,
    /// Terminal status.
    pub status: TaskStatus,
}

impl Operation {
    /// Name of the function this operation concerns.
    #[must_use]
    pub fn function_name(&self) -> &str {
        match self {
            Self::Push(op) => &op.name,
            Self::Pull { name, .. } | Self::Deploy { name, .. } | Self::Undeploy { name, .. } => {
                name
            }
        }
    }

    /// Title for the progress display.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Push(op) => match &op.change {
                ChangeSet::NewFunction(_) => format!("Creating function '{}'", op.name),
                ChangeSet::UpdatedFunction { .. } | ChangeSet::Unchanged => {
                    format!("Updating function '{}'", op.name)
                }
            },
            Self::Pull { name, .. } => format!("Pulling function '{name}'"),
            Self::Deploy { name, .. } => format!("Deploying function '{name}'"),
            Self::Undeploy { name, .. } => format!("Undeploying function '{name}'"),
        }
    }
}

impl DeploymentTask {
    /// Creates a task for a deployment that was just initiated.
    #[must_use]
    pub fn new(function_name: impl Into<String>, uuid: Uuid, kind: WatchKind) -> Self {
        Self {
            function_name: function_name.into(),
            uuid,
            kind,
            started_at: Utc::now(),
        }
    }
}

impl TaskOutcome {
    /// Returns true if the task succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, TaskStatus::Succeeded)
    }

    /// Returns true if the task failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.status, TaskStatus::Failed { .. })
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Skipped { message } => write!(f, "skipped: {message}"),
            Self::Failed { message } => write!(f, "failed: {message}"),
        }
    }
}

impl std::fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.function_name, self.status)
    }
}
