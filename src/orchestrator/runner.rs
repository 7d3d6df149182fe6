//! Concurrent task orchestrator.
//!
//! Approved operations for one command invocation all run concurrently;
//! the remote platform is the rate limiter. Each task boundary converts
//! errors into per-function outcomes, so one function's failure never
//! cancels, blocks, or fails a sibling.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::error::{FuncliftError, PlatformError};
use crate::platform::{FunctionDirectory, UpdateReceipt};
use crate::project::{LocalFunctionDefinition, ProjectReader};
use crate::sync::{ChangeSet, ConfirmedOperation};
use uuid::Uuid;

use super::cancel::CancelToken;
use super::outcome::{DeploymentTask, Operation, TaskOutcome, TaskStatus, WatchKind};
use super::watcher::{StateWatcher, WatchResult, POLL_INTERVAL_MS};

/// Orchestrator for a batch of confirmed operations.
pub struct TaskOrchestrator<D, P> {
    /// Remote function directory.
    directory: Arc<D>,
    /// Local project reader, used by pull tasks.
    reader: Arc<P>,
    /// Cancellation token handed to every watcher.
    cancel: CancelToken,
    /// Whether deploy/undeploy tasks wait for a terminal state.
    watch: bool,
    /// Polling interval handed to watchers.
    poll_interval: Duration,
}

impl<D, P> TaskOrchestrator<D, P>
where
    D: FunctionDirectory + 'static,
    P: ProjectReader + 'static,
{
    /// Creates a new orchestrator.
    #[must_use]
    pub fn new(directory: Arc<D>, reader: Arc<P>, cancel: CancelToken) -> Self {
        Self {
            directory,
            reader,
            cancel,
            watch: true,
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
        }
    }

    /// Sets whether deploy/undeploy tasks are watched to completion.
    #[must_use]
    pub const fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Overrides the polling interval for watched tasks.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Executes all operations concurrently, returning one outcome per
    /// operation in submission order.
    pub async fn run(&self, operations: Vec<Operation>) -> Vec<TaskOutcome> {
        if operations.is_empty() {
            return Vec::new();
        }

        info!("Executing {} task(s)", operations.len());

        let labels: Vec<(String, String)> = operations
            .iter()
            .map(|op| (op.function_name().to_string(), op.title()))
            .collect();

        let mut set = JoinSet::new();

        for (index, operation) in operations.into_iter().enumerate() {
            let directory = Arc::clone(&self.directory);
            let reader = Arc::clone(&self.reader);
            let cancel = self.cancel.clone();
            let watch = self.watch;
            let interval = self.poll_interval;

            set.spawn(async move {
                let outcome =
                    Self::execute(directory, reader, operation, watch, interval, cancel).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<TaskOutcome>> = labels.iter().map(|_| None).collect();

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => error!("Orchestrated task terminated abnormally: {e}"),
            }
        }

        slots
            .into_iter()
            .zip(labels)
            .map(|(slot, (function_name, title))| {
                slot.unwrap_or_else(|| TaskOutcome {
                    function_name,
                    title,
                    status: TaskStatus::Failed {
                        message: String::from("task terminated unexpectedly"),
                    },
                })
            })
            .collect()
    }

    /// Executes one operation inside its own task boundary.
    async fn execute(
        directory: Arc<D>,
        reader: Arc<P>,
        operation: Operation,
        watch: bool,
        interval: Duration,
        cancel: CancelToken,
    ) -> TaskOutcome {
        let function_name = operation.function_name().to_string();
        let title = operation.title();
        debug!("{title}");

        let status = match operation {
            Operation::Push(confirmed) => Self::execute_push(&directory, confirmed).await,
            Operation::Pull { name, uuid } => {
                Self::execute_pull(&directory, &reader, &name, uuid).await
            }
            Operation::Deploy { name, uuid } => {
                Self::execute_watched(
                    directory,
                    &name,
                    uuid,
                    WatchKind::Deploy,
                    watch,
                    interval,
                    cancel,
                )
                .await
            }
            Operation::Undeploy { name, uuid } => {
                Self::execute_watched(
                    directory,
                    &name,
                    uuid,
                    WatchKind::Undeploy,
                    watch,
                    interval,
                    cancel,
                )
                .await
            }
        };

        TaskOutcome {
            function_name,
            title,
            status,
        }
    }

    /// Executes a push: a create or a meta+manifest update.
    async fn execute_push(directory: &Arc<D>, confirmed: ConfirmedOperation) -> TaskStatus {
        match confirmed.change {
            ChangeSet::NewFunction(body) => match directory.create_function(body).await {
                Ok(record) => {
                    info!("Created function '{}' ({})", record.name, record.uuid);
                    TaskStatus::Succeeded
                }
                Err(e) => Self::status_from_error(e),
            },
            ChangeSet::UpdatedFunction {
                uuid,
                meta,
                manifest,
                ..
            } => {
                match directory.update_function_meta(uuid, meta).await {
                    Ok(UpdateReceipt::Applied) => {}
                    Ok(UpdateReceipt::Skipped { message }) => {
                        debug!("Metadata update for '{}' skipped: {message}", confirmed.name);
                    }
                    Err(e) => return Self::status_from_error(e),
                }

                match directory.update_function_manifest(uuid, manifest).await {
                    Ok(UpdateReceipt::Applied) => {
                        info!("Updated function '{}'", confirmed.name);
                        TaskStatus::Succeeded
                    }
                    Ok(UpdateReceipt::Skipped { message }) => TaskStatus::Skipped { message },
                    Err(e) => Self::status_from_error(e),
                }
            }
            ChangeSet::Unchanged => TaskStatus::Skipped {
                message: String::from("nothing to change"),
            },
        }
    }

    /// Executes a pull: copies the remote code and configuration into the
    /// local tree.
    async fn execute_pull(
        directory: &Arc<D>,
        reader: &Arc<P>,
        name: &str,
        uuid: Uuid,
    ) -> TaskStatus {
        let record = match directory.get_by_uuid(uuid).await {
            Ok(record) => record,
            Err(e) => return Self::status_from_error(e),
        };

        let definition = LocalFunctionDefinition {
            name: record.name.clone(),
            description: record.description.clone(),
            event_id: record.event_id.clone(),
            code: record.manifest.code.clone(),
            environment: record.manifest.custom_environment(),
        };

        match reader.write_definition(name, &definition) {
            Ok(()) => {
                info!("Pulled function '{name}'");
                TaskStatus::Succeeded
            }
            Err(e) => Self::status_from_error(e),
        }
    }

    /// Executes a deploy or undeploy, watching until terminal unless
    /// watching is disabled.
    async fn execute_watched(
        directory: Arc<D>,
        name: &str,
        uuid: Uuid,
        kind: WatchKind,
        watch: bool,
        interval: Duration,
        cancel: CancelToken,
    ) -> TaskStatus {
        let initiated = match kind {
            WatchKind::Deploy => directory.deploy(uuid).await,
            WatchKind::Undeploy => directory.undeploy(uuid).await,
        };

        let receipt = match initiated {
            Ok(receipt) => receipt,
            Err(e) => return Self::status_from_error(e),
        };

        if !receipt.message.is_empty() {
            debug!("Platform: {}", receipt.message);
        }

        if !watch {
            return TaskStatus::Succeeded;
        }

        let task = DeploymentTask::new(name, uuid, kind);
        let watcher = StateWatcher::new(directory, cancel).with_interval(interval);

        match watcher.watch(&task).await {
            Ok(WatchResult::Completed) => TaskStatus::Succeeded,
            Ok(WatchResult::Cancelled) => TaskStatus::Skipped {
                message: String::from("cancelled before reaching a terminal state"),
            },
            Err(e) => Self::status_from_error(e),
        }
    }

    /// Maps an error at the task boundary to a terminal status.
    fn status_from_error(error: FuncliftError) -> TaskStatus {
        match error {
            FuncliftError::Platform(PlatformError::DeploymentInFlight { message, .. }) => {
                TaskStatus::Skipped { message }
            }
            other => TaskStatus::Failed {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{
        DeployReceipt, FunctionManifest, FunctionState, MockFunctionDirectory,
        RemoteFunctionRecord,
    };
    use crate::project::{FsProjectReader, CONFIG_FILE};
    use crate::sync::{ConfirmationGate, Prompter, Reconciler};
    use chrono::Utc;
    use mockall::Sequence;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    struct AutoPrompter;

    impl Prompter for AutoPrompter {
        fn confirm(&self, _message: &str) -> crate::error::Result<bool> {
            Ok(true)
        }
    }

    fn record(name: &str, state: FunctionState, deployed: bool) -> RemoteFunctionRecord {
        RemoteFunctionRecord {
            uuid: Uuid::from_u128(1),
            name: name.to_string(),
            description: String::new(),
            event_id: None,
            skills: vec![],
            state,
            manifest: FunctionManifest {
                code: String::from("code"),
                environment: BTreeMap::new(),
                version: 1,
            },
            deployed_at: deployed.then(Utc::now),
        }
    }

    fn create_op(name: &str) -> Operation {
        Operation::Push(ConfirmedOperation {
            name: name.to_string(),
            change: ChangeSet::NewFunction(crate::platform::FunctionCreateBody {
                name: name.to_string(),
                description: String::new(),
                event_id: None,
                state: FunctionState::Draft,
                manifest: FunctionManifest {
                    code: String::from("code"),
                    environment: BTreeMap::new(),
                    version: -1,
                },
            }),
        })
    }

    fn orchestrator(
        directory: MockFunctionDirectory,
        reader: FsProjectReader,
    ) -> TaskOrchestrator<MockFunctionDirectory, FsProjectReader> {
        TaskOrchestrator::new(Arc::new(directory), Arc::new(reader), CancelToken::new())
            .with_poll_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn one_failure_never_affects_siblings() {
        let temp = TempDir::new().expect("Failed to create temp dir");

        let mut directory = MockFunctionDirectory::new();
        directory.expect_create_function().returning(|body| {
            if body.name == "bad" {
                Err(crate::error::PlatformError::Rejected {
                    name: body.name,
                    message: String::from("code does not compile"),
                }
                .into())
            } else {
                Ok(record(&body.name, FunctionState::Draft, false))
            }
        });

        let outcomes = orchestrator(directory, FsProjectReader::new(temp.path()))
            .run(vec![create_op("a"), create_op("bad"), create_op("c")])
            .await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success());
        assert!(outcomes[1].is_failure());
        assert!(outcomes[2].is_success());

        match &outcomes[1].status {
            TaskStatus::Failed { message } => {
                assert!(message.contains("code does not compile"));
            }
            other => panic!("expected failure, got {other}"),
        }
    }

    #[tokio::test]
    async fn in_flight_deploy_resolves_as_skip_without_watching() {
        let temp = TempDir::new().expect("Failed to create temp dir");

        let mut directory = MockFunctionDirectory::new();
        directory.expect_deploy().returning(|uuid| {
            Err(crate::error::PlatformError::DeploymentInFlight {
                name: uuid.to_string(),
                message: String::from("deployment already running"),
            }
            .into())
        });
        // No get_by_uuid expectation: entering the watch loop would panic.

        let outcomes = orchestrator(directory, FsProjectReader::new(temp.path()))
            .run(vec![Operation::Deploy {
                name: String::from("x"),
                uuid: Uuid::from_u128(1),
            }])
            .await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0].status,
            TaskStatus::Skipped {
                message: String::from("deployment already running")
            }
        );
    }

    #[tokio::test]
    async fn unwatched_deploy_resolves_after_the_initiating_call() {
        let temp = TempDir::new().expect("Failed to create temp dir");

        let mut directory = MockFunctionDirectory::new();
        directory.expect_deploy().returning(|uuid| {
            Ok(DeployReceipt {
                message: String::from("deployment started"),
                uuid: Some(uuid),
            })
        });

        let outcomes = orchestrator(directory, FsProjectReader::new(temp.path()))
            .with_watch(false)
            .run(vec![Operation::Deploy {
                name: String::from("x"),
                uuid: Uuid::from_u128(1),
            }])
            .await;

        assert!(outcomes[0].is_success());
    }

    #[tokio::test]
    async fn watched_deploy_resolves_once_productive_with_timestamp() {
        let temp = TempDir::new().expect("Failed to create temp dir");

        let mut directory = MockFunctionDirectory::new();
        let mut seq = Sequence::new();

        directory.expect_deploy().returning(|uuid| {
            Ok(DeployReceipt {
                message: String::new(),
                uuid: Some(uuid),
            })
        });
        directory
            .expect_get_by_uuid()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(record("x", FunctionState::Modified, false)));
        directory
            .expect_get_by_uuid()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(record("x", FunctionState::Productive, true)));

        let outcomes = orchestrator(directory, FsProjectReader::new(temp.path()))
            .run(vec![Operation::Deploy {
                name: String::from("x"),
                uuid: Uuid::from_u128(1),
            }])
            .await;

        assert!(outcomes[0].is_success());
    }

    #[tokio::test]
    async fn pull_writes_the_remote_definition_locally() {
        let temp = TempDir::new().expect("Failed to create temp dir");

        let mut directory = MockFunctionDirectory::new();
        directory.expect_get_by_uuid().returning(|_| {
            let mut rec = record("pulled", FunctionState::Productive, true);
            rec.manifest.code = String::from("remote code");
            rec.manifest.environment.insert(
                String::from(crate::platform::ENV_PLACEHOLDER_KEY),
                String::from(crate::platform::ENV_PLACEHOLDER_VALUE),
            );
            Ok(rec)
        });

        let reader = FsProjectReader::new(temp.path());
        let outcomes = orchestrator(directory, reader)
            .run(vec![Operation::Pull {
                name: String::from("pulled"),
                uuid: Uuid::from_u128(1),
            }])
            .await;

        assert!(outcomes[0].is_success());

        let reader = FsProjectReader::new(temp.path());
        let def = reader
            .read_definition("pulled")
            .expect("pulled definition should load");
        assert_eq!(def.code, "remote code");
        // The platform's placeholder entry never lands in the local tree.
        assert!(def.environment.is_empty());
    }

    #[tokio::test]
    async fn push_scenario_updates_changed_and_creates_missing() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        for (name, code) in [("a", "same"), ("b", "local"), ("c", "new")] {
            let folder = temp.path().join(name);
            std::fs::create_dir_all(&folder).expect("Failed to create folder");
            std::fs::write(folder.join(CONFIG_FILE), format!("name: {name}\n"))
                .expect("Failed to write config");
            std::fs::write(folder.join("index.js"), code).expect("Failed to write code");
        }

        let mut directory = MockFunctionDirectory::new();
        directory.expect_list_by_names().returning(|_| {
            let mut a = record("a", FunctionState::Productive, true);
            a.manifest.code = String::from("same");
            let mut b = record("b", FunctionState::Productive, true);
            b.manifest.code = String::from("remote");
            Ok(vec![a, b])
        });
        directory
            .expect_update_function_meta()
            .times(1)
            .returning(|_, _| Ok(UpdateReceipt::Applied));
        directory
            .expect_update_function_manifest()
            .times(1)
            .returning(|_, _| Ok(UpdateReceipt::Applied));
        directory
            .expect_create_function()
            .times(1)
            .withf(|body| body.name == "c")
            .returning(|body| Ok(record(&body.name, FunctionState::Draft, false)));

        let reader = FsProjectReader::new(temp.path());
        let reconciler = Reconciler::new(&directory, &reader);
        let report = reconciler
            .reconcile(&[], true)
            .await
            .expect("reconcile should succeed");

        let prompter = AutoPrompter;
        let gate = ConfirmationGate::new(&prompter);
        let approved = gate
            .confirm(report.changed(), true)
            .expect("confirm should succeed");
        assert_eq!(approved.len(), 2);

        let operations: Vec<Operation> = approved.into_iter().map(Operation::Push).collect();
        let outcomes = orchestrator(directory, FsProjectReader::new(temp.path()))
            .run(operations)
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(TaskOutcome::is_success));
        assert!(!outcomes.iter().any(|o| o.function_name == "a"));
    }
}
