//! Funclift CLI entrypoint.
//!
//! This is the main entrypoint for the funclift command-line tool.

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;

use funclift::cli::{Cli, Commands, OutputFormatter, StdinPrompter};
use funclift::error::{FuncliftError, PlatformError, ProjectError, Result};
use funclift::orchestrator::{CancelToken, Operation, TaskOrchestrator, WatchKind};
use funclift::platform::{FunctionDirectory, PlatformClient, PlatformDirectory};
use funclift::project::{FsProjectReader, ProjectReader};
use funclift::sync::{ConfirmationGate, Prompter, Reconciler};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Default platform API base URL.
const DEFAULT_API_URL: &str = "https://api.funclift.io/v1";

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let _ = dotenvy::dotenv();

    let formatter = OutputFormatter::new(cli.output);
    let reader = Arc::new(FsProjectReader::discover(cli.project.as_deref())?);
    let directory = Arc::new(create_directory()?);

    // One token for the whole invocation; Ctrl-C stops every watcher.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nInterrupted, stopping watchers...");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Commands::Push { names, all, yes } => {
            cmd_push(&directory, &reader, &cancel, &formatter, &names, all, yes).await
        }
        Commands::Pull { names, all, yes } => {
            cmd_pull(&directory, &reader, &cancel, &formatter, &names, all, yes).await
        }
        Commands::Deploy {
            names,
            all,
            yes,
            no_watch,
        } => {
            cmd_deployment(
                &directory,
                &reader,
                &cancel,
                &formatter,
                &names,
                DeploymentArgs {
                    all,
                    yes,
                    no_watch,
                    kind: WatchKind::Deploy,
                },
            )
            .await
        }
        Commands::Undeploy {
            names,
            all,
            yes,
            no_watch,
        } => {
            cmd_deployment(
                &directory,
                &reader,
                &cancel,
                &formatter,
                &names,
                DeploymentArgs {
                    all,
                    yes,
                    no_watch,
                    kind: WatchKind::Undeploy,
                },
            )
            .await
        }
        Commands::Status => cmd_status(&directory, &formatter).await,
    }
}

/// Flags for a deploy or undeploy invocation.
struct DeploymentArgs {
    /// Target every function folder in the project.
    all: bool,
    /// Skip confirmation prompts.
    yes: bool,
    /// Return as soon as the operation is initiated.
    no_watch: bool,
    /// Direction of the operation.
    kind: WatchKind,
}

/// Push local functions to the platform.
async fn cmd_push(
    directory: &Arc<PlatformDirectory>,
    reader: &Arc<FsProjectReader>,
    cancel: &CancelToken,
    formatter: &OutputFormatter,
    names: &[String],
    all: bool,
    yes: bool,
) -> Result<()> {
    let reconciler = Reconciler::new(directory.as_ref(), reader.as_ref());
    let report = reconciler.reconcile(names, all).await?;

    eprintln!("{}", formatter.format_report(&report));

    let candidates = report.changed();
    if candidates.is_empty() {
        eprintln!("Nothing to push.");
        return Ok(());
    }

    let prompter = StdinPrompter;
    let gate = ConfirmationGate::new(&prompter);
    let approved = gate.confirm(candidates, yes)?;

    if approved.is_empty() {
        eprintln!("Nothing to do.");
        return Ok(());
    }

    let operations: Vec<Operation> = approved.into_iter().map(Operation::Push).collect();
    run_operations(directory, reader, cancel, formatter, operations, true).await
}

/// Pull remote functions into the local tree.
async fn cmd_pull(
    directory: &Arc<PlatformDirectory>,
    reader: &Arc<FsProjectReader>,
    cancel: &CancelToken,
    formatter: &OutputFormatter,
    names: &[String],
    all: bool,
    yes: bool,
) -> Result<()> {
    let targets: Vec<(String, Uuid)> = if all {
        directory
            .list_all()
            .await?
            .into_iter()
            .map(|r| (r.name, r.uuid))
            .collect()
    } else {
        let requested = reader.resolve_targets(names, false)?;
        resolve_remote_targets(directory.as_ref(), &requested).await?
    };

    if targets.is_empty() {
        eprintln!("Nothing to pull.");
        return Ok(());
    }

    let prompter = StdinPrompter;
    let mut operations = Vec::new();

    for (name, uuid) in targets {
        let message = format!("Overwrite local '{name}' with the platform record?");
        if yes || prompter.confirm(&message)? {
            operations.push(Operation::Pull { name, uuid });
        }
    }

    if operations.is_empty() {
        eprintln!("Nothing to do.");
        return Ok(());
    }

    run_operations(directory, reader, cancel, formatter, operations, true).await
}

/// Deploy or undeploy functions.
async fn cmd_deployment(
    directory: &Arc<PlatformDirectory>,
    reader: &Arc<FsProjectReader>,
    cancel: &CancelToken,
    formatter: &OutputFormatter,
    names: &[String],
    args: DeploymentArgs,
) -> Result<()> {
    let requested = reader.resolve_targets(names, args.all)?;

    // A missing remote record aborts the whole batch before any task runs.
    let targets = resolve_remote_targets(directory.as_ref(), &requested).await?;

    let verb = match args.kind {
        WatchKind::Deploy => "Deploy",
        WatchKind::Undeploy => "Undeploy",
    };

    let prompter = StdinPrompter;
    let mut operations = Vec::new();

    for (name, uuid) in targets {
        if !args.yes && !prompter.confirm(&format!("{verb} '{name}'?"))? {
            debug!("User declined {verb} for '{name}'");
            continue;
        }

        operations.push(match args.kind {
            WatchKind::Deploy => Operation::Deploy { name, uuid },
            WatchKind::Undeploy => Operation::Undeploy { name, uuid },
        });
    }

    if operations.is_empty() {
        eprintln!("Nothing to do.");
        return Ok(());
    }

    run_operations(
        directory,
        reader,
        cancel,
        formatter,
        operations,
        !args.no_watch,
    )
    .await
}

/// Show the functions on the platform.
async fn cmd_status(
    directory: &Arc<PlatformDirectory>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let records = directory.list_all().await?;
    eprintln!("{}", formatter.format_status(&records));
    Ok(())
}

/// Executes operations through the orchestrator and prints the outcomes.
async fn run_operations(
    directory: &Arc<PlatformDirectory>,
    reader: &Arc<FsProjectReader>,
    cancel: &CancelToken,
    formatter: &OutputFormatter,
    operations: Vec<Operation>,
    watch: bool,
) -> Result<()> {
    for operation in &operations {
        eprintln!("{}", operation.title());
    }

    let orchestrator =
        TaskOrchestrator::new(Arc::clone(directory), Arc::clone(reader), cancel.clone())
            .with_watch(watch);

    let outcomes = orchestrator.run(operations).await;
    eprintln!("{}", formatter.format_outcomes(&outcomes));

    Ok(())
}

/// Maps requested names to remote uuids, failing on the first name with no
/// remote record.
async fn resolve_remote_targets(
    directory: &PlatformDirectory,
    names: &[String],
) -> Result<Vec<(String, Uuid)>> {
    let records = directory.list_by_names(names.to_vec()).await?;
    let by_name: HashMap<&str, Uuid> = records.iter().map(|r| (r.name.as_str(), r.uuid)).collect();

    names
        .iter()
        .map(|name| {
            by_name
                .get(name.as_str())
                .map(|uuid| (name.clone(), *uuid))
                .ok_or_else(|| FuncliftError::Platform(PlatformError::not_found(name.clone())))
        })
        .collect()
}

/// Creates the platform directory from environment credentials.
fn create_directory() -> Result<PlatformDirectory> {
    let base_url =
        std::env::var("FUNCLIFT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let api_token = std::env::var("FUNCLIFT_API_TOKEN").map_err(|_| {
        FuncliftError::Project(ProjectError::MissingEnvVar {
            name: String::from("FUNCLIFT_API_TOKEN"),
        })
    })?;

    let client = PlatformClient::new(&base_url, &api_token)?;
    Ok(PlatformDirectory::new(client))
}
