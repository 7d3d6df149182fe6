// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Funclift
//!
//! Synchronize, reconcile, and deploy serverless functions against a remote
//! function platform.
//!
//! ## Overview
//!
//! Funclift manages the lifecycle of user-authored functions hosted on a
//! remote platform:
//!
//! - Diff local function folders against the platform's records
//! - Push new and modified functions, pull remote ones into the local tree
//! - Deploy and undeploy functions, watching until they converge
//! - Tolerate partial failure across a batch of functions
//!
//! ## Architecture
//!
//! Every command invocation runs the same pipeline:
//!
//! 1. **Reconcile**: compare local definitions with remote records
//! 2. **Confirm**: filter the candidate changes down to the approved set
//! 3. **Orchestrate**: execute approved operations concurrently, polling
//!    asynchronous deployments until they reach a terminal state
//!
//! ## Modules
//!
//! - [`project`]: local function folders and the `ProjectReader` contract
//! - [`platform`]: platform API client and the `FunctionDirectory` contract
//! - [`sync`]: change computation and the confirmation gate
//! - [`orchestrator`]: concurrent task execution and state watching
//! - [`cli`]: command-line interface
//!
//! ## Example
//!
//! ```yaml
//! # my-project/greeter/function.yaml
//! name: greeter
//! description: greets whoever triggers it
//! event: user.created
//! env:
//!   GREETING: hello
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod error;
pub mod orchestrator;
pub mod platform;
pub mod project;
pub mod sync;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter, StdinPrompter};
pub use error::{FuncliftError, Result};
pub use orchestrator::{
    CancelToken, DeploymentTask, Operation, StateWatcher, TaskOrchestrator, TaskOutcome,
    TaskStatus, WatchKind, WatchResult,
};
pub use platform::{
    FunctionDirectory, FunctionState, PlatformClient, PlatformDirectory, RemoteFunctionRecord,
};
pub use project::{FsProjectReader, LocalFunctionDefinition, ProjectReader};
pub use sync::{ChangeSet, ConfirmationGate, ConfirmedOperation, Prompter, ReconcileReport, Reconciler};
