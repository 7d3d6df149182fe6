//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Funclift - serverless function synchronization and deployment.
#[derive(Parser, Debug)]
#[command(name = "funclift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project root containing the function folders.
    #[arg(short, long, global = true, env = "FUNCLIFT_PROJECT")]
    pub project: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Push local functions to the platform (create or update).
    Push {
        /// Function names (defaults to the function folder you are in).
        names: Vec<String>,

        /// Push every function folder in the project.
        #[arg(short, long)]
        all: bool,

        /// Skip confirmation prompts.
        #[arg(short, long)]
        yes: bool,
    },

    /// Pull remote functions into the local tree.
    Pull {
        /// Function names (defaults to the function folder you are in).
        names: Vec<String>,

        /// Pull every function on the platform.
        #[arg(short, long)]
        all: bool,

        /// Skip overwrite confirmation prompts.
        #[arg(short, long)]
        yes: bool,
    },

    /// Deploy functions on the platform.
    Deploy {
        /// Function names (defaults to the function folder you are in).
        names: Vec<String>,

        /// Deploy every function folder in the project.
        #[arg(short, long)]
        all: bool,

        /// Skip confirmation prompts.
        #[arg(short, long)]
        yes: bool,

        /// Return as soon as the deployment is initiated.
        #[arg(long)]
        no_watch: bool,
    },

    /// Undeploy functions on the platform.
    Undeploy {
        /// Function names (defaults to the function folder you are in).
        names: Vec<String>,

        /// Undeploy every function folder in the project.
        #[arg(short, long)]
        all: bool,

        /// Skip confirmation prompts.
        #[arg(short, long)]
        yes: bool,

        /// Return as soon as the undeployment is initiated.
        #[arg(long)]
        no_watch: bool,
    },

    /// Show the functions on the platform and their states.
    Status,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
