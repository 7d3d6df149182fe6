//! Local function definition types.
//!
//! This module defines the structs that map to a function folder on disk:
//! the `function.yaml` configuration file and the assembled in-memory
//! definition the synchronization core works with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the per-function configuration file.
pub const CONFIG_FILE: &str = "function.yaml";

/// Default code file name when the configuration does not name one.
pub const DEFAULT_ENTRY: &str = "index.js";

/// The `function.yaml` configuration for a single function folder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionConfig {
    /// Function name, unique per project.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Event the function subscribes to.
    #[serde(default)]
    pub event: Option<String>,
    /// Code file name relative to the function folder.
    #[serde(default)]
    pub entry: Option<String>,
    /// Environment variables for the function.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// A fully assembled local function definition.
///
/// Read fresh from disk at the start of every invocation; the
/// synchronization core never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFunctionDefinition {
    /// Function name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Event the function subscribes to.
    pub event_id: Option<String>,
    /// Function source code.
    pub code: String,
    /// Environment variables for the function.
    pub environment: BTreeMap<String, String>,
}

impl FunctionConfig {
    /// Returns the code file name for this function.
    #[must_use]
    pub fn entry_file(&self) -> &str {
        self.entry.as_deref().unwrap_or(DEFAULT_ENTRY)
    }
}

impl LocalFunctionDefinition {
    /// Assembles a definition from a parsed configuration and code.
    #[must_use]
    pub fn from_parts(config: FunctionConfig, code: String) -> Self {
        Self {
            name: config.name,
            description: config.description,
            event_id: config.event,
            code,
            environment: config.env,
        }
    }
}
