//! Function platform API types and data structures.
//!
//! This module defines the types used for communication with the function
//! platform API: remote function records, their lifecycle states, and the
//! request bodies submitted by push operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Manifest version sentinel for functions that have never been deployed.
pub const NEVER_DEPLOYED_VERSION: i64 = -1;

/// Environment variable key the platform seeds into fresh functions.
pub const ENV_PLACEHOLDER_KEY: &str = "SAMPLE_KEY";

/// Environment variable value the platform seeds into fresh functions.
pub const ENV_PLACEHOLDER_VALUE: &str = "SAMPLE_VALUE";

/// A function record as stored on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFunctionRecord {
    /// Unique function identifier assigned by the platform.
    pub uuid: Uuid,
    /// Function name, unique per account.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Event the function is subscribed to.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Skills granted to the function at runtime.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Current lifecycle state.
    #[serde(default)]
    pub state: FunctionState,
    /// Current manifest (code, environment, version).
    pub manifest: FunctionManifest,
    /// Timestamp of the last completed deployment.
    #[serde(default)]
    pub deployed_at: Option<DateTime<Utc>>,
}

/// The deployable content of a function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionManifest {
    /// Function source code.
    #[serde(default)]
    pub code: String,
    /// Environment variables baked into the function.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// Server-assigned manifest version; `-1` means never deployed.
    #[serde(default = "never_deployed")]
    pub version: i64,
}

/// Lifecycle state of a remote function.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionState {
    /// Never deployed, or fully undeployed.
    #[default]
    Draft,
    /// Deployed, but with undeployed local changes.
    Modified,
    /// Deployed and unchanged since.
    Productive,
}

/// Request body for creating a new function.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCreateBody {
    /// Function name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Event the function subscribes to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Initial lifecycle state (always `Draft` for new functions).
    pub state: FunctionState,
    /// Initial manifest with the never-deployed version sentinel.
    pub manifest: FunctionManifest,
}

/// Partial metadata update for an existing function.
///
/// Unchanged fields are omitted from the submitted body.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionMetaPatch {
    /// New description, if it changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New event subscription, if it changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// New lifecycle state label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<FunctionState>,
}

/// Partial manifest update for an existing function.
///
/// Only fields that actually changed are submitted; the version is echoed
/// back so the server can detect concurrent edits and assign the increment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionManifestPatch {
    /// New code, if it changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// New environment, if it changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<BTreeMap<String, String>>,
    /// The manifest version this patch was computed against.
    pub version: i64,
}

/// Receipt for a metadata or manifest update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateReceipt {
    /// The update was applied.
    Applied,
    /// The platform skipped the update.
    Skipped {
        /// Message reported by the platform.
        message: String,
    },
}

/// Receipt for a deploy or undeploy call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReceipt {
    /// Message reported by the platform.
    #[serde(default)]
    pub message: String,
    /// Uuid of the deployment job, when the platform reports one.
    #[serde(default)]
    pub uuid: Option<Uuid>,
}

const fn never_deployed() -> i64 {
    NEVER_DEPLOYED_VERSION
}

impl RemoteFunctionRecord {
    /// Returns true if this function has ever completed a deployment.
    #[must_use]
    pub const fn is_deployed(&self) -> bool {
        self.deployed_at.is_some()
    }
}

impl FunctionManifest {
    /// Returns the environment with the platform's placeholder entry
    /// removed.
    ///
    /// A manifest whose environment consists of exactly the seeded sample
    /// entry carries no custom environment at all.
    #[must_use]
    pub fn custom_environment(&self) -> BTreeMap<String, String> {
        self.environment
            .iter()
            .filter(|(key, value)| {
                !(key.as_str() == ENV_PLACEHOLDER_KEY && value.as_str() == ENV_PLACEHOLDER_VALUE)
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl std::fmt::Display for FunctionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Modified => "modified",
            Self::Productive => "productive",
        };
        write!(f, "{s}")
    }
}
