//! Function platform integration.
//!
//! This module contains the HTTP client for the platform API, the remote
//! data model, and the `FunctionDirectory` contract consumed by the
//! synchronization core.

mod client;
mod directory;
mod types;

pub use client::PlatformClient;
pub use directory::{FunctionDirectory, PlatformDirectory};
pub use types::{
    DeployReceipt, FunctionCreateBody, FunctionManifest, FunctionManifestPatch, FunctionMetaPatch,
    FunctionState, RemoteFunctionRecord, UpdateReceipt, ENV_PLACEHOLDER_KEY,
    ENV_PLACEHOLDER_VALUE, NEVER_DEPLOYED_VERSION,
};

#[cfg(test)]
pub use directory::MockFunctionDirectory;
