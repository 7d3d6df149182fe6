//! Local project access.
//!
//! This module contains the on-disk function folder model and the
//! `ProjectReader` contract consumed by the synchronization core.

mod reader;
mod types;

pub use reader::{FsProjectReader, ProjectReader};
pub use types::{FunctionConfig, LocalFunctionDefinition, CONFIG_FILE, DEFAULT_ENTRY};
