//! Error types for the funclift synchronization system.
//!
//! This module provides the error hierarchy for all operations in the
//! function lifecycle: local project access, platform API calls, and
//! reconciliation.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the funclift synchronization system.
#[derive(Debug, Error)]
pub enum FuncliftError {
    /// Local project errors.
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    /// Function platform API errors.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Reconciliation errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Local project errors.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The function folder does not exist.
    #[error("Function folder not found: {path}")]
    FolderNotFound {
        /// Path to the missing folder.
        path: PathBuf,
    },

    /// The function configuration file is missing.
    #[error("Function configuration not found: {path}")]
    ConfigNotFound {
        /// Path to the missing configuration file.
        path: PathBuf,
    },

    /// The function configuration could not be parsed.
    #[error("Failed to parse configuration for '{name}': {message}")]
    ParseError {
        /// Name of the affected function.
        name: String,
        /// Description of the parse error.
        message: String,
    },

    /// The function code file is missing.
    #[error("Function code file not found: {path}")]
    CodeFileNotFound {
        /// Path to the missing code file.
        path: PathBuf,
    },

    /// The current directory is not inside a function folder.
    #[error("Not inside a function folder: {path} (pass function names or --all)")]
    NotInFunctionFolder {
        /// The directory that was inspected.
        path: PathBuf,
    },

    /// No function folders were found under the project root.
    #[error("No function folders found under: {path}")]
    NoFunctionsFound {
        /// The project root that was scanned.
        path: PathBuf,
    },

    /// Environment variable is missing.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },
}

/// Function platform API errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Authentication failed.
    #[error("Platform authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed.
    #[error("Platform API request failed: {status} - {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Rate limited.
    #[error("Platform API rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Function not found on the platform.
    #[error("Function not found on platform: {name}")]
    FunctionNotFound {
        /// Name or uuid of the missing function.
        name: String,
    },

    /// A deployment or undeployment is already running for the function.
    #[error("Deployment already in progress for '{name}': {message}")]
    DeploymentInFlight {
        /// Name of the affected function.
        name: String,
        /// Message reported by the platform.
        message: String,
    },

    /// The platform rejected the submitted function as invalid.
    #[error("Platform rejected '{name}': {message}")]
    Rejected {
        /// Name of the affected function.
        name: String,
        /// Validation message from the platform.
        message: String,
    },

    /// Network error.
    #[error("Network error communicating with platform: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid response from platform API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Change computation failed for a specific function.
    #[error("Failed to reconcile function '{name}': {reason}")]
    FunctionReconcileFailed {
        /// Name of the function.
        name: String,
        /// Reason for failure.
        reason: String,
    },

    /// Reconciliation was aborted before any task ran.
    #[error("Reconciliation aborted: {reason}")]
    Aborted {
        /// Reason for abort.
        reason: String,
    },
}

/// Result type alias for funclift operations.
pub type Result<T> = std::result::Result<T, FuncliftError>;

impl FuncliftError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Platform(PlatformError::RateLimited { .. } | PlatformError::NetworkError { .. })
        )
    }

    /// Returns the suggested retry delay in seconds, if applicable.
    #[must_use]
    pub const fn retry_delay_secs(&self) -> Option<u64> {
        match self {
            Self::Platform(PlatformError::RateLimited { retry_after_secs }) => {
                Some(*retry_after_secs)
            }
            Self::Platform(PlatformError::NetworkError { .. }) => Some(5),
            _ => None,
        }
    }

    /// Returns true if this error should resolve a task as a skip rather
    /// than a failure.
    #[must_use]
    pub const fn is_task_skip(&self) -> bool {
        matches!(
            self,
            Self::Platform(PlatformError::DeploymentInFlight { .. })
        )
    }
}

impl ProjectError {
    /// Creates a parse error for a specific function.
    #[must_use]
    pub fn parse(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl PlatformError {
    /// Creates an API request error.
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates a not-found error for a function name or uuid.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::FunctionNotFound { name: name.into() }
    }
}
