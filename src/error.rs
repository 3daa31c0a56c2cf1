//! Error handling module for the provisioner
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Every error maps to a process exit code and a severity tag so the
//! invoking terminal always sees a clear, tagged diagnostic.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Severity;

/// Main error type for the provisioner
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Live run attempted without elevated privileges
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Host OS is not a supported family and the operator declined to continue
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// A required application artifact is absent
    #[error("Missing artifact: {} not found", path.display())]
    MissingArtifact { path: PathBuf },

    /// Operator declined a gating prompt (graceful exit)
    #[error("Aborted by user; no changes were made")]
    PromptAbort,

    /// External command exited unsuccessfully
    #[error("Command `{command}` failed (exit code {code}): {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provisioning stage transition errors
    #[error("Stage error: {0}")]
    Stage(String),

    /// Terminal prompt could not be shown or read
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors bubbled up from anyhow-based internals
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

impl ProvisionError {
    /// Create a permission error
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create an unsupported platform error
    pub fn unsupported_platform(msg: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(msg.into())
    }

    /// Create a missing artifact error
    pub fn missing_artifact(path: impl Into<PathBuf>) -> Self {
        Self::MissingArtifact { path: path.into() }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a stage transition error
    pub fn stage(msg: impl Into<String>) -> Self {
        Self::Stage(msg.into())
    }

    /// Process exit code for this error. A user abort is not a failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PromptAbort => 0,
            _ => 1,
        }
    }

    /// Severity tag used when surfacing this error on the terminal
    pub fn severity(&self) -> Severity {
        match self {
            Self::PromptAbort => Severity::Info,
            _ => Severity::Error,
        }
    }
}
