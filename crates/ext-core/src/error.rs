//! Error types for ext-core

use std::path::PathBuf;

use ext_extensions::{Direction, UninstallVeto, describe_vetoes};

/// Result type for ext-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or executing a batch
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more uninstall validators objected; nothing was executed
    #[error("{}", describe_vetoes(.vetoes))]
    UninstallVetoed { vetoes: Vec<UninstallVeto> },

    /// Uninstall without dependents requested while dependents are enabled
    #[error("Cannot uninstall '{module}': enabled dependents {}", .dependents.join(", "))]
    DependentsEnabled {
        module: String,
        dependents: Vec<String>,
    },

    /// A hook failed; `completed` lists the extensions committed before it
    #[error("{phase} hook failed for '{module}': {reason}")]
    HookFailed {
        module: String,
        phase: Direction,
        reason: String,
        completed: Vec<String>,
    },

    /// A hook succeeded but its state change could not be saved;
    /// `completed` lists the extensions committed before it
    #[error("Failed to record {phase} of '{module}': {source}")]
    StateCommitFailed {
        module: String,
        phase: Direction,
        completed: Vec<String>,
        #[source]
        source: Box<Error>,
    },

    /// State file exists but cannot be used
    #[error("Invalid state file {path}: {message}")]
    InvalidState { path: PathBuf, message: String },

    // Transparent wrappers for underlying crate errors
    /// Catalog or resolution error from ext-extensions
    #[error(transparent)]
    Extensions(#[from] ext_extensions::Error),

    /// Metadata error from ext-meta
    #[error(transparent)]
    Meta(#[from] ext_meta::Error),

    /// Filesystem error from ext-fs
    #[error(transparent)]
    Fs(#[from] ext_fs::Error),
}

impl Error {
    /// Extensions committed before an execution failure; empty for other
    /// errors.
    pub fn completed(&self) -> &[String] {
        match self {
            Error::HookFailed { completed, .. } | Error::StateCommitFailed { completed, .. } => {
                completed
            }
            _ => &[],
        }
    }
}
