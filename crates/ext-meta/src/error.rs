//! Error types for ext-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] ext_fs::Error),

    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Config file too large: {path} is {size} bytes (max {max})")]
    ConfigTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Invalid extension name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Info file {path} declares name '{declared}' but is named for '{expected}'")]
    NameMismatch {
        path: PathBuf,
        declared: String,
        expected: String,
    },

    #[error("Duplicate extension '{name}' in {first} and {second}")]
    DuplicateExtension {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid extension type: {value}")]
    InvalidType { value: String },
}
