//! Filesystem primitives for the extension manager
//!
//! Provides atomic, lock-guarded writes and a format-agnostic store for the
//! TOML/JSON documents the manager reads and persists.

pub mod config;
pub mod error;
pub mod io;

pub use config::ConfigStore;
pub use error::{Error, Result};
