//! Metadata and configuration for the extension manager.
//!
//! This crate owns the on-disk formats the manager consumes: the per-extension
//! `<name>.info.toml` files and the workspace-level `extm.toml`.

pub mod config;
pub mod error;
pub mod loader;
pub mod schema;

/// Suffix every extension info file carries.
pub const INFO_SUFFIX: &str = ".info.toml";

pub use config::{CoreConfig, WorkspaceConfig, load_config};
pub use error::{Error, Result};
pub use loader::InfoLoader;
pub use schema::{ExtensionInfo, ExtensionType, HookCommands, validate_machine_name};
