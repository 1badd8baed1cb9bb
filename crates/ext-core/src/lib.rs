//! Installation orchestration for the extension manager
//!
//! This crate sits above the catalog and resolver and owns everything with
//! side effects:
//!
//! - **State**: the persisted enabled set, schema versions and weight
//!   overrides ([`PersistedExtensionState`])
//! - **Hooks**: per-extension install and uninstall callbacks
//!   ([`ExtensionHooks`], [`HookRegistry`], [`ShellHooks`])
//! - **Orchestrator**: planning, validation and ordered execution of
//!   batches ([`InstallationOrchestrator`])
//! - **Workspace**: bootstrapping all of the above from a root directory
//!
//! ```text
//!                    ext-cli
//!                       |
//!                   ext-core
//!                       |
//!                ext-extensions
//!                       |
//!           ext-meta ------ ext-fs
//! ```
//!
//! # Example
//!
//! ```
//! use ext_core::{InstallationOrchestrator, PersistedExtensionState};
//! use ext_extensions::{ExtensionCatalog, ExtensionRecord};
//!
//! let mut catalog = ExtensionCatalog::new();
//! catalog.insert(ExtensionRecord::module("help"));
//! catalog.insert(ExtensionRecord::module("config").with_dependencies(&["help"]).unwrap());
//!
//! let mut orchestrator =
//!     InstallationOrchestrator::new(catalog, PersistedExtensionState::in_memory());
//! let report = orchestrator.install(&["config"]).unwrap();
//! assert_eq!(report.executed, ["help", "config"]);
//! assert!(orchestrator.is_enabled("help"));
//! ```

pub mod error;
pub mod hooks;
pub mod installer;
pub mod state;
pub mod workspace;

pub use error::{Error, Result};
pub use hooks::{ExtensionHooks, HookError, HookRegistry, NoopHooks, ShellHooks};
pub use installer::{BatchReport, InstallOptions, InstallationOrchestrator, Phase, UninstallOptions};
pub use state::{PersistedExtensionState, SCHEMA_UNINSTALLED, StateEntry};
pub use workspace::Workspace;
