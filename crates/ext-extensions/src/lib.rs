//! Extension catalog and dependency resolution.
//!
//! This crate turns declared extension metadata into ordered plans:
//!
//! - [`catalog`]: the read-only view over every known extension
//! - [`dependency`] and [`version`]: dependency declarations and their
//!   version constraints
//! - [`graph`]: closure of dependencies (install) or enabled dependents
//!   (uninstall) for a requested batch
//! - [`resolver`]: deterministic topological ordering with cycle detection
//! - [`validator`]: pluggable vetoes consulted before an uninstall commits
//!
//! # Example
//!
//! ```
//! use ext_extensions::{ExtensionCatalog, ExtensionRecord, GraphBuilder, TopologicalResolver};
//!
//! let mut catalog = ExtensionCatalog::new();
//! catalog.insert(ExtensionRecord::module("help"));
//! catalog.insert(ExtensionRecord::module("config").with_dependencies(&["help"]).unwrap());
//! catalog.insert(ExtensionRecord::module("color").with_dependencies(&["config"]).unwrap());
//!
//! let graph = GraphBuilder::new(&catalog).install_graph(&["color"]).unwrap();
//! let plan = TopologicalResolver.resolve_install_order(&graph).unwrap();
//! assert_eq!(plan.order(), ["help", "config", "color"]);
//! ```

pub mod catalog;
pub mod dependency;
pub mod error;
pub mod graph;
pub mod resolver;
pub mod validator;
pub mod version;

pub use catalog::{ExtensionCatalog, ExtensionKind, ExtensionRecord};
pub use dependency::Dependency;
pub use error::{Error, Result};
pub use graph::{DependencyGraph, GraphBuilder, GraphNode};
pub use resolver::{Direction, ResolutionPlan, TopologicalResolver};
pub use validator::{
    ProfileValidator, RequiredValidator, UninstallValidator, UninstallValidatorRegistry,
    UninstallVeto, ValidationContext, describe_vetoes,
};
pub use version::VersionConstraint;
