//! Reference catalog fixtures.

use ext_extensions::{ExtensionCatalog, ExtensionKind, ExtensionRecord};

/// A module declaring `deps`.
///
/// # Panics
/// Panics if a dependency string is malformed.
pub fn module(name: &str, deps: &[&str]) -> ExtensionRecord {
    ExtensionRecord::module(name)
        .with_dependencies(deps)
        .unwrap_or_else(|e| panic!("bad fixture dependencies for {name}: {e}"))
}

/// An installation profile declaring `deps` and installing `installs`.
pub fn profile(name: &str, deps: &[&str], installs: &[&str]) -> ExtensionRecord {
    let mut record = ExtensionRecord::new(name, ExtensionKind::Profile)
        .with_dependencies(deps)
        .unwrap_or_else(|e| panic!("bad fixture dependencies for {name}: {e}"));
    record.install = installs.iter().map(|s| s.to_string()).collect();
    record
}

/// The module set the scenario tests share:
///
/// ```text
/// system (required)
///   ban, path_alias -> system
/// help
///   config -> help
///     color -> config
///   entity_test -> help
/// standard (profile) -> help, installs ban
/// ```
pub fn reference_catalog() -> ExtensionCatalog {
    let mut catalog = ExtensionCatalog::new();

    let mut system = module("system", &[]);
    system.required = true;
    catalog.insert(system);

    catalog.insert(module("ban", &["system"]));
    catalog.insert(module("path_alias", &["system"]));
    catalog.insert(module("help", &[]));
    catalog.insert(module("config", &["help"]));
    catalog.insert(module("color", &["config"]));
    catalog.insert(module("entity_test", &["help"]));
    catalog.insert(profile("standard", &["help"], &["ban"]));
    catalog
}
