//! Scenario tests for the module handler
//!
//! Each test drives the orchestrator over the shared reference catalog and
//! asserts both the hook call order and the persisted state afterwards.

use ext_core::{
    Error, HookRegistry, InstallOptions, InstallationOrchestrator, PersistedExtensionState, Phase,
    SCHEMA_UNINSTALLED, Workspace,
};
use ext_extensions::{Direction, ExtensionCatalog, ExtensionRecord, UninstallValidatorRegistry};
use ext_test_utils::catalog::{module, reference_catalog};
use ext_test_utils::hooks::RecordingHooks;
use ext_test_utils::validators::StoredContentValidator;
use ext_test_utils::workspace::TestWorkspace;
use pretty_assertions::assert_eq;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn orchestrator_with(hooks: &RecordingHooks) -> InstallationOrchestrator {
    InstallationOrchestrator::new(reference_catalog(), PersistedExtensionState::in_memory())
        .with_hooks(HookRegistry::new().with_default(hooks.clone()))
}

/// The reference catalog with `help` closing the loop back to `color`.
fn cyclic_catalog() -> ExtensionCatalog {
    let mut catalog = reference_catalog();
    catalog.insert(module("help", &["color"]));
    catalog
}

fn assert_cycle(err: &Error, expected: &[&str]) {
    match err {
        Error::Extensions(ext_extensions::Error::CycleDetected { members }) => {
            assert_eq!(members, expected);
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

fn assert_installed(orch: &InstallationOrchestrator, names: &[&str]) {
    for name in names {
        assert!(orch.is_enabled(name), "{name} should be enabled");
        assert_ne!(orch.schema_version(name), SCHEMA_UNINSTALLED, "{name} schema");
    }
}

fn assert_uninstalled(orch: &InstallationOrchestrator, names: &[&str]) {
    for name in names {
        assert!(!orch.is_enabled(name), "{name} should not be enabled");
        assert_eq!(orch.schema_version(name), SCHEMA_UNINSTALLED, "{name} schema");
    }
}

// =============================================================================
// Install
// =============================================================================

#[test]
fn test_install_pulls_in_dependencies_in_order() {
    let hooks = RecordingHooks::new();
    let mut orch = orchestrator_with(&hooks);

    let report = orch.install(&["color"]).unwrap();

    assert_eq!(hooks.names(Direction::Install), vec!["help", "config", "color"]);
    assert_eq!(report.plan.order(), ["help", "config", "color"]);
    assert_installed(&orch, &["help", "config", "color"]);
}

#[test]
fn test_install_missing_dependency_changes_nothing() {
    let hooks = RecordingHooks::new();
    let mut catalog = reference_catalog();
    catalog.insert(module("config", &["foo"]));
    let mut orch = InstallationOrchestrator::new(catalog, PersistedExtensionState::in_memory())
        .with_hooks(HookRegistry::new().with_default(hooks.clone()));

    let err = orch.install(&["color"]).unwrap_err();
    assert!(
        matches!(err, Error::Extensions(ext_extensions::Error::MissingDependency { ref missing, .. }) if missing == "foo"),
        "got {err:?}"
    );
    assert!(hooks.calls().is_empty());
    assert_uninstalled(&orch, &["help", "config", "color"]);
}

#[test]
fn test_install_version_dependency() {
    let mut catalog = reference_catalog();
    catalog.insert(ExtensionRecord::module("help").with_version("8.x-1.4").unwrap());
    catalog.insert(module("config", &["drupal:help (>=1.0, <2.0)"]));
    let mut orch = InstallationOrchestrator::new(catalog.clone(), PersistedExtensionState::in_memory());
    orch.install(&["color"]).unwrap();
    assert_installed(&orch, &["help", "config", "color"]);

    catalog.insert(module("config", &["drupal:help (>2.0)"]));
    let mut orch = InstallationOrchestrator::new(catalog, PersistedExtensionState::in_memory());
    let err = orch.install(&["color"]).unwrap_err();
    assert!(
        matches!(err, Error::Extensions(ext_extensions::Error::IncompatibleVersion { .. })),
        "got {err:?}"
    );
    assert_uninstalled(&orch, &["help", "config", "color"]);
}

#[test]
fn test_install_without_dependencies_option() {
    let mut orch = orchestrator_with(&RecordingHooks::new());
    let options = InstallOptions {
        enable_dependencies: false,
    };

    assert!(orch.install_with(&["color"], options).is_err());
    assert_uninstalled(&orch, &["help", "config", "color"]);

    orch.install(&["help"]).unwrap();
    orch.install_with(&["config"], options).unwrap();
    assert_installed(&orch, &["help", "config"]);
}

#[test]
fn test_install_profile_installs_its_module_list() {
    let hooks = RecordingHooks::new();
    let mut orch = orchestrator_with(&hooks);

    orch.install(&["standard"]).unwrap();

    assert_installed(&orch, &["help", "ban", "system", "standard"]);
    let calls = hooks.names(Direction::Install);
    let pos = |n: &str| calls.iter().position(|c| c == n).unwrap();
    assert!(pos("system") < pos("ban"));
    assert!(pos("help") < pos("standard"));
}

#[test]
fn test_install_hook_failure_keeps_committed_prefix() {
    let hooks = RecordingHooks::new().failing_on(Direction::Install, "config");
    let mut orch = orchestrator_with(&hooks);

    let err = orch.install(&["color"]).unwrap_err();

    match err {
        Error::HookFailed {
            ref module,
            phase,
            ref completed,
            ..
        } => {
            assert_eq!(module, "config");
            assert_eq!(phase, Direction::Install);
            assert_eq!(completed, &vec!["help".to_string()]);
        }
        ref other => panic!("expected HookFailed, got {other:?}"),
    }
    assert_installed(&orch, &["help"]);
    assert_uninstalled(&orch, &["config", "color"]);
    assert_eq!(hooks.names(Direction::Install), vec!["help", "config"]);
}

#[test]
fn test_install_cycle_runs_no_hooks() {
    let hooks = RecordingHooks::new();
    let mut orch =
        InstallationOrchestrator::new(cyclic_catalog(), PersistedExtensionState::in_memory())
            .with_hooks(HookRegistry::new().with_default(hooks.clone()));

    let err = orch.install(&["color"]).unwrap_err();

    assert_cycle(&err, &["color", "config", "help"]);
    assert!(hooks.calls().is_empty());
    assert_eq!(orch.phase(), Phase::Aborted);
    assert_uninstalled(&orch, &["help", "config", "color"]);
    assert!(orch.state().enabled().next().is_none());
}

// =============================================================================
// Uninstall
// =============================================================================

#[test]
fn test_uninstall_order_ignores_request_order() {
    let hooks = RecordingHooks::new();
    let mut orch = orchestrator_with(&hooks);
    orch.install(&["color"]).unwrap();

    orch.uninstall(&["config", "help", "color"]).unwrap();

    assert_eq!(hooks.names(Direction::Uninstall), vec!["color", "config", "help"]);
    assert_uninstalled(&orch, &["help", "config", "color"]);
}

#[test]
fn test_uninstall_widens_to_enabled_dependents() {
    let hooks = RecordingHooks::new();
    let mut orch = orchestrator_with(&hooks);
    orch.install(&["color"]).unwrap();

    let report = orch.uninstall(&["help"]).unwrap();
    assert_eq!(report.executed, vec!["color", "config", "help"]);
}

#[test]
fn test_uninstall_content_veto_blocks_batch() {
    let hooks = RecordingHooks::new();
    let mut validators = UninstallValidatorRegistry::with_builtins();
    validators.register(StoredContentValidator::new(["entity_test"]));
    let mut orch = orchestrator_with(&hooks).with_validators(validators);
    orch.install(&["entity_test", "config"]).unwrap();

    let err = orch.uninstall(&["help"]).unwrap_err();

    match err {
        Error::UninstallVetoed { ref vetoes } => {
            assert_eq!(vetoes.len(), 1);
            assert_eq!(vetoes[0].module, "entity_test");
            assert_eq!(vetoes[0].validator, "content");
        }
        ref other => panic!("expected UninstallVetoed, got {other:?}"),
    }
    assert!(err.to_string().contains("entity_test"));
    assert!(hooks.names(Direction::Uninstall).is_empty());
    assert_installed(&orch, &["help", "config", "entity_test"]);
}

#[test]
fn test_uninstall_profile_dependency_vetoed() {
    let mut orch = orchestrator_with(&RecordingHooks::new())
        .with_active_profile(Some("standard".to_string()));
    orch.install(&["standard"]).unwrap();

    let err = orch.uninstall(&["help"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The following reasons prevent the modules from being uninstalled: \
         The help module is required by the standard installation profile"
    );

    let plan = orch.plan_uninstall(&["help"]).unwrap();
    assert!(!plan.contains("standard"));

    let err = orch.uninstall(&["standard"]).unwrap_err();
    assert!(err.to_string().contains("The standard installation profile cannot be uninstalled"));
    assert_installed(&orch, &["help", "standard"]);
}

#[test]
fn test_uninstall_not_enabled_is_skipped() {
    let hooks = RecordingHooks::new();
    let mut orch = orchestrator_with(&hooks);
    orch.install(&["help"]).unwrap();

    let report = orch.uninstall(&["help", "color"]).unwrap();
    assert_eq!(report.executed, vec!["help"]);
    assert_eq!(report.skipped, vec!["color"]);
}

#[test]
fn test_uninstall_hook_failure_keeps_committed_prefix() {
    let hooks = RecordingHooks::new().failing_on(Direction::Uninstall, "config");
    let mut orch = orchestrator_with(&hooks);
    orch.install(&["color"]).unwrap();

    let err = orch.uninstall(&["help"]).unwrap_err();
    assert_eq!(err.completed(), ["color".to_string()]);
    assert_uninstalled(&orch, &["color"]);
    assert_installed(&orch, &["help", "config"]);
}

// =============================================================================
// Weights and persistence
// =============================================================================

#[test]
fn test_uninstall_cycle_runs_no_hooks() {
    let mut state = PersistedExtensionState::in_memory();
    for name in ["help", "config", "color"] {
        state.mark_installed(name, 8000).unwrap();
    }
    let hooks = RecordingHooks::new();
    let mut orch = InstallationOrchestrator::new(cyclic_catalog(), state)
        .with_hooks(HookRegistry::new().with_default(hooks.clone()));

    let err = orch.uninstall(&["help"]).unwrap_err();

    assert_cycle(&err, &["color", "config", "help"]);
    assert!(hooks.calls().is_empty());
    assert_eq!(orch.phase(), Phase::Aborted);
    assert_installed(&orch, &["help", "config", "color"]);
}

#[test]
fn test_weight_moves_sibling_later() {
    let hooks = RecordingHooks::new();
    let mut orch = orchestrator_with(&hooks);
    orch.set_weight("ban", 20).unwrap();

    orch.install(&["ban", "path_alias"]).unwrap();
    assert_eq!(hooks.names(Direction::Install), vec!["system", "path_alias", "ban"]);

    let names: Vec<&str> = orch.module_list().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["path_alias", "system", "ban"]);
}

#[test]
fn test_workspace_state_survives_reload() {
    let ws = TestWorkspace::new();
    ws.module("help", &[]);
    ws.module("config", &["help"]);
    ws.module("color", &["config"]);

    {
        let mut opened = Workspace::open(ws.root()).unwrap();
        opened.orchestrator_mut().install(&["color"]).unwrap();
        opened.orchestrator_mut().set_weight("help", 7).unwrap();
    }
    ws.assert_file_contains(".extm/state.toml", "[extensions.color]");

    let reopened = Workspace::open(ws.root()).unwrap();
    let orch = reopened.orchestrator();
    assert_installed(orch, &["help", "config", "color"]);
    assert_eq!(orch.catalog().get("help").unwrap().weight, 7);
}
