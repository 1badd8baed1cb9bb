//! Property tests over random catalogs and batches
//!
//! Random acyclic catalogs are driven through install and uninstall
//! batches; after every batch the enabled set must be closed under
//! dependencies and hooks must have run in plan order.

use std::collections::BTreeSet;

use ext_core::{HookRegistry, InstallationOrchestrator, PersistedExtensionState, SCHEMA_UNINSTALLED};
use ext_extensions::{Direction, ExtensionCatalog, ExtensionRecord, UninstallValidatorRegistry};
use ext_test_utils::hooks::RecordingHooks;
use proptest::prelude::*;

/// Module `m{i}` may only depend on `m{j}` with `j < i`.
fn arb_catalog() -> impl Strategy<Value = ExtensionCatalog> {
    (2usize..10)
        .prop_flat_map(|n| {
            (
                proptest::collection::vec(proptest::collection::vec(any::<bool>(), n), n),
                proptest::collection::vec(-3i32..3, n),
            )
        })
        .prop_map(|(adjacency, weights)| {
            let mut catalog = ExtensionCatalog::new();
            for (i, row) in adjacency.iter().enumerate() {
                let deps: Vec<String> = (0..i).filter(|&j| row[j]).map(|j| format!("m{j}")).collect();
                let refs: Vec<&str> = deps.iter().map(String::as_str).collect();
                catalog.insert(
                    ExtensionRecord::module(format!("m{i}"))
                        .with_dependencies(&refs)
                        .unwrap()
                        .with_weight(weights[i]),
                );
            }
            catalog
        })
}

fn pick(catalog: &ExtensionCatalog, mask: &[bool]) -> Vec<String> {
    catalog
        .names()
        .zip(mask.iter().cycle())
        .filter(|(_, keep)| **keep)
        .map(|(name, _)| name.to_string())
        .collect()
}

fn assert_consistent(orch: &InstallationOrchestrator) -> Result<(), TestCaseError> {
    let enabled: BTreeSet<&str> = orch.state().enabled().collect();
    for name in orch.catalog().names() {
        let is_enabled = enabled.contains(name);
        prop_assert_eq!(orch.schema_version(name) == SCHEMA_UNINSTALLED, !is_enabled);
        if is_enabled {
            for dep in orch.catalog().get(name).unwrap().dependency_names() {
                prop_assert!(enabled.contains(dep), "{} enabled without {}", name, dep);
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_batches_keep_enabled_set_closed(
        catalog in arb_catalog(),
        install_mask in proptest::collection::vec(any::<bool>(), 1..10),
        uninstall_mask in proptest::collection::vec(any::<bool>(), 1..10),
    ) {
        let hooks = RecordingHooks::new();
        let mut orch = InstallationOrchestrator::new(catalog.clone(), PersistedExtensionState::in_memory())
            .with_hooks(HookRegistry::new().with_default(hooks.clone()))
            .with_validators(UninstallValidatorRegistry::new());

        let to_install = pick(&catalog, &install_mask);
        let report = orch.install(&to_install).unwrap();
        prop_assert_eq!(hooks.names(Direction::Install), report.executed.clone());
        prop_assert_eq!(report.executed.as_slice(), report.plan.order());
        assert_consistent(&orch)?;

        let to_uninstall = pick(&catalog, &uninstall_mask);
        let report = orch.uninstall(&to_uninstall).unwrap();
        prop_assert_eq!(hooks.names(Direction::Uninstall), report.executed.clone());
        for name in &to_uninstall {
            prop_assert!(!orch.is_enabled(name));
        }
        assert_consistent(&orch)?;
    }

    #[test]
    fn prop_failed_install_leaves_closed_prefix(
        catalog in arb_catalog(),
        fail_index in 0usize..10,
    ) {
        let names: Vec<String> = catalog.names().map(str::to_string).collect();
        let victim = names[fail_index % names.len()].clone();
        let hooks = RecordingHooks::new().failing_on(Direction::Install, &victim);
        let mut orch = InstallationOrchestrator::new(catalog, PersistedExtensionState::in_memory())
            .with_hooks(HookRegistry::new().with_default(hooks));

        let plan = orch.plan_install(&names).unwrap();
        let err = orch.install(&names).unwrap_err();

        let cut = plan.position(&victim).unwrap();
        prop_assert_eq!(err.completed(), &plan.order()[..cut]);
        prop_assert!(!orch.is_enabled(&victim));
        assert_consistent(&orch)?;
    }
}
