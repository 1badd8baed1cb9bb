//! Ordered, per-extension durable install and uninstall batches.
//!
//! A batch moves through `Idle -> Planning -> Validating -> Executing` and
//! ends `Committed` or `Aborted`. Planning and validation are all or
//! nothing. Execution commits one extension at a time: a hook or save
//! failure stops the batch and leaves everything before it enabled (or
//! uninstalled).

use std::collections::BTreeSet;
use std::fmt;

use ext_extensions::{
    Direction, ExtensionCatalog, ExtensionKind, ExtensionRecord, GraphBuilder, ResolutionPlan,
    TopologicalResolver, UninstallValidator, UninstallValidatorRegistry, UninstallVeto,
    ValidationContext,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::hooks::HookRegistry;
use crate::state::PersistedExtensionState;

/// Lifecycle of the most recent batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Planning,
    Validating,
    Executing,
    Committed,
    Aborted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Idle => "idle",
            Phase::Planning => "planning",
            Phase::Validating => "validating",
            Phase::Executing => "executing",
            Phase::Committed => "committed",
            Phase::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// Options for [`InstallationOrchestrator::install_with`].
#[derive(Debug, Clone, Copy)]
pub struct InstallOptions {
    /// Pull in missing dependencies. When off, every dependency must already
    /// be enabled or be part of the request.
    pub enable_dependencies: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            enable_dependencies: true,
        }
    }
}

/// Options for [`InstallationOrchestrator::uninstall_with`].
#[derive(Debug, Clone, Copy)]
pub struct UninstallOptions {
    /// Widen the batch to enabled dependents. When off, enabled dependents
    /// outside the request are an error.
    pub uninstall_dependents: bool,
}

impl Default for UninstallOptions {
    fn default() -> Self {
        Self {
            uninstall_dependents: true,
        }
    }
}

/// Outcome of a committed batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub id: Uuid,
    pub direction: Direction,
    pub plan: ResolutionPlan,
    /// Extensions whose hook ran and whose state was committed, in order.
    pub executed: Vec<String>,
    /// Extensions left untouched (already in the target state).
    pub skipped: Vec<String>,
}

/// Plans and executes install and uninstall batches against persisted state.
#[derive(Debug)]
pub struct InstallationOrchestrator {
    catalog: ExtensionCatalog,
    state: PersistedExtensionState,
    hooks: HookRegistry,
    validators: UninstallValidatorRegistry,
    active_profile: Option<String>,
    phase: Phase,
}

impl InstallationOrchestrator {
    /// Create an orchestrator with the built-in validators and no hooks.
    ///
    /// Weight overrides recorded in `state` are applied to the catalog.
    pub fn new(mut catalog: ExtensionCatalog, state: PersistedExtensionState) -> Self {
        for (name, weight) in state.weight_overrides() {
            if catalog.set_weight(name, weight).is_err() {
                tracing::warn!(extension = name, "weight override for unknown extension");
            }
        }
        Self {
            catalog,
            state,
            hooks: HookRegistry::new(),
            validators: UninstallValidatorRegistry::with_builtins(),
            active_profile: None,
            phase: Phase::Idle,
        }
    }

    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_validators(mut self, validators: UninstallValidatorRegistry) -> Self {
        self.validators = validators;
        self
    }

    pub fn with_active_profile(mut self, profile: Option<String>) -> Self {
        self.active_profile = profile;
        self
    }

    /// Add a validator after the ones already registered.
    pub fn register_validator<V: UninstallValidator + 'static>(&mut self, validator: V) {
        self.validators.register(validator);
    }

    pub fn catalog(&self) -> &ExtensionCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &PersistedExtensionState {
        &self.state
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn validators(&self) -> &UninstallValidatorRegistry {
        &self.validators
    }

    pub fn active_profile(&self) -> Option<&str> {
        self.active_profile.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.state.is_enabled(name)
    }

    pub fn schema_version(&self, name: &str) -> i32 {
        self.state.schema_version(name)
    }

    /// Enabled extensions ordered by weight, then name.
    pub fn module_list(&self) -> Vec<&ExtensionRecord> {
        let mut enabled: Vec<&ExtensionRecord> = self
            .state
            .enabled()
            .filter_map(|name| self.catalog.get(name).ok())
            .collect();
        enabled.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.name.cmp(&b.name)));
        enabled
    }

    /// Change an extension's weight and persist the override.
    ///
    /// Only later batches see the new weight.
    pub fn set_weight(&mut self, name: &str, weight: i32) -> Result<()> {
        self.catalog.get(name)?;
        self.state.set_weight(name, weight)?;
        self.catalog.set_weight(name, weight)?;
        tracing::info!(extension = name, weight, "weight updated");
        Ok(())
    }

    /// Install order for `names` and their dependencies, without executing.
    pub fn plan_install<S: AsRef<str>>(&self, names: &[S]) -> Result<ResolutionPlan> {
        self.build_install_plan(names, InstallOptions::default())
    }

    /// Uninstall order for `names` and their enabled dependents, without
    /// executing or validating.
    pub fn plan_uninstall<S: AsRef<str>>(&self, names: &[S]) -> Result<ResolutionPlan> {
        self.build_uninstall_plan(names, UninstallOptions::default())
    }

    /// Run every registered validator over an uninstall plan.
    pub fn validate_uninstall(&self, plan: &ResolutionPlan) -> Vec<UninstallVeto> {
        let ctx = ValidationContext {
            catalog: &self.catalog,
            active_profile: self.active_profile.as_deref(),
        };
        self.validators.validate(plan.order(), &ctx)
    }

    pub fn install<S: AsRef<str>>(&mut self, names: &[S]) -> Result<BatchReport> {
        self.install_with(names, InstallOptions::default())
    }

    /// Install `names`, running hooks in dependency order.
    ///
    /// # Errors
    ///
    /// Planning errors (`NotFound`, `MissingDependency`,
    /// `IncompatibleVersion`, `CycleDetected`) leave state untouched.
    /// `Error::HookFailed` and `Error::StateCommitFailed` leave every
    /// extension listed in `completed` enabled.
    pub fn install_with<S: AsRef<str>>(
        &mut self,
        names: &[S],
        options: InstallOptions,
    ) -> Result<BatchReport> {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("batch", %id, direction = %Direction::Install);
        let _guard = span.enter();

        let outcome = self.run_install(id, names, options);
        self.finish(outcome)
    }

    pub fn uninstall<S: AsRef<str>>(&mut self, names: &[S]) -> Result<BatchReport> {
        self.uninstall_with(names, UninstallOptions::default())
    }

    /// Uninstall `names`, dependents first.
    ///
    /// # Errors
    ///
    /// `Error::UninstallVetoed` carries every veto raised; nothing is
    /// executed. `Error::HookFailed` and `Error::StateCommitFailed` leave
    /// every extension listed in `completed` uninstalled.
    pub fn uninstall_with<S: AsRef<str>>(
        &mut self,
        names: &[S],
        options: UninstallOptions,
    ) -> Result<BatchReport> {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("batch", %id, direction = %Direction::Uninstall);
        let _guard = span.enter();

        let outcome = self.run_uninstall(id, names, options);
        self.finish(outcome)
    }

    fn finish(&mut self, outcome: Result<BatchReport>) -> Result<BatchReport> {
        self.phase = match outcome {
            Ok(_) => Phase::Committed,
            Err(ref e) => {
                tracing::warn!(error = %e, "batch aborted");
                Phase::Aborted
            }
        };
        outcome
    }

    fn run_install<S: AsRef<str>>(
        &mut self,
        id: Uuid,
        names: &[S],
        options: InstallOptions,
    ) -> Result<BatchReport> {
        self.phase = Phase::Planning;
        let plan = self.build_install_plan(names, options)?;

        self.phase = Phase::Executing;
        let mut executed = Vec::new();
        let mut skipped = plan.skipped().to_vec();
        for name in plan.iter() {
            if self.state.is_enabled(name) {
                tracing::debug!(extension = name, "already enabled");
                skipped.push(name.to_string());
                continue;
            }

            self.hooks
                .run(name, Direction::Install)
                .map_err(|e| Error::HookFailed {
                    module: name.to_string(),
                    phase: Direction::Install,
                    reason: e.to_string(),
                    completed: executed.clone(),
                })?;

            let schema = self.catalog.get(name)?.schema_version;
            self.state
                .mark_installed(name, schema)
                .map_err(|e| Error::StateCommitFailed {
                    module: name.to_string(),
                    phase: Direction::Install,
                    completed: executed.clone(),
                    source: Box::new(e),
                })?;
            tracing::info!(extension = name, schema, "installed");
            executed.push(name.to_string());
        }

        Ok(BatchReport {
            id,
            direction: Direction::Install,
            plan,
            executed,
            skipped,
        })
    }

    fn run_uninstall<S: AsRef<str>>(
        &mut self,
        id: Uuid,
        names: &[S],
        options: UninstallOptions,
    ) -> Result<BatchReport> {
        self.phase = Phase::Planning;
        let plan = self.build_uninstall_plan(names, options)?;

        self.phase = Phase::Validating;
        let vetoes = self.validate_uninstall(&plan);
        if !vetoes.is_empty() {
            return Err(Error::UninstallVetoed { vetoes });
        }

        self.phase = Phase::Executing;
        let mut executed = Vec::new();
        for name in plan.iter() {
            self.hooks
                .run(name, Direction::Uninstall)
                .map_err(|e| Error::HookFailed {
                    module: name.to_string(),
                    phase: Direction::Uninstall,
                    reason: e.to_string(),
                    completed: executed.clone(),
                })?;

            self.state
                .mark_uninstalled(name)
                .map_err(|e| Error::StateCommitFailed {
                    module: name.to_string(),
                    phase: Direction::Uninstall,
                    completed: executed.clone(),
                    source: Box::new(e),
                })?;
            tracing::info!(extension = name, "uninstalled");
            executed.push(name.to_string());
        }

        Ok(BatchReport {
            id,
            direction: Direction::Uninstall,
            skipped: plan.skipped().to_vec(),
            plan,
            executed,
        })
    }

    fn build_install_plan<S: AsRef<str>>(
        &self,
        names: &[S],
        options: InstallOptions,
    ) -> Result<ResolutionPlan> {
        let requested = self.expand_profiles(names)?;

        if !options.enable_dependencies {
            for name in &requested {
                let record = self.catalog.get(name)?;
                for dep in &record.dependencies {
                    let satisfied = self
                        .catalog
                        .resolve_target(&dep.name)
                        .is_some_and(|t| self.state.is_enabled(&t.name) || requested.contains(&t.name));
                    if !satisfied {
                        return Err(ext_extensions::Error::MissingDependency {
                            name: name.clone(),
                            missing: dep.name.clone(),
                        }
                        .into());
                    }
                }
            }
        }

        let requested: Vec<&str> = requested.iter().map(String::as_str).collect();
        let graph = GraphBuilder::new(&self.catalog).install_graph(&requested)?;
        let plan = TopologicalResolver.resolve_install_order(&graph)?;
        tracing::debug!(order = ?plan.order(), "install plan");
        Ok(plan)
    }

    fn build_uninstall_plan<S: AsRef<str>>(
        &self,
        names: &[S],
        options: UninstallOptions,
    ) -> Result<ResolutionPlan> {
        let is_enabled = |name: &str| self.state.is_enabled(name);

        if !options.uninstall_dependents {
            let requested: BTreeSet<&str> = names.iter().map(|n| n.as_ref()).collect();
            for name in &requested {
                let dependents: Vec<String> = self
                    .catalog
                    .dependents_of(name)
                    .into_iter()
                    .filter(|d| is_enabled(*d) && !requested.contains(d))
                    .filter(|d| {
                        self.catalog
                            .get(d)
                            .is_ok_and(|r| r.kind != ExtensionKind::Profile)
                    })
                    .map(str::to_string)
                    .collect();
                if is_enabled(*name) && !dependents.is_empty() {
                    return Err(Error::DependentsEnabled {
                        module: name.to_string(),
                        dependents,
                    });
                }
            }
        }

        let graph = GraphBuilder::new(&self.catalog).uninstall_graph(names, is_enabled)?;
        let plan = TopologicalResolver.resolve_uninstall_order(&graph)?;
        tracing::debug!(order = ?plan.order(), skipped = ?plan.skipped(), "uninstall plan");
        Ok(plan)
    }

    /// Requested names, with each requested profile's install list added.
    fn expand_profiles<S: AsRef<str>>(&self, names: &[S]) -> Result<BTreeSet<String>> {
        let mut requested = BTreeSet::new();
        for name in names {
            let record = self.catalog.get(name.as_ref())?;
            requested.insert(record.name.clone());
            if record.kind == ExtensionKind::Profile {
                requested.extend(record.install.iter().cloned());
            }
        }
        Ok(requested)
    }
}
