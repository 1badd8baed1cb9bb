//! Uninstall validators.
//!
//! Before an uninstall batch executes, every registered validator inspects
//! the full candidate list and may veto any subset of it. A single veto
//! aborts the whole batch.

use std::fmt;

use serde::Serialize;

use crate::catalog::{ExtensionCatalog, ExtensionKind};

/// One validator's objection to removing one extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UninstallVeto {
    pub module: String,
    pub reason: String,
    /// Name of the validator that raised it.
    pub validator: String,
}

impl UninstallVeto {
    pub fn new(
        module: impl Into<String>,
        reason: impl Into<String>,
        validator: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            reason: reason.into(),
            validator: validator.into(),
        }
    }
}

impl fmt::Display for UninstallVeto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Join vetoes into the message reported for a blocked batch.
pub fn describe_vetoes(vetoes: &[UninstallVeto]) -> String {
    let reasons: Vec<&str> = vetoes.iter().map(|v| v.reason.as_str()).collect();
    format!(
        "The following reasons prevent the modules from being uninstalled: {}",
        reasons.join("; ")
    )
}

/// Read-only information a validator may consult.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub catalog: &'a ExtensionCatalog,
    /// Name of the active installation profile, if any.
    pub active_profile: Option<&'a str>,
}

/// A check that may veto extensions out of an uninstall batch.
///
/// Implementations must not mutate state; they see the whole ordered batch
/// at once.
pub trait UninstallValidator: Send + Sync {
    /// Short identifier used in logs and veto records.
    fn name(&self) -> &str;

    /// Return a veto for every candidate that must not be removed.
    fn validate(&self, candidates: &[String], ctx: &ValidationContext<'_>) -> Vec<UninstallVeto>;
}

/// Vetoes extensions flagged `required`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequiredValidator;

impl UninstallValidator for RequiredValidator {
    fn name(&self) -> &str {
        "required"
    }

    fn validate(&self, candidates: &[String], ctx: &ValidationContext<'_>) -> Vec<UninstallVeto> {
        candidates
            .iter()
            .filter_map(|name| ctx.catalog.get(name).ok())
            .filter(|record| record.required)
            .map(|record| {
                UninstallVeto::new(
                    &record.name,
                    format!("The {} module is required", record.name),
                    self.name(),
                )
            })
            .collect()
    }
}

/// Vetoes the active installation profile and the modules it depends on.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProfileValidator;

impl UninstallValidator for ProfileValidator {
    fn name(&self) -> &str {
        "profile"
    }

    fn validate(&self, candidates: &[String], ctx: &ValidationContext<'_>) -> Vec<UninstallVeto> {
        let Some(profile_name) = ctx.active_profile else {
            return Vec::new();
        };
        let Ok(profile) = ctx.catalog.get(profile_name) else {
            tracing::warn!(profile = profile_name, "active profile missing from catalog");
            return Vec::new();
        };

        let mut vetoes = Vec::new();
        for name in candidates {
            if name == profile_name {
                vetoes.push(UninstallVeto::new(
                    name,
                    format!("The {profile_name} installation profile cannot be uninstalled"),
                    self.name(),
                ));
                continue;
            }
            let required_by_profile = profile
                .dependency_names()
                .filter_map(|dep| ctx.catalog.resolve_target(dep))
                .any(|target| &target.name == name);
            if required_by_profile {
                vetoes.push(UninstallVeto::new(
                    name,
                    format!(
                        "The {name} module is required by the {profile_name} installation profile"
                    ),
                    self.name(),
                ));
            }
        }
        vetoes
    }
}

/// Ordered chain of uninstall validators.
#[derive(Default)]
pub struct UninstallValidatorRegistry {
    validators: Vec<Box<dyn UninstallValidator>>,
}

impl UninstallValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in required and profile validators.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(RequiredValidator);
        registry.register(ProfileValidator);
        registry
    }

    /// Append a validator; validators run in registration order.
    pub fn register<V: UninstallValidator + 'static>(&mut self, validator: V) {
        self.validators.push(Box::new(validator));
    }

    pub fn register_boxed(&mut self, validator: Box<dyn UninstallValidator>) {
        self.validators.push(validator);
    }

    pub fn names(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run every validator over the batch and merge their vetoes.
    ///
    /// Identical vetoes are reported once; order follows registration.
    pub fn validate(
        &self,
        candidates: &[String],
        ctx: &ValidationContext<'_>,
    ) -> Vec<UninstallVeto> {
        let mut merged: Vec<UninstallVeto> = Vec::new();
        for validator in &self.validators {
            for veto in validator.validate(candidates, ctx) {
                tracing::warn!(
                    validator = validator.name(),
                    module = %veto.module,
                    reason = %veto.reason,
                    "uninstall vetoed"
                );
                if !merged.contains(&veto) {
                    merged.push(veto);
                }
            }
        }
        merged
    }
}

impl fmt::Debug for UninstallValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UninstallValidatorRegistry")
            .field("validators", &self.names())
            .finish()
    }
}
