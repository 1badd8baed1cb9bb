//! Dependency declarations.
//!
//! A declaration has the form `[project:]name[ (constraint)]`, for example
//! `help`, `drupal:help` or `drupal:help (>=1.0, <2.0)`. The project
//! namespace is informational; resolution is by name.

use std::fmt;

use semver::Version;

use crate::error::{Error, Result};
use crate::version::VersionConstraint;

/// A single declared dependency of an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Project namespace, e.g. `drupal` in `drupal:help`.
    pub project: Option<String>,
    /// Target extension (or provided capability) name.
    pub name: String,
    /// Optional constraint on the target's version.
    pub constraint: Option<VersionConstraint>,
}

impl Dependency {
    /// Unconstrained dependency on `name`.
    pub fn on(name: impl Into<String>) -> Self {
        Self {
            project: None,
            name: name.into(),
            constraint: None,
        }
    }

    /// Parse a declaration such as `drupal:help (>=1.0)`.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidDependency {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = spec.trim();
        let (target, constraint) = match trimmed.split_once('(') {
            Some((target, rest)) => {
                let inner = rest
                    .trim_end()
                    .strip_suffix(')')
                    .ok_or_else(|| invalid("unterminated version constraint"))?;
                if inner.trim().is_empty() {
                    return Err(invalid("empty version constraint"));
                }
                (target.trim(), Some(VersionConstraint::parse(inner)?))
            }
            None => (trimmed, None),
        };

        let (project, name) = match target.split_once(':') {
            Some((project, name)) => (Some(project.trim().to_string()), name.trim()),
            None => (None, target),
        };
        ext_meta::validate_machine_name(name).map_err(|e| invalid(&e.to_string()))?;
        if let Some(ref project) = project {
            ext_meta::validate_machine_name(project).map_err(|e| invalid(&e.to_string()))?;
        }

        Ok(Self {
            project,
            name: name.to_string(),
            constraint,
        })
    }

    /// Whether a target at `version` satisfies this dependency.
    ///
    /// Unconstrained dependencies accept anything, including an unversioned
    /// target. A constrained dependency rejects an unversioned target.
    pub fn is_compatible(&self, version: Option<&Version>) -> bool {
        match (&self.constraint, version) {
            (None, _) => true,
            (Some(constraint), Some(version)) => constraint.matches(version),
            (Some(_), None) => false,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref project) = self.project {
            write!(f, "{project}:")?;
        }
        f.write_str(&self.name)?;
        if let Some(ref constraint) = self.constraint {
            write!(f, " ({constraint})")?;
        }
        Ok(())
    }
}
