//! Schema of `<name>.info.toml` extension info files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest machine name an extension may carry.
pub const MAX_NAME_LENGTH: usize = 50;

/// Schema version recorded for an extension that declares none.
pub const DEFAULT_SCHEMA_VERSION: i32 = 8000;

/// Kind of installable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionType {
    /// A functional module.
    #[default]
    Module,
    /// A presentation theme.
    Theme,
    /// An installation profile bundling a set of modules.
    Profile,
}

impl FromStr for ExtensionType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "module" => Ok(ExtensionType::Module),
            "theme" => Ok(ExtensionType::Theme),
            "profile" => Ok(ExtensionType::Profile),
            _ => Err(Error::InvalidType {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExtensionType::Module => "module",
            ExtensionType::Theme => "theme",
            ExtensionType::Profile => "profile",
        };
        f.pad(label)
    }
}

/// Shell commands run when the extension is installed or uninstalled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookCommands {
    #[serde(default)]
    pub install: Option<String>,
    #[serde(default)]
    pub uninstall: Option<String>,
}

impl HookCommands {
    pub fn is_empty(&self) -> bool {
        self.install.is_none() && self.uninstall.is_none()
    }
}

/// Declared metadata for a single extension.
///
/// Dependencies are kept as raw strings (`[project:]name[ (constraint)]`);
/// parsing them is the catalog's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionInfo {
    /// Machine name, unique across the catalog.
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ExtensionType,
    /// Semver version, optionally with a `N.x-` core prefix.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weight: i32,
    /// Schema version recorded when the extension is first installed.
    #[serde(default = "default_schema_version")]
    pub schema_version: i32,
    /// Core-required extensions can never be uninstalled.
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Capabilities other extensions may depend on by name.
    #[serde(default)]
    pub provides: Vec<String>,
    /// Modules a profile installs alongside its dependencies.
    #[serde(default)]
    pub install: Vec<String>,
    #[serde(default, skip_serializing_if = "HookCommands::is_empty")]
    pub hooks: HookCommands,
}

fn default_schema_version() -> i32 {
    DEFAULT_SCHEMA_VERSION
}

impl ExtensionInfo {
    /// Minimal info for a module with the given name.
    pub fn module(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ExtensionType::Module,
            version: None,
            description: String::new(),
            weight: 0,
            schema_version: DEFAULT_SCHEMA_VERSION,
            required: false,
            hidden: false,
            dependencies: Vec::new(),
            provides: Vec::new(),
            install: Vec::new(),
            hooks: HookCommands::default(),
        }
    }

    /// Parse and validate an info document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let info: ExtensionInfo = toml::from_str(content).map_err(|e| Error::InvalidConfig {
            path: Default::default(),
            message: e.to_string(),
        })?;
        info.validate()?;
        Ok(info)
    }

    /// Check name rules and that only profiles declare an `install` list.
    pub fn validate(&self) -> Result<()> {
        validate_machine_name(&self.name)?;
        if !self.install.is_empty() && self.kind != ExtensionType::Profile {
            return Err(Error::InvalidName {
                name: self.name.clone(),
                reason: format!("only profiles may declare `install`, this is a {}", self.kind),
            });
        }
        Ok(())
    }
}

/// Validate an extension machine name: `[a-z][a-z0-9_]*`, at most
/// [`MAX_NAME_LENGTH`] characters.
pub fn validate_machine_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let Some(first) = name.chars().next() else {
        return Err(invalid("name must not be empty"));
    };
    if !first.is_ascii_lowercase() {
        return Err(invalid("name must start with a lowercase letter"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(invalid(
            "name must contain only lowercase letters, digits, or underscores",
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(invalid("name is too long"));
    }
    Ok(())
}
