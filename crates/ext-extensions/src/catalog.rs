//! Catalog of every known extension.

use std::collections::BTreeMap;

use semver::Version;

use ext_meta::ExtensionInfo;
use ext_meta::schema::DEFAULT_SCHEMA_VERSION;

use crate::dependency::Dependency;
use crate::error::{Error, Result};
use crate::version::parse_version;

pub use ext_meta::ExtensionType as ExtensionKind;

/// Declared metadata of one extension, as the resolver sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionRecord {
    pub name: String,
    pub kind: ExtensionKind,
    pub version: Option<Version>,
    pub description: String,
    pub dependencies: Vec<Dependency>,
    pub provides: Vec<String>,
    /// Tie-break among otherwise unordered extensions; lower goes first.
    pub weight: i32,
    /// Schema version recorded on install.
    pub schema_version: i32,
    pub required: bool,
    pub hidden: bool,
    /// Modules a profile installs (profiles only).
    pub install: Vec<String>,
}

impl ExtensionRecord {
    /// A module with no dependencies and default settings.
    pub fn module(name: impl Into<String>) -> Self {
        Self::new(name, ExtensionKind::Module)
    }

    pub fn new(name: impl Into<String>, kind: ExtensionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            version: None,
            description: String::new(),
            dependencies: Vec::new(),
            provides: Vec::new(),
            weight: 0,
            schema_version: DEFAULT_SCHEMA_VERSION,
            required: false,
            hidden: false,
            install: Vec::new(),
        }
    }

    /// Replace the dependency list with parsed declarations.
    pub fn with_dependencies(mut self, specs: &[&str]) -> Result<Self> {
        self.dependencies = specs
            .iter()
            .map(|s| Dependency::parse(s))
            .collect::<Result<_>>()?;
        Ok(self)
    }

    pub fn with_version(mut self, version: &str) -> Result<Self> {
        self.version = Some(parse_version(version)?);
        Ok(self)
    }

    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    /// Build a record from a validated info definition.
    pub fn from_info(info: &ExtensionInfo) -> Result<Self> {
        info.validate()?;
        let version = info.version.as_deref().map(parse_version).transpose()?;
        let dependencies = info
            .dependencies
            .iter()
            .map(|s| Dependency::parse(s))
            .collect::<Result<_>>()?;

        Ok(Self {
            name: info.name.clone(),
            kind: info.kind,
            version,
            description: info.description.clone(),
            dependencies,
            provides: info.provides.clone(),
            weight: info.weight,
            schema_version: info.schema_version,
            required: info.required,
            hidden: info.hidden,
            install: info.install.clone(),
        })
    }

    /// Names this record declares a dependency on, in declaration order.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().map(|d| d.name.as_str())
    }
}

/// Read-only view over the metadata of every available extension.
///
/// Keyed by name; iteration is alphabetical, which keeps every derived
/// computation deterministic.
#[derive(Debug, Clone, Default)]
pub struct ExtensionCatalog {
    records: BTreeMap<String, ExtensionRecord>,
}

impl ExtensionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from info definitions.
    pub fn from_infos<'a, I>(infos: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ExtensionInfo>,
    {
        let mut catalog = Self::new();
        for info in infos {
            catalog.insert(ExtensionRecord::from_info(info)?);
        }
        tracing::debug!(extensions = catalog.len(), "catalog built");
        Ok(catalog)
    }

    /// Add or replace a record, returning the previous one.
    pub fn insert(&mut self, record: ExtensionRecord) -> Option<ExtensionRecord> {
        self.records.insert(record.name.clone(), record)
    }

    /// Look up a record by exact name.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown name.
    pub fn get(&self, name: &str) -> Result<&ExtensionRecord> {
        self.records
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn all(&self) -> &BTreeMap<String, ExtensionRecord> {
        &self.records
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Resolve a dependency target: the record with that name, else the
    /// alphabetically first record that provides it.
    pub fn resolve_target(&self, name: &str) -> Option<&ExtensionRecord> {
        self.records.get(name).or_else(|| {
            self.records
                .values()
                .find(|r| r.provides.iter().any(|p| p == name))
        })
    }

    /// Records declaring a dependency that resolves to `name`, alphabetically.
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.records
            .values()
            .filter(|r| r.name != name)
            .filter(|r| {
                r.dependency_names()
                    .filter_map(|dep| self.resolve_target(dep))
                    .any(|target| target.name == name)
            })
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Change an extension's tie-break weight.
    ///
    /// Affects only future resolutions.
    pub fn set_weight(&mut self, name: &str, weight: i32) -> Result<()> {
        let record = self
            .records
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        record.weight = weight;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ExtensionCatalog {
        let mut catalog = ExtensionCatalog::new();
        catalog.insert(ExtensionRecord::module("help"));
        catalog.insert(
            ExtensionRecord::module("config")
                .with_dependencies(&["drupal:help"])
                .unwrap(),
        );
        catalog.insert(
            ExtensionRecord::module("color")
                .with_dependencies(&["config"])
                .unwrap(),
        );
        let mut redis = ExtensionRecord::module("redis");
        redis.provides = vec!["cache_backend".to_string()];
        catalog.insert(redis);
        catalog.insert(
            ExtensionRecord::module("page_cache")
                .with_dependencies(&["cache_backend"])
                .unwrap(),
        );
        catalog
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let err = catalog().get("views").unwrap_err();
        assert!(matches!(err, Error::NotFound(ref name) if name == "views"));
    }

    #[test]
    fn test_resolve_target_by_name_and_provides() {
        let catalog = catalog();
        assert_eq!(catalog.resolve_target("help").unwrap().name, "help");
        assert_eq!(catalog.resolve_target("cache_backend").unwrap().name, "redis");
        assert!(catalog.resolve_target("memcache").is_none());
    }

    #[test]
    fn test_dependents_of() {
        let catalog = catalog();
        assert_eq!(catalog.dependents_of("help"), vec!["config"]);
        assert_eq!(catalog.dependents_of("config"), vec!["color"]);
        assert_eq!(catalog.dependents_of("redis"), vec!["page_cache"]);
        assert!(catalog.dependents_of("color").is_empty());
    }

    #[test]
    fn test_set_weight() {
        let mut catalog = catalog();
        catalog.set_weight("help", 20).unwrap();
        assert_eq!(catalog.get("help").unwrap().weight, 20);
        assert!(catalog.set_weight("views", 1).is_err());
    }

    #[test]
    fn test_from_info() {
        let mut info = ExtensionInfo::module("config");
        info.version = Some("8.x-1.2".to_string());
        info.dependencies = vec!["drupal:help (>=1.0)".to_string()];
        info.weight = -3;

        let record = ExtensionRecord::from_info(&info).unwrap();
        assert_eq!(record.version, Some(Version::new(1, 2, 0)));
        assert_eq!(record.weight, -3);
        assert_eq!(record.dependency_names().collect::<Vec<_>>(), vec!["help"]);
    }

    #[test]
    fn test_from_info_rejects_bad_dependency() {
        let mut info = ExtensionInfo::module("config");
        info.dependencies = vec!["help (".to_string()];
        assert!(matches!(
            ExtensionRecord::from_info(&info),
            Err(Error::InvalidDependency { .. })
        ));
    }
}
