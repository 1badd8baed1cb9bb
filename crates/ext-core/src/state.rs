//! Persisted extension state
//!
//! Records which extensions are enabled, the schema version each was
//! installed at, and any weight overrides. File-backed state is rewritten
//! atomically after every change, so an interrupted batch leaves the
//! extensions committed so far and nothing else.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ext_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Schema version reported for an extension that is not installed.
pub const SCHEMA_UNINSTALLED: i32 = -1;

/// Current state file format version.
pub const STATE_VERSION: &str = "1.0";

fn uninstalled() -> i32 {
    SCHEMA_UNINSTALLED
}

/// Durable record for one extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "uninstalled")]
    pub schema_version: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<DateTime<Utc>>,
    /// Overrides the weight declared in the info file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

impl Default for StateEntry {
    fn default() -> Self {
        Self {
            enabled: false,
            schema_version: SCHEMA_UNINSTALLED,
            installed_at: None,
            weight: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateDocument {
    version: String,
    #[serde(default)]
    extensions: BTreeMap<String, StateEntry>,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            extensions: BTreeMap::new(),
        }
    }
}

/// Enabled set, schema versions and weight overrides.
#[derive(Debug, Clone, Default)]
pub struct PersistedExtensionState {
    doc: StateDocument,
    path: Option<PathBuf>,
    store: ConfigStore,
}

impl PersistedExtensionState {
    /// State that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open file-backed state, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or declares an
    /// unsupported format version.
    pub fn open(path: &Path) -> Result<Self> {
        let store = ConfigStore::new();
        let doc = if path.exists() {
            let doc: StateDocument = store.load(path)?;
            if doc.version != STATE_VERSION {
                return Err(Error::InvalidState {
                    path: path.to_path_buf(),
                    message: format!("unsupported state version '{}'", doc.version),
                });
            }
            doc
        } else {
            tracing::debug!(path = ?path, "no state file, starting empty");
            StateDocument::default()
        };

        Ok(Self {
            doc,
            path: Some(path.to_path_buf()),
            store,
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entry(&self, name: &str) -> Option<&StateEntry> {
        self.doc.extensions.get(name)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.entry(name).is_some_and(|e| e.enabled)
    }

    /// Installed schema version, or [`SCHEMA_UNINSTALLED`].
    pub fn schema_version(&self, name: &str) -> i32 {
        match self.entry(name) {
            Some(entry) if entry.enabled => entry.schema_version,
            _ => SCHEMA_UNINSTALLED,
        }
    }

    /// Names of enabled extensions, alphabetically.
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.doc
            .extensions
            .iter()
            .filter(|(_, e)| e.enabled)
            .map(|(name, _)| name.as_str())
    }

    pub fn weight_override(&self, name: &str) -> Option<i32> {
        self.entry(name).and_then(|e| e.weight)
    }

    pub fn weight_overrides(&self) -> impl Iterator<Item = (&str, i32)> {
        self.doc
            .extensions
            .iter()
            .filter_map(|(name, e)| e.weight.map(|w| (name.as_str(), w)))
    }

    /// Record a successful install and persist.
    pub fn mark_installed(&mut self, name: &str, schema_version: i32) -> Result<()> {
        self.update(name, |entry| {
            entry.enabled = true;
            entry.schema_version = schema_version;
            entry.installed_at = Some(Utc::now());
        })
    }

    /// Record a successful uninstall and persist. Weight overrides survive.
    pub fn mark_uninstalled(&mut self, name: &str) -> Result<()> {
        self.update(name, |entry| {
            entry.enabled = false;
            entry.schema_version = SCHEMA_UNINSTALLED;
            entry.installed_at = None;
        })
    }

    /// Persist a weight override.
    pub fn set_weight(&mut self, name: &str, weight: i32) -> Result<()> {
        self.update(name, |entry| entry.weight = Some(weight))
    }

    /// Apply `change` to the entry for `name` and save. If the save fails
    /// the entry is restored, so memory never runs ahead of the file.
    fn update<F: FnOnce(&mut StateEntry)>(&mut self, name: &str, change: F) -> Result<()> {
        let previous = self.doc.extensions.get(name).cloned();
        change(self.doc.extensions.entry(name.to_string()).or_default());

        if let Err(e) = self.save() {
            match previous {
                Some(entry) => {
                    self.doc.extensions.insert(name.to_string(), entry);
                }
                None => {
                    self.doc.extensions.remove(name);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Write the state to its backing file; a no-op for in-memory state.
    pub fn save(&self) -> Result<()> {
        if let Some(ref path) = self.path {
            self.store.save(path, &self.doc)?;
            tracing::trace!(path = ?path, "state saved");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_uninstalled() {
        let state = PersistedExtensionState::in_memory();
        assert!(!state.is_enabled("help"));
        assert_eq!(state.schema_version("help"), SCHEMA_UNINSTALLED);
    }

    #[test]
    fn install_then_uninstall_keeps_weight() {
        let mut state = PersistedExtensionState::in_memory();
        state.set_weight("ban", 20).unwrap();
        state.mark_installed("ban", 8000).unwrap();
        assert!(state.is_enabled("ban"));
        assert_eq!(state.schema_version("ban"), 8000);
        assert!(state.entry("ban").unwrap().installed_at.is_some());

        state.mark_uninstalled("ban").unwrap();
        assert!(!state.is_enabled("ban"));
        assert_eq!(state.schema_version("ban"), SCHEMA_UNINSTALLED);
        assert_eq!(state.weight_override("ban"), Some(20));
    }

    #[test]
    fn enabled_lists_only_enabled() {
        let mut state = PersistedExtensionState::in_memory();
        state.mark_installed("help", 8000).unwrap();
        state.mark_installed("config", 8001).unwrap();
        state.mark_uninstalled("help").unwrap();
        assert_eq!(state.enabled().collect::<Vec<_>>(), vec!["config"]);
    }

    #[test]
    fn state_file_carries_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");

        let mut state = PersistedExtensionState::open(&path).unwrap();
        state.mark_installed("help", 8000).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("version = \"1.0\""));
        assert!(raw.contains("[extensions.help]"));
    }

    #[test]
    fn failed_save_rolls_back_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");

        let mut state = PersistedExtensionState::open(&path).unwrap();
        state.mark_installed("help", 8000).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        assert!(state.mark_installed("config", 8000).is_err());
        assert!(!state.is_enabled("config"));
        assert!(state.entry("config").is_none());

        assert!(state.mark_uninstalled("help").is_err());
        assert!(state.is_enabled("help"));
        assert_eq!(state.schema_version("help"), 8000);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        std::fs::write(&path, "version = \"9.9\"\n").unwrap();

        let err = PersistedExtensionState::open(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }), "got {err:?}");
    }
}
