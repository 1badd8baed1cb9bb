//! Workspace configuration loaded from `extm.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ext_fs::ConfigStore;

use crate::error::{Error, Result};

/// File name of the workspace configuration.
pub const CONFIG_FILE: &str = "extm.toml";

/// Configuration files above this size are rejected.
pub const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// The `[core]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Directory holding `*.info.toml` files, relative to the workspace root.
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,
    /// Persisted extension state, relative to the workspace root.
    #[serde(default = "default_state")]
    pub state: PathBuf,
    /// Active installation profile.
    #[serde(default)]
    pub profile: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            state: default_state(),
            profile: None,
        }
    }
}

fn default_catalog() -> PathBuf {
    PathBuf::from("extensions")
}

fn default_state() -> PathBuf {
    PathBuf::from(".extm").join("state.toml")
}

/// Top-level workspace configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub core: CoreConfig,
}

impl WorkspaceConfig {
    /// Catalog directory resolved against `root`.
    pub fn catalog_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.core.catalog)
    }

    /// State file resolved against `root`.
    pub fn state_path(&self, root: &Path) -> PathBuf {
        root.join(&self.core.state)
    }
}

/// Load `extm.toml` from the workspace root.
///
/// A missing file yields the default configuration.
pub fn load_config(root: &Path) -> Result<WorkspaceConfig> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        tracing::debug!(path = ?path, "no workspace config, using defaults");
        return Ok(WorkspaceConfig::default());
    }

    let size = fs::metadata(&path)
        .map_err(|e| Error::Fs(ext_fs::Error::io(&path, e)))?
        .len();
    if size > MAX_CONFIG_SIZE {
        return Err(Error::ConfigTooLarge {
            path,
            size,
            max: MAX_CONFIG_SIZE,
        });
    }

    let config: WorkspaceConfig = ConfigStore::new().load(&path)?;
    if let Some(ref profile) = config.core.profile {
        crate::schema::validate_machine_name(profile).map_err(|e| Error::InvalidConfig {
            path: path.clone(),
            message: e.to_string(),
        })?;
    }
    Ok(config)
}
