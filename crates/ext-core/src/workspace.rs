//! Opening a workspace from disk
//!
//! Reads `extm.toml`, loads every info file below the catalog directory,
//! opens the state file, and wires shell hooks and the built-in validators
//! into an [`InstallationOrchestrator`].

use std::path::{Path, PathBuf};

use ext_extensions::ExtensionCatalog;
use ext_meta::{InfoLoader, WorkspaceConfig, load_config};

use crate::error::Result;
use crate::hooks::HookRegistry;
use crate::installer::InstallationOrchestrator;
use crate::state::PersistedExtensionState;

/// A workspace root with its loaded catalog and state.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    config: WorkspaceConfig,
    orchestrator: InstallationOrchestrator,
}

impl Workspace {
    /// Open the workspace rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or state file is invalid, two info
    /// files declare the same extension, or an info file declares a
    /// malformed dependency or version.
    pub fn open(root: &Path) -> Result<Self> {
        let config = load_config(root)?;
        let catalog_dir = config.catalog_dir(root);
        let loaded = InfoLoader::new().load_dir(&catalog_dir)?;
        tracing::debug!(
            catalog = ?catalog_dir,
            extensions = loaded.len(),
            "catalog loaded"
        );

        let catalog = ExtensionCatalog::from_infos(loaded.values().map(|l| &l.info))?;
        let hooks = HookRegistry::from_loaded(root, loaded.values());
        let state = PersistedExtensionState::open(&config.state_path(root))?;

        let profile = config.core.profile.clone();
        if let Some(ref name) = profile
            && !catalog.contains(name)
        {
            tracing::warn!(profile = %name, "active profile is not in the catalog");
        }

        let orchestrator = InstallationOrchestrator::new(catalog, state)
            .with_hooks(hooks)
            .with_active_profile(profile);

        Ok(Self {
            root: root.to_path_buf(),
            config,
            orchestrator,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &InstallationOrchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut InstallationOrchestrator {
        &mut self.orchestrator
    }

    pub fn into_orchestrator(self) -> InstallationOrchestrator {
        self.orchestrator
    }
}

