//! Per-extension install and uninstall hooks
//!
//! Hooks are resolved once, when the workspace is opened, into a
//! [`HookRegistry`]. Extensions without hooks install and uninstall
//! trivially. Info files may declare shell commands under `[hooks]`, which
//! run through [`ShellHooks`] with the extension's directory as the working
//! directory and these variables set:
//!
//! - `EXTM_EXTENSION_NAME`
//! - `EXTM_EXTENSION_VERSION` (empty when the extension declares none)
//! - `EXTM_ROOT`

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use ext_extensions::Direction;
use ext_meta::HookCommands;
use ext_meta::loader::LoadedInfo;

/// Why a hook failed.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Hook reported a failure
    #[error("{0}")]
    Failed(String),

    /// Shell command exited unsuccessfully
    #[error("command `{command}` exited with status {}{}", exit_label(.exit_code), stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Shell command could not be started
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Callbacks run for one extension as it is installed or uninstalled.
pub trait ExtensionHooks: Send + Sync {
    fn on_install(&self, name: &str) -> Result<(), HookError>;

    fn on_uninstall(&self, name: &str) -> Result<(), HookError>;
}

/// Hooks that always succeed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl ExtensionHooks for NoopHooks {
    fn on_install(&self, _name: &str) -> Result<(), HookError> {
        Ok(())
    }

    fn on_uninstall(&self, _name: &str) -> Result<(), HookError> {
        Ok(())
    }
}

/// Hooks backed by shell commands from an info file.
#[derive(Debug, Clone)]
pub struct ShellHooks {
    commands: HookCommands,
    version: Option<String>,
    root: PathBuf,
    working_dir: PathBuf,
}

impl ShellHooks {
    pub fn new(
        commands: HookCommands,
        version: Option<String>,
        root: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            commands,
            version,
            root: root.into(),
            working_dir: working_dir.into(),
        }
    }

    /// Hooks for a loaded info file, or `None` if it declares no commands.
    pub fn from_loaded(root: &Path, loaded: &LoadedInfo) -> Option<Self> {
        if loaded.info.hooks.is_empty() {
            return None;
        }
        Some(Self::new(
            loaded.info.hooks.clone(),
            loaded.info.version.clone(),
            root,
            loaded.dir(),
        ))
    }

    fn run(&self, command: Option<&str>, name: &str) -> Result<(), HookError> {
        let Some(command) = command else {
            return Ok(());
        };
        tracing::debug!(extension = name, command, "running hook command");

        let output = shell(command)
            .current_dir(&self.working_dir)
            .env("EXTM_EXTENSION_NAME", name)
            .env("EXTM_EXTENSION_VERSION", self.version.as_deref().unwrap_or(""))
            .env("EXTM_ROOT", &self.root)
            .output()
            .map_err(|source| HookError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(HookError::CommandFailed {
                command: command.to_string(),
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

impl ExtensionHooks for ShellHooks {
    fn on_install(&self, name: &str) -> Result<(), HookError> {
        self.run(self.commands.install.as_deref(), name)
    }

    fn on_uninstall(&self, name: &str) -> Result<(), HookError> {
        self.run(self.commands.uninstall.as_deref(), name)
    }
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

/// Maps extension names to their hooks.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: BTreeMap<String, Arc<dyn ExtensionHooks>>,
    fallback: Option<Arc<dyn ExtensionHooks>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shell hooks for every loaded info file that declares commands.
    pub fn from_loaded<'a, I>(root: &Path, loaded: I) -> Self
    where
        I: IntoIterator<Item = &'a LoadedInfo>,
    {
        let mut registry = Self::new();
        for info in loaded {
            if let Some(hooks) = ShellHooks::from_loaded(root, info) {
                registry.register(info.info.name.clone(), hooks);
            }
        }
        registry
    }

    /// Hooks used for extensions with no explicit registration.
    pub fn with_default<H: ExtensionHooks + 'static>(mut self, hooks: H) -> Self {
        self.fallback = Some(Arc::new(hooks));
        self
    }

    pub fn register<H: ExtensionHooks + 'static>(&mut self, name: impl Into<String>, hooks: H) {
        self.register_arc(name, Arc::new(hooks));
    }

    pub fn register_arc(&mut self, name: impl Into<String>, hooks: Arc<dyn ExtensionHooks>) {
        self.hooks.insert(name.into(), hooks);
    }

    /// Hooks for `name`, falling back to the default.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ExtensionHooks>> {
        self.hooks.get(name).or(self.fallback.as_ref())
    }

    /// Run the hook for `direction`. Missing hooks succeed.
    pub fn run(&self, name: &str, direction: Direction) -> Result<(), HookError> {
        match (self.get(name), direction) {
            (None, _) => Ok(()),
            (Some(hooks), Direction::Install) => hooks.on_install(name),
            (Some(hooks), Direction::Uninstall) => hooks.on_uninstall(name),
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("extensions", &self.hooks.keys().collect::<Vec<_>>())
            .field("has_default", &self.fallback.is_some())
            .finish()
    }
}
