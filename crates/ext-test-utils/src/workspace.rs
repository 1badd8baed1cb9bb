//! [`TestWorkspace`] builder for on-disk scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary workspace root with helpers for writing info files and
/// `extm.toml`.
///
/// # Example
///
/// ```rust,no_run
/// use ext_test_utils::workspace::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// ws.module("help", &[]);
/// ws.module("config", &["help"]);
/// ws.assert_file_exists("extensions/config/config.info.toml");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Default catalog directory.
    pub fn catalog_dir(&self) -> PathBuf {
        self.root().join("extensions")
    }

    /// Default state file.
    pub fn state_path(&self) -> PathBuf {
        self.root().join(".extm").join("state.toml")
    }

    /// Write `extm.toml`.
    pub fn config(&self, content: &str) {
        fs::write(self.root().join("extm.toml"), content).unwrap();
    }

    /// Write `extensions/<name>/<name>.info.toml` verbatim.
    pub fn info(&self, name: &str, content: &str) -> PathBuf {
        let dir = self.catalog_dir().join(name);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}.info.toml"));
        fs::write(&path, content).unwrap();
        path
    }

    /// Write a minimal module info file.
    pub fn module(&self, name: &str, deps: &[&str]) -> PathBuf {
        let deps = deps
            .iter()
            .map(|d| format!("\"{d}\""))
            .collect::<Vec<_>>()
            .join(", ");
        self.info(
            name,
            &format!("name = \"{name}\"\ntype = \"module\"\ndependencies = [{deps}]\n"),
        )
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to the root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}
