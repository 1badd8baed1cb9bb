//! Loader for extension info files.
//!
//! Scans a catalog directory recursively for `*.info.toml` files:
//!
//! ```text
//! extensions/
//!   help/
//!     help.info.toml
//!   config/
//!     config.info.toml
//!   profiles/
//!     standard.info.toml
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ext_fs::ConfigStore;

use crate::schema::ExtensionInfo;
use crate::{Error, INFO_SUFFIX, Result};

/// An info definition together with the file it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedInfo {
    pub info: ExtensionInfo,
    pub path: PathBuf,
}

impl LoadedInfo {
    /// Directory containing the info file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Loads all extension info files below a directory.
#[derive(Debug, Default)]
pub struct InfoLoader {
    store: ConfigStore,
}

impl InfoLoader {
    pub fn new() -> Self {
        Self {
            store: ConfigStore::new(),
        }
    }

    /// Load every info file below `dir`, keyed by extension name.
    ///
    /// A missing directory yields an empty catalog. Files that fail to parse
    /// or validate are logged and skipped; two files declaring the same name
    /// are an error.
    pub fn load_dir(&self, dir: &Path) -> Result<BTreeMap<String, LoadedInfo>> {
        let mut loaded: BTreeMap<String, LoadedInfo> = BTreeMap::new();
        if !dir.exists() {
            return Ok(loaded);
        }

        let mut files = Vec::new();
        collect_info_files(dir, &mut files)?;
        files.sort();

        for path in files {
            let info = match self.load_file(&path) {
                Ok(info) => info,
                Err(e) => {
                    tracing::warn!("Skipping info file {:?}: {}", path, e);
                    continue;
                }
            };

            if let Some(existing) = loaded.get(&info.name) {
                return Err(Error::DuplicateExtension {
                    name: info.name.clone(),
                    first: existing.path.clone(),
                    second: path,
                });
            }
            tracing::debug!(extension = %info.name, path = ?path, "loaded info file");
            loaded.insert(info.name.clone(), LoadedInfo { info, path });
        }

        Ok(loaded)
    }

    /// Load and validate a single info file.
    ///
    /// The declared name must match the file name stem.
    pub fn load_file(&self, path: &Path) -> Result<ExtensionInfo> {
        let info: ExtensionInfo = self.store.load(path)?;
        info.validate()?;

        let expected = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(INFO_SUFFIX))
            .unwrap_or_default();
        if info.name != expected {
            return Err(Error::NameMismatch {
                path: path.to_path_buf(),
                declared: info.name,
                expected: expected.to_string(),
            });
        }
        Ok(info)
    }
}

fn collect_info_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::Fs(ext_fs::Error::io(dir, e)))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_info_files(&path, out)?;
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(INFO_SUFFIX))
        {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_nonexistent_dir() {
        let loader = InfoLoader::new();
        let loaded = loader.load_dir(Path::new("/nonexistent/extensions")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_loaded_info_dir() {
        let loaded = LoadedInfo {
            info: ExtensionInfo::module("help"),
            path: PathBuf::from("/ext/help/help.info.toml"),
        };
        assert_eq!(loaded.dir(), Path::new("/ext/help"));
    }
}
