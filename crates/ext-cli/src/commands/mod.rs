//! Command implementations for the extm CLI

mod batch;
mod list;
mod plan;
mod weight;

pub use batch::{run_install, run_uninstall};
pub use list::{run_list, run_status};
pub use plan::run_plan;
pub use weight::run_set_weight;

use std::path::Path;

use ext_core::Workspace;

use crate::error::{CliError, Result};

/// Open the workspace at `root`.
pub(crate) fn open(root: &Path) -> Result<Workspace> {
    if !root.is_dir() {
        return Err(CliError::user(format!(
            "Workspace root {} is not a directory",
            root.display()
        )));
    }
    tracing::debug!(root = %root.display(), "opening workspace");
    Ok(Workspace::open(root)?)
}
