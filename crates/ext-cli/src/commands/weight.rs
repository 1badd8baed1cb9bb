//! Set-weight command

use std::path::Path;

use colored::Colorize;

use crate::error::Result;

/// Run the set-weight command
pub fn run_set_weight(root: &Path, name: &str, weight: i32) -> Result<()> {
    let mut ws = super::open(root)?;
    ws.orchestrator_mut().set_weight(name, weight)?;
    println!("{} {} weight set to {}", "ok".green().bold(), name.cyan(), weight);
    Ok(())
}
