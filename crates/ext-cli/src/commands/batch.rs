//! Install and uninstall commands

use std::path::Path;

use colored::Colorize;
use ext_core::{BatchReport, Error as CoreError, InstallOptions, UninstallOptions};

use crate::error::Result;

/// Run the install command
pub fn run_install(root: &Path, names: &[String], no_dependencies: bool) -> Result<()> {
    let mut ws = super::open(root)?;
    let options = InstallOptions {
        enable_dependencies: !no_dependencies,
    };

    let outcome = ws.orchestrator_mut().install_with(names, options);
    report(outcome, "Installed", "already enabled")
}

/// Run the uninstall command
pub fn run_uninstall(root: &Path, names: &[String], no_dependents: bool) -> Result<()> {
    let mut ws = super::open(root)?;
    let options = UninstallOptions {
        uninstall_dependents: !no_dependents,
    };

    let outcome = ws.orchestrator_mut().uninstall_with(names, options);
    report(outcome, "Uninstalled", "not enabled")
}

fn report(
    outcome: std::result::Result<BatchReport, CoreError>,
    verb: &str,
    skipped_label: &str,
) -> Result<()> {
    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            let completed = e.completed();
            if !completed.is_empty() {
                println!(
                    "{} {}",
                    format!("{verb} before failure:").yellow().bold(),
                    completed.join(", ")
                );
            }
            return Err(e.into());
        }
    };

    if report.executed.is_empty() {
        println!("{}", "Nothing to do.".dimmed());
    } else {
        for name in &report.executed {
            println!("{} {}", "+".green(), name.cyan());
        }
        println!();
        println!("{} {} extension(s).", verb.green().bold(), report.executed.len());
    }
    for name in &report.skipped {
        println!("  {} ({})", name.dimmed(), skipped_label);
    }
    tracing::debug!(batch = %report.id, "batch committed");
    Ok(())
}
