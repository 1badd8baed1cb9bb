//! Plan command: resolve a batch without running it

use std::path::Path;

use colored::Colorize;
use ext_extensions::{ResolutionPlan, UninstallVeto};
use serde::Serialize;

use crate::cli::PlanDirection;
use crate::error::Result;

#[derive(Serialize)]
struct PlanOutput<'a> {
    #[serde(flatten)]
    plan: &'a ResolutionPlan,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vetoes: Vec<UninstallVeto>,
}

/// Run the plan command
pub fn run_plan(root: &Path, direction: PlanDirection, names: &[String], json: bool) -> Result<()> {
    let ws = super::open(root)?;
    let orchestrator = ws.orchestrator();
    let plan = match direction {
        PlanDirection::Install => orchestrator.plan_install(names)?,
        PlanDirection::Uninstall => orchestrator.plan_uninstall(names)?,
    };

    let vetoes = match direction {
        PlanDirection::Install => Vec::new(),
        PlanDirection::Uninstall => orchestrator.validate_uninstall(&plan),
    };

    if json {
        let output = PlanOutput {
            plan: &plan,
            vetoes,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} {}", "Plan:".bold(), plan.direction());
    for (i, name) in plan.iter().enumerate() {
        let marker = match direction {
            PlanDirection::Install if orchestrator.is_enabled(name) => " (enabled)".dimmed(),
            _ => "".normal(),
        };
        println!("  {:>3}. {}{}", i + 1, name.cyan(), marker);
    }
    for name in plan.skipped() {
        println!("  {} {} (not enabled)", "-".dimmed(), name.dimmed());
    }
    if !vetoes.is_empty() {
        println!("{}", "Blocked:".red().bold());
        for veto in &vetoes {
            println!("  {} {}", "x".red(), veto.reason);
        }
    }
    Ok(())
}
