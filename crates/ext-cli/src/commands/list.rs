//! List and status commands

use std::path::Path;

use colored::Colorize;
use ext_core::InstallationOrchestrator;
use ext_extensions::{ExtensionKind, ExtensionRecord};
use serde::Serialize;

use crate::error::Result;

/// One row of `extm list --json`.
#[derive(Debug, Serialize)]
struct ExtensionRow<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: ExtensionKind,
    version: Option<String>,
    weight: i32,
    enabled: bool,
    schema_version: i32,
}

impl<'a> ExtensionRow<'a> {
    fn new(record: &'a ExtensionRecord, orchestrator: &InstallationOrchestrator) -> Self {
        Self {
            name: &record.name,
            kind: record.kind,
            version: record.version.as_ref().map(|v| v.to_string()),
            weight: record.weight,
            enabled: orchestrator.is_enabled(&record.name),
            schema_version: orchestrator.schema_version(&record.name),
        }
    }
}

/// Output of `extm status --json`.
#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    #[serde(flatten)]
    row: ExtensionRow<'a>,
    description: &'a str,
    required: bool,
    dependencies: Vec<String>,
    dependents: Vec<&'a str>,
}

/// Run the list command
pub fn run_list(root: &Path, all: bool, json: bool) -> Result<()> {
    let ws = super::open(root)?;
    let orchestrator = ws.orchestrator();

    let records: Vec<&ExtensionRecord> = if all {
        let mut records: Vec<&ExtensionRecord> = orchestrator.catalog().all().values().collect();
        records.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.name.cmp(&b.name)));
        records
    } else {
        orchestrator
            .module_list()
            .into_iter()
            .filter(|r| !r.hidden)
            .collect()
    };

    if json {
        let rows: Vec<ExtensionRow<'_>> = records
            .iter()
            .map(|r| ExtensionRow::new(r, orchestrator))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{} (use {} to add)", "No extensions enabled".dimmed(), "extm install".cyan());
        return Ok(());
    }

    println!("{}", "Extensions".bold());
    println!();
    for record in &records {
        let status = if orchestrator.is_enabled(&record.name) {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        let version = record
            .version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<24} {:<8} {:>5}  {:<10} {}",
            record.name.cyan(),
            record.kind,
            record.weight,
            version,
            status
        );
    }
    Ok(())
}

/// Run the status command
pub fn run_status(root: &Path, name: &str, json: bool) -> Result<()> {
    let ws = super::open(root)?;
    let orchestrator = ws.orchestrator();
    let record = orchestrator.catalog().get(name)?;

    let report = StatusReport {
        row: ExtensionRow::new(record, orchestrator),
        description: &record.description,
        required: record.required,
        dependencies: record.dependencies.iter().map(|d| d.to_string()).collect(),
        dependents: orchestrator.catalog().dependents_of(name),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let state = if report.row.enabled {
        "enabled".green()
    } else {
        "disabled".yellow()
    };
    println!("{}", record.name.bold());
    if !record.description.is_empty() {
        println!("{}", record.description.dimmed());
    }
    println!();
    println!("{}:    {}", "Type".dimmed(), record.kind);
    println!("{}:   {}", "State".dimmed(), state);
    println!("{}:  {}", "Schema".dimmed(), report.row.schema_version);
    println!("{}:  {}", "Weight".dimmed(), record.weight);
    if record.required {
        println!("{}: {}", "Required".dimmed(), "yes".yellow());
    }
    print_names("Depends on", &report.dependencies);
    print_names("Required by", &report.dependents);
    Ok(())
}

fn print_names<S: AsRef<str>>(label: &str, names: &[S]) {
    if names.is_empty() {
        return;
    }
    let joined: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
    println!("{}: {}", label.dimmed(), joined.join(", "));
}
