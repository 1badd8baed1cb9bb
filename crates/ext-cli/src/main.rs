//! Extension Manager CLI
//!
//! Installs and uninstalls extensions of a workspace in dependency order.

mod cli;
mod commands;
mod error;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("{} tracing already initialised", "warning:".yellow().bold());
        }
        tracing::debug!("Verbose mode enabled");
    }

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Some(cmd) => execute_command(root, cmd),
        None => {
            println!("{} Extension Manager CLI", "extm".green().bold());
            println!();
            println!("Run {} for available commands.", "extm --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(root: PathBuf, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Install {
            names,
            no_dependencies,
        } => commands::run_install(&root, &names, no_dependencies),
        Commands::Uninstall {
            names,
            no_dependents,
        } => commands::run_uninstall(&root, &names, no_dependents),
        Commands::Plan {
            direction,
            names,
            json,
        } => commands::run_plan(&root, direction, &names, json),
        Commands::List { all, json } => commands::run_list(&root, all, json),
        Commands::Status { name, json } => commands::run_status(&root, &name, json),
        Commands::SetWeight { name, weight } => commands::run_set_weight(&root, &name, weight),
    }
}
