//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Extension Manager - install and uninstall extensions in dependency order
#[derive(Parser, Debug)]
#[command(name = "extm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install extensions and their dependencies
    ///
    /// Examples:
    ///   extm install color            # Installs help, config, color
    ///   extm install config help --no-dependencies
    Install {
        /// Extensions to install
        #[arg(required = true)]
        names: Vec<String>,

        /// Fail instead of installing missing dependencies
        #[arg(long)]
        no_dependencies: bool,
    },

    /// Uninstall extensions and every enabled extension depending on them
    Uninstall {
        /// Extensions to uninstall
        #[arg(required = true)]
        names: Vec<String>,

        /// Fail instead of uninstalling enabled dependents
        #[arg(long)]
        no_dependents: bool,
    },

    /// Show the order a batch would run in, without running it
    Plan {
        /// Batch direction
        #[arg(value_enum)]
        direction: PlanDirection,

        /// Extensions to plan for
        #[arg(required = true)]
        names: Vec<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List enabled extensions
    List {
        /// Include disabled and hidden extensions
        #[arg(short, long)]
        all: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show one extension's state and relations
    Status {
        /// Extension name
        name: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Change an extension's weight
    SetWeight {
        /// Extension name
        name: String,

        /// New weight; lower goes first among unordered extensions
        #[arg(allow_hyphen_values = true)]
        weight: i32,
    },
}

/// Direction of a planned batch
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanDirection {
    Install,
    Uninstall,
}
