//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Extract display-ready structured views from JSON records using declarative schemas
#[derive(Parser, Debug)]
#[command(name = "sdata")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory for local config lookup (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract a structured view from a record
    Extract {
        /// Schema name (file stem inside the schema directory)
        schema: String,
        /// JSON record file
        #[arg(value_hint = ValueHint::FilePath)]
        record: PathBuf,
        /// JSON object of related documents keyed by relation path
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        relations: Option<PathBuf>,
        /// Output format (default from config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Inspect schemas
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// List available schemas
    List,
    /// Show a schema as a tree
    Show {
        /// Schema name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Print a template config file
    Template,
}
