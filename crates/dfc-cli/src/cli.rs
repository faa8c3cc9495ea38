//! # CLI Structure and Argument Parsing
//!
//! ```bash
//! # Validate and backfill identifiers and slugs
//! dfc process input.csv
//! dfc process submissions.csv --profile unfccc --offset 1200 -o ready.csv
//!
//! # Report problems without generating anything
//! dfc check input.csv --format json
//!
//! # List events whose action was split into several families
//! dfc events dfc.csv events.csv
//!
//! # Show available profiles
//! dfc profiles
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Main CLI structure for the `dfc` command.
#[derive(Parser, Clone, Debug)]
#[command(name = "dfc")]
#[command(version)]
#[command(
    about = "dfc - identifier and slug reconciliation for Document/Family/Collection tables",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "DFC_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Validate a table and backfill missing identifiers and slugs
    Process(ProcessArgs),

    /// Validate a table and report every problem without writing output
    Check(CheckArgs),

    /// List events whose action maps to more than one family
    Events(EventsArgs),

    /// List available profiles
    Profiles {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Arguments for `dfc process`.
#[derive(Args, Clone, Debug)]
pub struct ProcessArgs {
    /// Input table
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output path (defaults to `<INPUT>_processed.csv`)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Profile name (defaults to the configured default)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Added to row numbers when rendering identifiers
    #[arg(long, value_name = "N")]
    pub offset: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for `dfc check`.
#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    /// Input table
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Profile name (defaults to the configured default)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for `dfc events`.
#[derive(Args, Clone, Debug)]
pub struct EventsArgs {
    /// Document/Family/Collection table with pre-supplied family ids
    #[arg(value_name = "DFC_INPUT")]
    pub dfc_input: PathBuf,

    /// Events table
    #[arg(value_name = "EVENTS_INPUT")]
    pub events_input: PathBuf,

    /// Output path (defaults to `<DFC_INPUT>_grouped_events.csv`)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Profile name (defaults to the configured default)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Cli {
    /// Output format selected by the subcommand.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        match &self.command {
            Commands::Process(args) => args.format,
            Commands::Check(args) => args.format,
            Commands::Events(args) => args.format,
            Commands::Profiles { format } => *format,
        }
    }
}
