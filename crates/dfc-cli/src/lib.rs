//! dfc CLI - identifier and slug reconciliation for Document/Family/Collection tables.
//!
//! The binary entry point lives in `main.rs`; everything else is here so
//! command handling can be unit tested.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
pub mod error;
mod output;
mod utils;

use cli::{Cli, Commands};
use utils::initialize_logging;

/// Execute the dfc CLI with the current process arguments.
///
/// # Errors
///
/// Returns an error if configuration loading or command execution fails.
/// Use [`error::exit_code_from_error`] to turn it into an exit code.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;

    let config = commands::load_config(cli.config.as_deref())?;
    debug!(
        default_profile = %config.defaults.profile,
        custom_profiles = config.profiles.len(),
        "configuration loaded"
    );

    execute_command(&cli, &config)
}

fn execute_command(cli: &Cli, config: &dfc_core::Config) -> Result<()> {
    match &cli.command {
        Commands::Process(args) => commands::process(args, config),
        Commands::Check(args) => commands::check(args, config),
        Commands::Events(args) => commands::events(args, config),
        Commands::Profiles { format } => commands::profiles(config, *format),
    }
}
