//! `dfc check`: scan only.

use anyhow::Result;
use dfc_core::{Config, Error, parse_path, scan};

use super::resolve_profile;
use crate::cli::CheckArgs;
use crate::error::CliError;
use crate::output::{print_clean, print_report};
use crate::utils::paths::require_file;

/// Validate the input and print every finding.
pub fn execute(args: &CheckArgs, config: &Config) -> Result<()> {
    require_file(&args.input, "input file")?;
    let profile = resolve_profile(config, args.profile.as_deref())?;

    let set = parse_path(&args.input, &profile).map_err(CliError::from)?;
    let outcome = scan(&set, &profile);

    if outcome.report.is_empty() {
        return print_clean(&args.input, &profile, set.records.len(), args.format);
    }
    print_report(&outcome.report, args.format)?;
    Err(CliError::from(Error::Validation(outcome.report)).into())
}
