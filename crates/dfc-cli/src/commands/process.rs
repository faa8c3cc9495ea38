//! `dfc process`: scan, generate, write.

use anyhow::{Context, Result};
use dfc_core::{Config, Error, Reconciler, parse_path, write_to_path};
use tracing::info;

use super::resolve_profile;
use crate::cli::ProcessArgs;
use crate::error::CliError;
use crate::output::{print_report, print_summary};
use crate::utils::paths::{require_file, sibling_with_suffix};

/// Suffix appended to the input path when no output path is given.
pub const OUTPUT_SUFFIX: &str = "_processed.csv";

/// Run the full pipeline and write the processed table.
///
/// Nothing is written unless both passes succeed.
pub fn execute(args: &ProcessArgs, config: &Config) -> Result<()> {
    require_file(&args.input, "input file")?;
    let profile = resolve_profile(config, args.profile.as_deref())?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| sibling_with_suffix(&args.input, OUTPUT_SUFFIX));

    let set = parse_path(&args.input, &profile).map_err(CliError::from)?;
    info!(rows = set.records.len(), input = %args.input.display(), "read input");

    let mut reconciler = Reconciler::new(&profile, config.slug);
    if let Some(offset) = args.offset {
        reconciler = reconciler.with_row_offset(offset);
    }
    let run = match reconciler.run(&set) {
        Ok(run) => run,
        Err(Error::Validation(report)) => {
            print_report(&report, args.format)?;
            return Err(CliError::from(Error::Validation(report)).into());
        },
        Err(err) => return Err(CliError::from(err).into()),
    };

    write_to_path(&output, &profile, &set, &run.records)
        .map_err(CliError::output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    print_summary(&output, &profile, &run.summary, args.format)
}
