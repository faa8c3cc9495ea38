//! `dfc events`: list events whose action was split into several families.

use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result};
use dfc_core::{Config, Error, link_events, parse_path, scan, write_ambiguous_events};

use super::resolve_profile;
use crate::cli::EventsArgs;
use crate::error::CliError;
use crate::output::{print_linkage, print_report};
use crate::utils::paths::{require_file, sibling_with_suffix};

/// Suffix appended to the DFC input path when no output path is given.
pub const OUTPUT_SUFFIX: &str = "_grouped_events.csv";

/// Scan the DFC table, link the events table against it and write the
/// ambiguous events.
pub fn execute(args: &EventsArgs, config: &Config) -> Result<()> {
    require_file(&args.dfc_input, "DFC file")?;
    require_file(&args.events_input, "events file")?;

    // Event exports come from wider sheets than the processed table.
    let mut profile = resolve_profile(config, args.profile.as_deref())?;
    profile.strict_columns = false;

    let set = parse_path(&args.dfc_input, &profile).map_err(CliError::from)?;
    let outcome = scan(&set, &profile);
    if !outcome.report.is_empty() {
        print_report(&outcome.report, args.format)?;
        return Err(CliError::from(Error::Validation(outcome.report)).into());
    }

    let events = File::open(&args.events_input)
        .map_err(|e| CliError::from(Error::Io(e)))
        .with_context(|| format!("failed to read {}", args.events_input.display()))?;
    let linkage = link_events(events, &outcome.model).map_err(CliError::from)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| sibling_with_suffix(&args.dfc_input, OUTPUT_SUFFIX));
    let file = File::create(&output)
        .map_err(|e| CliError::output(Error::Io(e)))
        .with_context(|| format!("failed to write {}", output.display()))?;
    write_ambiguous_events(BufWriter::new(file), &linkage).map_err(CliError::output)?;

    print_linkage(&output, &linkage, args.format)
}
