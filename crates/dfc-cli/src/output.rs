//! Report rendering for text and JSON output.

use std::path::Path;

use clap::ValueEnum;
use colored::Colorize;
use dfc_core::{EventLinkage, Profile, RunSummary, ValidationReport};
use serde_json::json;

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// A single JSON object on stdout
    Json,
}

impl OutputFormat {
    /// Whether the format is meant for machines.
    #[must_use]
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Print every finding, then the summary line.
///
/// Text goes to stderr so stdout stays clean for the processed output path;
/// JSON goes to stdout.
pub fn print_report(report: &ValidationReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for finding in report.findings() {
                eprintln!(
                    "{} {}",
                    format!("Error on row {}:", finding.row).red(),
                    finding.message
                );
            }
        },
        OutputFormat::Json => {
            let value = json!({
                "status": "invalid",
                "problems": report.len(),
                "rows": report.rows(),
                "findings": report.findings(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        },
    }
    Ok(())
}

/// Print the clean-scan message.
pub fn print_clean(input: &Path, profile: &Profile, rows: usize, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "{} {} ({} rows, profile {})",
                "No problems found in".green(),
                input.display(),
                rows,
                profile.name.bold()
            );
        },
        OutputFormat::Json => {
            let value = json!({
                "status": "valid",
                "input": input.display().to_string(),
                "profile": profile.name,
                "rows": rows,
                "problems": 0,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        },
    }
    Ok(())
}

/// Print the outcome of `process`.
pub fn print_summary(
    output: &Path,
    profile: &Profile,
    summary: &RunSummary,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            let generated = summary.generated;
            println!(
                "Processed {} rows with profile {} into {}",
                summary.rows,
                profile.name.bold(),
                output.display()
            );
            println!(
                "  generated: {} document ids, {} document slugs, {} family ids, {} family slugs, {} collection ids",
                generated.document_ids,
                generated.document_slugs,
                generated.family_ids,
                generated.family_slugs,
                generated.collection_ids
            );
            println!("{}", "DONE".green().bold());
        },
        OutputFormat::Json => {
            let value = json!({
                "status": "done",
                "output": output.display().to_string(),
                "profile": profile.name,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        },
    }
    Ok(())
}

/// Print the outcome of `events`.
pub fn print_linkage(output: &Path, linkage: &EventLinkage, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "Identified {} of {} events related to known actions",
                linkage.matched, linkage.total
            );
            println!(
                "{} ambiguous events across {} actions written to {}",
                linkage.ambiguous(),
                linkage.groups.len(),
                output.display()
            );
            println!("{}", "DONE".green().bold());
        },
        OutputFormat::Json => {
            let value = json!({
                "status": "done",
                "output": output.display().to_string(),
                "events": linkage.total,
                "matched": linkage.matched,
                "ambiguous": linkage.ambiguous(),
                "groups": linkage.groups,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        },
    }
    Ok(())
}

/// Print available profiles.
pub fn print_profiles(profiles: &[(Profile, bool)], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for (profile, builtin) in profiles {
                let origin = if *builtin { "built-in" } else { "custom" };
                println!("{} ({})", profile.name.bold(), origin.dimmed());
                if !profile.description.is_empty() {
                    println!("  {}", profile.description);
                }
                println!(
                    "  grouping: {:?}, identifiers: {:?}, collections: {}, status: {}",
                    profile.grouping,
                    profile.identifier_format,
                    if profile.collections { "yes" } else { "no" },
                    profile.status.as_deref().unwrap_or("-")
                );
                println!("  document id: {}", profile.templates.document);
                println!("  family id:   {}", profile.templates.family);
                if let Some(collection) = &profile.templates.collection {
                    println!("  collection:  {collection}");
                }
            }
        },
        OutputFormat::Json => {
            let list: Vec<_> = profiles
                .iter()
                .map(|(profile, builtin)| {
                    json!({
                        "name": profile.name,
                        "builtin": builtin,
                        "profile": profile,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&list)?);
        },
    }
    Ok(())
}
