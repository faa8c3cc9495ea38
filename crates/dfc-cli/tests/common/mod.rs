#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use assert_cmd::Command;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Required columns of the `unfccc` profile.
#[allow(dead_code)]
pub const UNFCCC_COLUMNS: [&str; 15] = [
    "Category",
    "Submission Type",
    "Family Name",
    "Document Title",
    "Documents",
    "Author",
    "Author Type",
    "Geography",
    "Geography ISO",
    "Date",
    "Document Role",
    "Document Variant",
    "Language",
    "CPR Collection ID",
    "CPR Document ID",
];

/// Required columns of the `cclw` profile plus the family id column.
#[allow(dead_code)]
pub const CCLW_COLUMNS: [&str; 22] = [
    "ID",
    "Document ID",
    "Collection name",
    "Collection summary",
    "Document title",
    "Family name",
    "Family summary",
    "Document role",
    "Document variant",
    "Geography ISO",
    "Documents",
    "Category",
    "Sectors",
    "Instruments",
    "Frameworks",
    "Responses",
    "Natural Hazards",
    "Document Type",
    "Language",
    "Keywords",
    "Geography",
    "CPR Family ID",
];

/// Create a configured `dfc` command that never reads the user's config.
#[allow(dead_code)]
pub fn dfc_cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dfc"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("DFC_CONFIG", config_dir.join("config.toml"));
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Write a comma-separated table; each row lists `(column, value)` pairs and
/// unnamed columns stay empty. Values must not contain commas or quotes.
#[allow(dead_code)]
pub fn write_table(path: &Path, columns: &[&str], rows: &[&[(&str, &str)]]) -> PathBuf {
    let mut text = columns.join(",");
    text.push('\n');
    for row in rows {
        let line: Vec<&str> = columns
            .iter()
            .map(|c| {
                row.iter()
                    .find(|(name, _)| name == c)
                    .map_or("", |(_, value)| *value)
            })
            .collect();
        text.push_str(&line.join(","));
        text.push('\n');
    }
    std::fs::write(path, text).expect("write table");
    path.to_path_buf()
}

/// A complete `unfccc` row with the given title and family.
#[allow(dead_code)]
pub fn unfccc_row<'a>(title: &'a str, family: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("Category", "Party"),
        ("Author Type", "Party"),
        ("Document Title", title),
        ("Family Name", family),
    ]
}
