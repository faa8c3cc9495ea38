#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

mod common;

use common::{CCLW_COLUMNS, UNFCCC_COLUMNS, dfc_cmd, unfccc_row, write_table};
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn process_writes_output_and_prints_done() {
    // Given: a valid unfccc table
    let dir = tempfile::tempdir().unwrap();
    let a = unfccc_row("Nationally Determined Contribution", "NDC");
    let b = unfccc_row("Updated NDC", "NDC");
    let input = write_table(
        &dir.path().join("input.csv"),
        &UNFCCC_COLUMNS,
        &[a.as_slice(), b.as_slice()],
    );

    // When: processing it
    dfc_cmd(dir.path())
        .args(["process", "--profile", "unfccc"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("DONE"));

    // Then: the sibling output carries generated identifiers
    let output = std::fs::read_to_string(dir.path().join("input.csv_processed.csv")).unwrap();
    let mut lines = output.lines();
    let header = lines.next().unwrap();
    assert!(header.contains("CPR Document Slug"));
    assert!(header.contains("CPR Family ID"));
    assert!(output.contains("CCLW.party.1.0"));
    assert!(output.contains("CCLW.party.2.0"));
    assert!(output.contains("UNFCCC.family.0.0"));
    assert!(output.contains("PUBLISHED"));
    assert_eq!(lines.count(), 2);
}

#[test]
fn process_with_offset_and_explicit_output() {
    let dir = tempfile::tempdir().unwrap();
    let a = unfccc_row("Plan", "Plan");
    let input = write_table(&dir.path().join("in.csv"), &UNFCCC_COLUMNS, &[a.as_slice()]);
    let output = dir.path().join("ready.csv");

    dfc_cmd(dir.path())
        .args(["process", "-p", "unfccc", "--offset", "1200", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("CCLW.party.1201.0"));
    assert!(written.contains("UNFCCC.family.1200.0"));
}

#[test]
fn process_rejects_offset_past_row_range() {
    // Given: an offset that cannot be added to any row number
    let dir = tempfile::tempdir().unwrap();
    let a = unfccc_row("Plan", "Plan");
    let input = write_table(&dir.path().join("in.csv"), &UNFCCC_COLUMNS, &[a.as_slice()]);
    let output = dir.path().join("ready.csv");

    // When: processing with it
    dfc_cmd(dir.path())
        .args(["process", "-p", "unfccc", "--offset", &usize::MAX.to_string(), "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        // Then: a usage error, not a crash, and nothing is written
        .code(2)
        .stderr(predicate::str::contains("Row offset"));
    assert!(!output.exists());
}

#[test]
fn process_into_missing_directory_is_io_error() {
    // Given: a valid table and an output path under a directory that does not exist
    let dir = tempfile::tempdir().unwrap();
    let a = unfccc_row("Plan", "Plan");
    let input = write_table(&dir.path().join("in.csv"), &UNFCCC_COLUMNS, &[a.as_slice()]);
    let output = dir.path().join("missing").join("ready.csv");

    // When: processing into it
    dfc_cmd(dir.path())
        .args(["process", "-p", "unfccc", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        // Then: the write failure exits as I/O, not as a missing input
        .code(5)
        .stderr(predicate::str::contains("failed to write"));
}

#[test]
fn process_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    let a = unfccc_row("Plan", "Plan");
    let input = write_table(&dir.path().join("in.csv"), &UNFCCC_COLUMNS, &[a.as_slice()]);

    let out = dfc_cmd(dir.path())
        .args(["process", "-p", "unfccc", "--format", "json"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success());

    let json: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["status"], "done");
    assert_eq!(json["profile"], "unfccc");
    assert_eq!(json["summary"]["rows"], 1);
}

#[test]
fn schema_failure_exits_1_without_output() {
    // Given: a table missing required columns
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    std::fs::write(&input, "Category,Document Title\nParty,Plan\n").unwrap();

    // Then: the run stops before writing anything
    dfc_cmd(dir.path())
        .args(["process", "-p", "unfccc"])
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Family Name"));
    assert!(!dir.path().join("input.csv_processed.csv").exists());
}

#[test]
fn unknown_column_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let mut columns = UNFCCC_COLUMNS.to_vec();
    columns.push("Surprise");
    let a = unfccc_row("Plan", "Plan");
    let input = write_table(&dir.path().join("in.csv"), &columns, &[a.as_slice()]);

    dfc_cmd(dir.path())
        .args(["check", "-p", "unfccc"])
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Surprise"));
}

#[test]
fn duplicate_slug_exits_10_and_cites_rows() {
    // Given: two rows supplying the same document slug
    let dir = tempfile::tempdir().unwrap();
    let columns = [UNFCCC_COLUMNS.as_slice(), &["CPR Document Slug"]].concat();
    let mut a = unfccc_row("Plan", "Plan");
    a.push(("CPR Document Slug", "plan_0001"));
    let mut b = unfccc_row("Plan B", "Plan");
    b.push(("CPR Document Slug", "plan_0001"));
    let c = unfccc_row("", "Plan");
    let input = write_table(
        &dir.path().join("input.csv"),
        &columns,
        &[a.as_slice(), b.as_slice(), c.as_slice()],
    );

    // Then: every failing row is reported and no output is written
    dfc_cmd(dir.path())
        .args(["process", "-p", "unfccc"])
        .arg(&input)
        .assert()
        .code(10)
        .stdout(predicate::str::contains("DONE").not())
        .stderr(predicate::str::contains("Error on row 2:"))
        .stderr(predicate::str::contains("Error on row 3:"));
    assert!(!dir.path().join("input.csv_processed.csv").exists());
}

#[test]
fn check_reports_clean_table() {
    let dir = tempfile::tempdir().unwrap();
    let a = unfccc_row("Plan", "Plan");
    let input = write_table(&dir.path().join("in.csv"), &UNFCCC_COLUMNS, &[a.as_slice()]);

    dfc_cmd(dir.path())
        .args(["check", "-p", "unfccc"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("No problems found"));
    assert!(!dir.path().join("in.csv_processed.csv").exists());
}

#[test]
fn check_json_lists_findings() {
    let dir = tempfile::tempdir().unwrap();
    let a = unfccc_row("", "Plan");
    let input = write_table(&dir.path().join("in.csv"), &UNFCCC_COLUMNS, &[a.as_slice()]);

    let out = dfc_cmd(dir.path())
        .args(["check", "-p", "unfccc", "--format", "json"])
        .arg(&input)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(10));

    let json: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["status"], "invalid");
    assert_eq!(json["problems"], 1);
    assert_eq!(json["rows"][0], 1);
}

#[test]
fn missing_input_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    dfc_cmd(dir.path())
        .args(["process"])
        .arg(dir.path().join("absent.csv"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("absent.csv"));
}

#[test]
fn unknown_profile_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let a = unfccc_row("Plan", "Plan");
    let input = write_table(&dir.path().join("in.csv"), &UNFCCC_COLUMNS, &[a.as_slice()]);

    dfc_cmd(dir.path())
        .args(["check", "--profile", "nope"])
        .arg(&input)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("cclw, unfccc"));
}

#[test]
fn malformed_config_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "defaults = [").unwrap();

    dfc_cmd(dir.path()).arg("profiles").assert().code(2);
}

#[test]
fn custom_profile_from_config() {
    // Given: a config file defining an extra profile and making it the default
    let dir = tempfile::tempdir().unwrap();
    let config = r#"
[defaults]
profile = "example"

[[profiles]]
name = "example"
required_columns = ["Category", "Title", "Family"]
extra_columns = ["Doc ID", "Doc Slug", "Family ID", "Family Slug"]
grouping = "family_name"
identifier_format = "free"

[profiles.columns]
category = "Category"
title = "Title"
family_name = "Family"
document_id = "Doc ID"
document_slug = "Doc Slug"
family_id = "Family ID"
family_slug = "Family Slug"

[profiles.templates]
document = "EX.{category}.{row}.0"
family = "EX.family.{index}.0"
"#;
    std::fs::write(dir.path().join("config.toml"), config).unwrap();
    let input = write_table(
        &dir.path().join("in.csv"),
        &["Category", "Title", "Family"],
        &[&[("Category", "Law"), ("Title", "Act"), ("Family", "Act")]],
    );

    // When: processing without naming a profile
    dfc_cmd(dir.path()).arg("process").arg(&input).assert().success();

    // Then: the configured profile's templates were used
    let written = std::fs::read_to_string(dir.path().join("in.csv_processed.csv")).unwrap();
    assert!(written.starts_with("Category,Title,Family,Doc ID,Doc Slug,Family ID,Family Slug"));
    assert!(written.contains("EX.law.1.0"));
    assert!(written.contains("EX.family.0.0"));
}

#[test]
fn profiles_json_lists_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let out = dfc_cmd(dir.path())
        .args(["profiles", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let json: Value = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["cclw", "unfccc"]);
    assert_eq!(json[0]["builtin"], true);
}

#[test]
fn events_lists_ambiguous_actions() {
    // Given: action 1234 split into two families, action 99 kept whole
    let dir = tempfile::tempdir().unwrap();
    let dfc = write_table(
        &dir.path().join("dfc.csv"),
        &CCLW_COLUMNS,
        &[
            &[
                ("ID", "1234"),
                ("Document ID", "1"),
                ("Category", "Legislative"),
                ("Document title", "Act"),
                ("Family name", "Act"),
                ("CPR Family ID", "CCLW.family.1234.0"),
            ],
            &[
                ("ID", "1234"),
                ("Document ID", "2"),
                ("Category", "Legislative"),
                ("Document title", "Energy Law"),
                ("Family name", "Energy Law"),
                ("CPR Family ID", "CCLW.family.1234.1"),
            ],
            &[
                ("ID", "99"),
                ("Document ID", "3"),
                ("Category", "Executive"),
                ("Document title", "Plan"),
                ("Family name", "Plan"),
                ("CPR Family ID", "CCLW.family.99.0"),
            ],
        ],
    );
    let events = dir.path().join("events.csv");
    std::fs::write(
        &events,
        "Id,Eventable type,Eventable Id,Eventable name,Event type,Title,Description,Date,Url\n\
         1,Legislation,1234,Act,Passed,Passed,,2020-01-01,\n\
         2,Legislation,99,Plan,Passed,Passed,,2021-01-01,\n\
         3,Legislation,1234,Act,Amended,Amended,,2022-01-01,\n\
         4,Legislation,555,Other,Passed,Passed,,2023-01-01,\n",
    )
    .unwrap();

    // When: linking events
    dfc_cmd(dir.path())
        .args(["events", "-p", "cclw"])
        .arg(&dfc)
        .arg(&events)
        .assert()
        .success()
        .stdout(predicate::str::contains("Identified 3 of 4 events"))
        .stdout(predicate::str::contains("DONE"));

    // Then: only the split action's events are written, with its families
    let written = std::fs::read_to_string(dir.path().join("dfc.csv_grouped_events.csv")).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert!(lines[0].ends_with("Url,Action ID,Family IDs"));
    assert!(lines[1].starts_with("1,Legislation,1234"));
    assert!(lines[1].ends_with("1234,CCLW.family.1234.0;CCLW.family.1234.1"));
    assert!(lines[2].starts_with("3,Legislation,1234"));
    assert_eq!(lines[3].trim_matches(','), "");
    assert_eq!(lines.len(), 4);
}

#[test]
fn events_missing_file_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let a = unfccc_row("Plan", "Plan");
    let dfc = write_table(&dir.path().join("dfc.csv"), &UNFCCC_COLUMNS, &[a.as_slice()]);

    dfc_cmd(dir.path())
        .arg("events")
        .arg(&dfc)
        .arg(dir.path().join("absent.csv"))
        .assert()
        .code(3);
}
