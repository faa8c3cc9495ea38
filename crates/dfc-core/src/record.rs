//! Typed input records.
//!
//! The input table is read once into [`Record`]s. Each cell keeps its raw
//! text for verbatim output plus a typed [`FieldValue`] derived from the
//! profile's field-kind table. Role columns (category, title, family name,
//! pre-supplied identifiers, ...) are lifted into named attributes so the
//! engine never looks columns up by string.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profile::Profile;
use crate::report::{Rule, ValidationReport};
use crate::{Error, Result};

/// Declared type of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text.
    #[default]
    Text,
    /// Signed integer; an empty cell reads as `0`.
    Integer,
    /// `;`-delimited list; items are trimmed and empties dropped.
    List,
}

/// Typed value of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text value, `n/a` normalised to lowercase.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// List value.
    List(Vec<String>),
}

/// Marker for "not applicable" cells, compared case-insensitively.
pub const NA: &str = "n/a";

/// Whether `value` is the "not applicable" marker in any case.
#[must_use]
pub fn is_na(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(NA)
}

impl FieldValue {
    /// Parse `raw` as `kind`.
    ///
    /// Returns the problem description on failure so the caller can report
    /// it against the right row.
    pub fn parse(kind: FieldKind, raw: &str) -> std::result::Result<Self, String> {
        let trimmed = raw.trim();
        if is_na(trimmed) {
            return Ok(Self::Text(NA.to_string()));
        }
        match kind {
            FieldKind::Text => Ok(Self::Text(trimmed.to_string())),
            FieldKind::Integer if trimmed.is_empty() => Ok(Self::Integer(0)),
            FieldKind::Integer => trimmed
                .parse()
                .map(Self::Integer)
                .map_err(|_| format!("'{trimmed}' is not an integer")),
            FieldKind::List => Ok(Self::List(
                trimmed
                    .split(';')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
        }
    }
}

/// One cell: the raw text and its typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Text exactly as read.
    pub raw: String,
    /// Typed interpretation.
    pub value: FieldValue,
}

/// Column names of the input table with an index by name.
#[derive(Debug, Clone, Default)]
pub struct Header {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    /// Build from column names, trimming a leading byte-order mark.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let c: String = c.into();
                if i == 0 {
                    c.trim_start_matches('\u{feff}').to_string()
                } else {
                    c
                }
            })
            .collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            index.entry(column.clone()).or_insert(i);
        }
        Self { columns, index }
    }

    /// Column names in input order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of `column`, if present.
    #[must_use]
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Whether `column` is present.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }
}

/// Pre-supplied identifiers and slugs; `None` when the cell is absent or
/// blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingIds {
    /// Document identifier.
    pub document_id: Option<String>,
    /// Document slug.
    pub document_slug: Option<String>,
    /// Family identifier.
    pub family_id: Option<String>,
    /// Family slug.
    pub family_slug: Option<String>,
    /// Collection identifier.
    pub collection_id: Option<String>,
}

/// One data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based data row number.
    pub row: usize,
    /// Trimmed category.
    pub category: String,
    /// Trimmed action id; empty when the profile has none.
    pub action_id: String,
    /// Trimmed source document number; empty when the profile has none.
    pub document_number: String,
    /// Trimmed document title.
    pub title: String,
    /// Trimmed family name.
    pub family_name: String,
    /// Trimmed collection name; empty when the profile has none.
    pub collection_name: String,
    /// Trimmed identifier tag; empty when the profile has none.
    pub id_tag: String,
    /// Pre-supplied values.
    pub existing: ExistingIds,
    /// Every cell, aligned with the header.
    pub fields: Vec<Field>,
}

impl Record {
    /// Raw text of the cell at `position`, or `""` for a short row.
    #[must_use]
    pub fn raw(&self, position: usize) -> &str {
        self.fields.get(position).map_or("", |f| f.raw.as_str())
    }
}

/// The parsed table plus any field-level findings.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    /// Input header.
    pub header: Header,
    /// Records in input order.
    pub records: Vec<Record>,
    /// Type errors found while parsing; merged into the scan report.
    pub findings: ValidationReport,
}

impl RecordSet {
    /// Raw text of `column` on `record`, or `""` when the column is absent.
    #[must_use]
    pub fn raw<'a>(&self, record: &'a Record, column: &str) -> &'a str {
        self.header.position(column).map_or("", |i| record.raw(i))
    }
}

/// Reject a header that does not fit `profile`.
///
/// Missing required columns fail first, listed in profile order. Under a
/// strict profile any column outside the output set fails next.
pub fn check_header(header: &Header, profile: &Profile) -> Result<()> {
    let missing: Vec<String> = profile
        .required_columns
        .iter()
        .filter(|c| !header.contains(c))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(Error::Schema { missing });
    }

    if profile.strict_columns {
        let unknown: Vec<String> = header
            .columns()
            .iter()
            .filter(|c| !profile.knows_column(c))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(Error::UnknownColumns { columns: unknown });
        }
    }
    Ok(())
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Read and type every row of a delimited table.
pub fn parse_records<R: Read>(reader: R, profile: &Profile) -> Result<RecordSet> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let header = Header::new(csv_reader.headers()?.iter());
    check_header(&header, profile)?;

    let kinds: Vec<FieldKind> = header
        .columns()
        .iter()
        .map(|c| profile.field_kind(c))
        .collect();
    let roles = &profile.columns;
    let cell = |fields: &[Field], column: Option<&String>| -> String {
        column
            .and_then(|c| header.position(c))
            .and_then(|i| fields.get(i))
            .map(|f| f.raw.trim().to_string())
            .unwrap_or_default()
    };

    let mut records = Vec::new();
    let mut findings = ValidationReport::new();

    for (i, row) in csv_reader.records().enumerate() {
        let row_number = i + 1;
        let row = row?;

        let mut fields = Vec::with_capacity(header.columns().len());
        for (position, column) in header.columns().iter().enumerate() {
            let raw = row.get(position).unwrap_or_default().to_string();
            let kind = kinds.get(position).copied().unwrap_or_default();
            let value = match FieldValue::parse(kind, &raw) {
                Ok(value) => value,
                Err(problem) => {
                    findings.push(
                        row_number,
                        Rule::InvalidField,
                        format!("column '{column}': {problem}"),
                    );
                    FieldValue::Text(raw.trim().to_string())
                },
            };
            fields.push(Field { raw, value });
        }

        let existing = ExistingIds {
            document_id: optional(&cell(&fields, Some(&roles.document_id))),
            document_slug: optional(&cell(&fields, Some(&roles.document_slug))),
            family_id: optional(&cell(&fields, Some(&roles.family_id))),
            family_slug: optional(&cell(&fields, Some(&roles.family_slug))),
            collection_id: optional(&cell(&fields, roles.collection_id.as_ref())),
        };

        records.push(Record {
            row: row_number,
            category: cell(&fields, Some(&roles.category)),
            action_id: cell(&fields, roles.action_id.as_ref()),
            document_number: cell(&fields, roles.document_number.as_ref()),
            title: cell(&fields, Some(&roles.title)),
            family_name: cell(&fields, Some(&roles.family_name)),
            collection_name: cell(&fields, roles.collection_name.as_ref()),
            id_tag: cell(&fields, roles.id_tag.as_ref()),
            existing,
            fields,
        });
    }

    debug!(
        rows = records.len(),
        columns = header.columns().len(),
        profile = %profile.name,
        "parsed input table"
    );

    Ok(RecordSet {
        header,
        records,
        findings,
    })
}

/// Read and type every row of the table at `path`.
pub fn parse_path(path: &Path, profile: &Profile) -> Result<RecordSet> {
    let file = File::open(path)?;
    parse_records(file, profile)
}
