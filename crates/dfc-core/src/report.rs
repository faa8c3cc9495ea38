//! Row-level validation findings.
//!
//! The scanner never stops at the first problem: each broken rule on each row
//! becomes a [`Finding`], and the whole set travels in a [`ValidationReport`].

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// A consistency rule that a row can break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Category cell is empty.
    MissingCategory,
    /// The action (grouping) identifier is empty where the profile needs it.
    MissingActionId,
    /// A pre-supplied document identifier does not match the expected format.
    MalformedDocumentId,
    /// Document title cell is empty.
    MissingTitle,
    /// Family name cell is empty.
    MissingFamilyName,
    /// A pre-supplied slug is already in use in this run.
    DuplicateSlug,
    /// A pre-supplied document identifier appears on more than one row.
    DuplicateDocumentId,
    /// A family was given a different identifier than an earlier row.
    ConflictingFamilyId,
    /// A family was given a different slug than an earlier row.
    ConflictingFamilySlug,
    /// A family identifier is attached to more than one family.
    ConflictingFamilyName,
    /// A collection was given a different identifier than an earlier row.
    ConflictingCollectionId,
    /// A typed field could not be parsed.
    InvalidField,
}

impl Rule {
    /// Stable snake-case identifier for the rule.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingCategory => "missing_category",
            Self::MissingActionId => "missing_action_id",
            Self::MalformedDocumentId => "malformed_document_id",
            Self::MissingTitle => "missing_title",
            Self::MissingFamilyName => "missing_family_name",
            Self::DuplicateSlug => "duplicate_slug",
            Self::DuplicateDocumentId => "duplicate_document_id",
            Self::ConflictingFamilyId => "conflicting_family_id",
            Self::ConflictingFamilySlug => "conflicting_family_slug",
            Self::ConflictingFamilyName => "conflicting_family_name",
            Self::ConflictingCollectionId => "conflicting_collection_id",
            Self::InvalidField => "invalid_field",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One broken rule on one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// 1-based data row number (the header is not counted).
    pub row: usize,
    /// The rule that was broken.
    pub rule: Rule,
    /// Human-readable detail.
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error on row {}: {}", self.row, self.message)
    }
}

/// Every finding collected during a scan, in row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    findings: Vec<Finding>,
}

impl ValidationReport {
    /// Create an empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            findings: Vec::new(),
        }
    }

    /// Record a finding.
    pub fn push(&mut self, row: usize, rule: Rule, message: impl Into<String>) {
        self.findings.push(Finding {
            row,
            rule,
            message: message.into(),
        });
    }

    /// Append every finding from another report.
    pub fn extend(&mut self, other: Self) {
        self.findings.extend(other.findings);
    }

    /// `true` when no rule was broken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of findings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// All findings in the order they were recorded.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Distinct rows that have at least one finding.
    #[must_use]
    pub fn rows(&self) -> BTreeSet<usize> {
        self.findings.iter().map(|f| f.row).collect()
    }

    /// Findings for a single row.
    pub fn for_row(&self, row: usize) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.row == row)
    }

    /// Whether any finding on `row` broke `rule`.
    #[must_use]
    pub fn has(&self, row: usize, rule: Rule) -> bool {
        self.for_row(row).any(|f| f.rule == rule)
    }

    /// Sort findings by row, keeping per-row order stable.
    pub fn sort(&mut self) {
        self.findings.sort_by_key(|f| f.row);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} problem(s) found on {} row(s)",
            self.findings.len(),
            self.rows().len()
        )
    }
}
