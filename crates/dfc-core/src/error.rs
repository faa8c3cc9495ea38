//! Error types and handling for dfc-core operations.
//!
//! Every fallible operation in the engine returns [`Result<T, Error>`]. Errors
//! fall into a small number of categories that the CLI maps onto process exit
//! codes:
//!
//! - **Schema**: the input table is missing required columns or carries
//!   columns the profile does not know about. Raised before any row is read.
//! - **Validation**: one or more rows break a consistency rule. The scanner
//!   collects every finding before failing, so the report is complete.
//! - **Generation**: a unique slug could not be found, or a synthesized
//!   identifier collides with one already assigned. Fatal for the whole run.
//! - **I/O, CSV, Config, Serialization**: ambient failures around the engine.
//!
//! ```rust
//! use dfc_core::Error;
//!
//! let err = Error::SlugExhausted { base: "climate-act".into(), attempts: 100 };
//! assert_eq!(err.category(), "generation");
//! assert!(err.to_string().contains("climate-act"));
//! ```

use thiserror::Error;

use crate::report::ValidationReport;

/// The main error type for dfc-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading the input table, writing the processed output and
    /// reading configuration files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The delimited input could not be decoded.
    ///
    /// Raised for malformed quoting, invalid UTF-8 and similar problems in
    /// the table itself, as opposed to the values it holds.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Required columns are absent from the input header.
    #[error("Schema error: required columns are missing: {}", .missing.join(", "))]
    Schema {
        /// Missing column names, in profile order.
        missing: Vec<String>,
    },

    /// The input header carries columns the profile does not recognise.
    #[error("Schema error: unrecognised columns: {}", .columns.join(", "))]
    UnknownColumns {
        /// Unrecognised column names, in header order.
        columns: Vec<String>,
    },

    /// One or more rows failed consistency checks.
    ///
    /// The report holds every finding from the scan, not just the first.
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    /// No unique slug could be generated within the attempt bound.
    #[error("Failed to generate a slug for '{base}' after {attempts} attempts")]
    SlugExhausted {
        /// Slug base that kept colliding.
        base: String,
        /// Number of suffixes drawn.
        attempts: usize,
    },

    /// A synthesized identifier is already assigned to something else.
    #[error("Row {row}: generated {kind} identifier '{id}' is already assigned")]
    IdentifierCollision {
        /// Row whose identifier could not be synthesized.
        row: usize,
        /// Which identifier was being generated (`document`, `family`, ...).
        kind: &'static str,
        /// The colliding identifier.
        id: String,
    },

    /// The row offset pushes a row number past the largest representable
    /// value.
    #[error("Row offset {offset} is too large for row {row}")]
    RowOffsetOverflow {
        /// Requested offset.
        offset: usize,
        /// Row that could not be numbered.
        row: usize,
    },

    /// An identifier template could not be parsed or rendered.
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => Self::Io(io),
                other => Self::Csv(format!("{other:?}")),
            }
        } else {
            Self::Csv(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Get the error category as a string identifier.
    ///
    /// - `"io"` - File system and I/O operations
    /// - `"csv"` - Malformed delimited input
    /// - `"schema"` - Missing or unrecognised columns
    /// - `"validation"` - Row-level consistency findings
    /// - `"generation"` - Slug exhaustion or identifier collisions
    /// - `"usage"` - Run options that cannot be applied
    /// - `"template"` - Identifier template problems
    /// - `"config"` - Configuration and profiles
    /// - `"serialization"` - Data format conversion
    /// - `"other"` - Uncategorized errors
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Csv(_) => "csv",
            Self::Schema { .. } | Self::UnknownColumns { .. } => "schema",
            Self::Validation(_) => "validation",
            Self::SlugExhausted { .. } | Self::IdentifierCollision { .. } => "generation",
            Self::RowOffsetOverflow { .. } => "usage",
            Self::Template(_) => "template",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }

    /// The validation report carried by this error, if any.
    #[must_use]
    pub const fn validation_report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Validation(report) => Some(report),
            _ => None,
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
