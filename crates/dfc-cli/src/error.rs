//! CLI error handling with semantic exit codes.
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Command completed, `DONE` printed |
//! | 1 | `Schema` | Required columns missing or unknown columns present |
//! | 2 | `Usage` | Invalid arguments, configuration or profile |
//! | 3 | `NotFound` | Input file or profile does not exist |
//! | 4 | `Generation` | Slug exhaustion or identifier collision |
//! | 5 | `Io` | Reading or writing a file failed |
//! | 6 | `Internal` | Unexpected error |
//! | 10 | `Validation` | One or more rows failed consistency checks |
//!
//! ```bash
//! dfc process input.csv
//! case $? in
//!     0) echo "processed" ;;
//!     10) echo "fix the reported rows" ;;
//!     *) echo "other error" ;;
//! esac
//! ```

use std::fmt;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// The input table does not have the profile's columns (exit code 1).
    Schema = 1,
    /// Invalid arguments, configuration or profile definition (exit code 2).
    Usage = 2,
    /// A named file or profile does not exist (exit code 3).
    NotFound = 3,
    /// A slug or identifier could not be generated (exit code 4).
    Generation = 4,
    /// File system failure (exit code 5).
    Io = 5,
    /// Unexpected error (exit code 6).
    Internal = 6,
    /// Rows failed consistency checks (exit code 10).
    Validation = 10,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Get a short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Schema => "schema error",
            Self::Usage => "usage error",
            Self::NotFound => "not found",
            Self::Generation => "generation error",
            Self::Io => "io error",
            Self::Internal => "internal error",
            Self::Validation => "validation error",
        }
    }

    /// Category of an engine error.
    #[must_use]
    pub fn from_core(err: &dfc_core::Error) -> Self {
        use dfc_core::Error;
        match err {
            Error::Schema { .. } | Error::UnknownColumns { .. } => Self::Schema,
            Error::Validation(_) => Self::Validation,
            Error::SlugExhausted { .. } | Error::IdentifierCollision { .. } => Self::Generation,
            Error::Io(io) if io.kind() == std::io::ErrorKind::NotFound => Self::NotFound,
            Error::Io(_) | Error::Csv(_) => Self::Io,
            Error::Template(_) | Error::Config(_) | Error::RowOffsetOverflow { .. } => Self::Usage,
            Error::Serialization(_) | Error::Other(_) => Self::Internal,
        }
    }

    /// Infer the error category from an error message.
    ///
    /// Fallback for errors that were neither categorized explicitly nor
    /// raised by the engine.
    #[must_use]
    pub fn infer_from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("not found")
            || msg_lower.contains("no such")
            || msg_lower.contains("does not exist")
        {
            return Self::NotFound;
        }

        if msg_lower.contains("permission denied")
            || msg_lower.contains("failed to write")
            || msg_lower.contains("failed to read")
        {
            return Self::Io;
        }

        if msg_lower.contains("invalid argument")
            || msg_lower.contains("invalid value")
            || msg_lower.contains("cannot use")
        {
            return Self::Usage;
        }

        Self::Internal
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Create a not-found error.
    pub fn not_found(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::NotFound, source)
    }

    /// Create a validation error.
    pub fn validation(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Validation, source)
    }

    /// Wrap a failure while writing output.
    ///
    /// File-system errors are I/O failures here, `NotFound` included.
    pub fn output(err: dfc_core::Error) -> Self {
        match err {
            dfc_core::Error::Io(_) | dfc_core::Error::Csv(_) => Self::new(ErrorCategory::Io, err),
            other => Self::from(other),
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl From<dfc_core::Error> for CliError {
    fn from(err: dfc_core::Error) -> Self {
        Self::new(ErrorCategory::from_core(&err), err)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.source()
    }
}

/// Determine the exit code from an `anyhow::Error`.
///
/// A `CliError` keeps its category, an engine error is mapped by variant,
/// anything else is inferred from the message.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    if let Some(core_err) = err.downcast_ref::<dfc_core::Error>() {
        return ErrorCategory::from_core(core_err).exit_code();
    }
    ErrorCategory::infer_from_message(&err.to_string()).exit_code()
}
