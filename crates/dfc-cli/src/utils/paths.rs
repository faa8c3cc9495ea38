//! Input and output path helpers.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::anyhow;

use crate::error::CliError;

/// `<input><suffix>`, keeping the input's full name and directory.
#[must_use]
pub fn sibling_with_suffix(input: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Fail with a not-found error unless `path` is an existing file.
pub fn require_file(path: &Path, what: &str) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::not_found(anyhow!(
            "{what} '{}' not found",
            path.display()
        )))
    }
}
