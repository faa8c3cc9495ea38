//! Processed table output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::generator::ResolvedRecord;
use crate::profile::Profile;
use crate::record::RecordSet;
use crate::{Error, Result};

/// Write the processed table: the profile's output header, then one line per
/// input row with generated columns filled from `resolved`.
///
/// Every other column is copied verbatim from the input; columns the input
/// lacks are written blank.
pub fn write_records<W: Write>(
    writer: W,
    profile: &Profile,
    set: &RecordSet,
    resolved: &[ResolvedRecord],
) -> Result<()> {
    if set.records.len() != resolved.len() {
        return Err(Error::Other(format!(
            "{} input rows but {} resolved rows",
            set.records.len(),
            resolved.len()
        )));
    }

    let columns = profile.output_columns();
    let roles = &profile.columns;
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&columns)?;

    for (record, values) in set.records.iter().zip(resolved) {
        let line: Vec<&str> = columns
            .iter()
            .map(|column| {
                if *column == roles.document_id {
                    values.document_id.as_str()
                } else if *column == roles.document_slug {
                    values.document_slug.as_str()
                } else if *column == roles.family_id {
                    values.family_id.as_str()
                } else if *column == roles.family_slug {
                    values.family_slug.as_str()
                } else if let (Some(id), true) = (
                    values.collection_id.as_deref(),
                    roles.collection_id.as_ref() == Some(column),
                ) {
                    id
                } else if let (Some(status), true) = (
                    values.status.as_deref(),
                    roles.status.as_ref() == Some(column),
                ) {
                    status
                } else {
                    set.raw(record, column)
                }
            })
            .collect();
        out.write_record(&line)?;
    }

    out.flush()?;
    debug!(rows = resolved.len(), columns = columns.len(), "wrote processed table");
    Ok(())
}

/// Write the processed table to `path`, replacing any existing file.
pub fn write_to_path(
    path: &Path,
    profile: &Profile,
    set: &RecordSet,
    resolved: &[ResolvedRecord],
) -> Result<()> {
    let file = File::create(path)?;
    write_records(BufWriter::new(file), profile, set, resolved)
}
