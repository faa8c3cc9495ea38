//! Table builders shared by unit tests.

#![allow(clippy::unwrap_used)]

use crate::profile::Profile;
use crate::record::{RecordSet, parse_records};

/// CSV text with the profile's output header and one line per row.
///
/// Each row lists `(column, value)` pairs; unlisted columns are blank.
pub fn table(profile: &Profile, rows: &[&[(&str, &str)]]) -> String {
    let columns = profile.output_columns();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns).unwrap();
    for row in rows {
        let line: Vec<&str> = columns
            .iter()
            .map(|c| {
                row.iter()
                    .find(|(name, _)| name == c)
                    .map_or("", |(_, value)| *value)
            })
            .collect();
        writer.write_record(&line).unwrap();
    }
    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}

/// Parse rows built by [`table`].
pub fn records(profile: &Profile, rows: &[&[(&str, &str)]]) -> RecordSet {
    parse_records(table(profile, rows).as_bytes(), profile).unwrap()
}
