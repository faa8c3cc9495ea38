//! Ambiguous event linking.
//!
//! Events reference an action id. When an action was split into several
//! families, an event for that action cannot be attached automatically; this
//! module lists those events grouped by action so they can be assigned by
//! hand.

use std::collections::HashMap;
use std::io::{Read, Write};

use serde::Serialize;
use tracing::{debug, info};

use crate::model::ConsistencyModel;
use crate::record::Header;
use crate::{Error, Result};

/// Columns every events table must carry, in output order.
pub const EVENT_COLUMNS: [&str; 9] = [
    "Id",
    "Eventable type",
    "Eventable Id",
    "Eventable name",
    "Event type",
    "Title",
    "Description",
    "Date",
    "Url",
];

const ACTION_COLUMN: &str = "Eventable Id";

/// One event row, restricted to [`EVENT_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRow {
    /// 1-based data row number in the events table.
    pub row: usize,
    /// Values aligned with [`EVENT_COLUMNS`].
    pub values: Vec<String>,
}

/// Events of one action that maps to several families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousGroup {
    /// The action the events reference.
    pub action_id: String,
    /// Family identifiers linked to the action, sorted.
    pub family_ids: Vec<String>,
    /// Events in input order.
    pub events: Vec<EventRow>,
}

/// Outcome of linking an events table against a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventLinkage {
    /// Event rows read.
    pub total: usize,
    /// Events whose action is known.
    pub matched: usize,
    /// Ambiguous events grouped by action, in order of first appearance.
    pub groups: Vec<AmbiguousGroup>,
}

impl EventLinkage {
    /// Number of ambiguous events across all groups.
    #[must_use]
    pub fn ambiguous(&self) -> usize {
        self.groups.iter().map(|g| g.events.len()).sum()
    }
}

/// Select events whose action maps to more than one family.
///
/// Fails with [`Error::Schema`] when any of [`EVENT_COLUMNS`] is missing.
pub fn link_events<R: Read>(reader: R, model: &ConsistencyModel) -> Result<EventLinkage> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header = Header::new(csv_reader.headers()?.iter());

    let missing: Vec<String> = EVENT_COLUMNS
        .iter()
        .filter(|c| !header.contains(c))
        .map(|c| (*c).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::Schema { missing });
    }
    let positions: Vec<usize> = EVENT_COLUMNS
        .iter()
        .filter_map(|c| header.position(c))
        .collect();
    let action_position = header.position(ACTION_COLUMN);

    let mut linkage = EventLinkage::default();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for (i, row) in csv_reader.records().enumerate() {
        let row = row?;
        linkage.total += 1;

        let action_id = action_position
            .and_then(|p| row.get(p))
            .map(str::trim)
            .unwrap_or_default();
        if action_id.is_empty() {
            continue;
        }
        let Some(families) = model.action_families(action_id) else {
            continue;
        };
        linkage.matched += 1;
        if families.len() < 2 {
            continue;
        }

        let event = EventRow {
            row: i + 1,
            values: positions
                .iter()
                .map(|p| row.get(*p).unwrap_or_default().to_string())
                .collect(),
        };
        let slot = *group_index.entry(action_id.to_string()).or_insert_with(|| {
            linkage.groups.push(AmbiguousGroup {
                action_id: action_id.to_string(),
                family_ids: families.iter().cloned().collect(),
                events: Vec::new(),
            });
            linkage.groups.len() - 1
        });
        linkage.groups[slot].events.push(event);
    }

    info!(
        events = linkage.total,
        matched = linkage.matched,
        ambiguous = linkage.ambiguous(),
        actions = linkage.groups.len(),
        "identified events related to known actions"
    );
    Ok(linkage)
}

/// Write ambiguous events: event columns plus `Action ID` and `Family IDs`,
/// one blank line after each action group.
pub fn write_ambiguous_events<W: Write>(writer: W, linkage: &EventLinkage) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    let width = EVENT_COLUMNS.len() + 2;

    let mut header: Vec<&str> = EVENT_COLUMNS.to_vec();
    header.extend(["Action ID", "Family IDs"]);
    out.write_record(&header)?;

    for group in &linkage.groups {
        let family_ids = group.family_ids.join(";");
        for event in &group.events {
            let mut line: Vec<&str> = event.values.iter().map(String::as_str).collect();
            line.resize(EVENT_COLUMNS.len(), "");
            line.push(&group.action_id);
            line.push(&family_ids);
            out.write_record(&line)?;
        }
        out.write_record(vec![""; width])?;
    }

    out.flush()?;
    debug!(groups = linkage.groups.len(), "wrote ambiguous events");
    Ok(())
}
