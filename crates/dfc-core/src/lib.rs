//! # dfc-core
//!
//! Identifier and slug reconciliation for Document/Family/Collection tables.
//!
//! A run reads a delimited table, validates every pre-supplied identifier and
//! slug against the rest of the batch, then backfills whatever is missing so
//! the table can be imported as-is.
//!
//! ## Architecture
//!
//! - **Records**: typed rows parsed against a [`Profile`]'s column table
//! - **Scanner**: first pass, builds the [`ConsistencyModel`] and collects
//!   every validation finding
//! - **Generator**: second pass, renders identifiers from templates and draws
//!   unique slugs, reusing values per family and collection
//! - **Writer**: processed table output, passthrough columns verbatim
//! - **Events**: lists events whose action was split into several families
//!
//! ## Quick Start
//!
//! ```rust
//! use dfc_core::{Profile, Reconciler, SlugSettings, parse_records, write_records};
//!
//! let profile = Profile::unfccc();
//! let mut input = profile.required_columns.join(",");
//! input.push_str("\nParty,NDC,Paris NDC,First NDC,,,Party,,,,,,,,\n");
//!
//! let set = parse_records(input.as_bytes(), &profile)?;
//! let run = Reconciler::new(&profile, SlugSettings::default()).run(&set)?;
//!
//! let mut output = Vec::new();
//! write_records(&mut output, &profile, &set, &run.records)?;
//! assert!(String::from_utf8_lossy(&output).contains("UNFCCC.family.0.0"));
//! # Ok::<(), dfc_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, Error>`]. Validation failures carry the
//! full [`ValidationReport`]:
//!
//! ```rust
//! use dfc_core::{Error, Profile, Reconciler, SlugSettings, parse_records};
//!
//! let profile = Profile::unfccc();
//! let mut input = profile.required_columns.join(",");
//! input.push_str("\n,NDC,Paris NDC,,,,Party,,,,,,,,\n");
//!
//! let set = parse_records(input.as_bytes(), &profile)?;
//! match Reconciler::new(&profile, SlugSettings::default()).run(&set) {
//!     Err(Error::Validation(report)) => {
//!         for finding in report.findings() {
//!             eprintln!("{finding}");
//!         }
//!         assert_eq!(report.len(), 2);
//!     },
//!     other => panic!("expected validation failure, got {other:?}"),
//! }
//! # Ok::<(), dfc_core::Error>(())
//! ```

/// Configuration file handling
pub mod config;
/// Error types and result aliases
pub mod error;
/// Ambiguous event linking
pub mod events;
/// Second pass: identifier and slug backfill
pub mod generator;
/// Run-scoped lookup state
pub mod model;
/// Source profiles
pub mod profile;
/// Scan-then-generate pipeline
pub mod reconcile;
/// Typed input records
pub mod record;
/// Validation findings
pub mod report;
/// First pass: consistency checks
pub mod scanner;
/// Slugify and unique suffixing
pub mod slug;
/// Identifier templates
pub mod template;
/// Processed table output
pub mod writer;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{CONFIG_ENV, Config, DefaultsConfig};
pub use error::{Error, Result};
pub use events::{
    AmbiguousGroup, EVENT_COLUMNS, EventLinkage, EventRow, link_events, write_ambiguous_events,
};
pub use generator::{GeneratedCounts, Generator, ResolvedRecord};
pub use model::{CollectionKey, ConsistencyModel, FamilyInfo, FamilyKey};
pub use profile::{ColumnRoles, Grouping, IdentifierFormat, NOT_APPLICABLE, Profile, Templates};
pub use reconcile::{Reconciler, Reconciliation, RunSummary};
pub use record::{
    ExistingIds, Field, FieldKind, FieldValue, Header, Record, RecordSet, parse_path,
    parse_records,
};
pub use report::{Finding, Rule, ValidationReport};
pub use scanner::{ScanOutcome, scan};
pub use slug::{SlugGenerator, SlugSettings, SuffixSource, UuidSuffix, slugify};
pub use template::{IdTemplate, Placeholder, TemplateContext};
pub use writer::{write_records, write_to_path};
