//! First pass: validate pre-supplied values and build the consistency model.
//!
//! Every rule is evaluated on every row so a single run reports all
//! problems. Nothing is generated here.

use tracing::{debug, info};

use crate::model::{CollectionKey, ConsistencyModel, FamilyKey};
use crate::profile::Profile;
use crate::record::{Record, RecordSet, is_na};
use crate::report::{Rule, ValidationReport};
use crate::{Error, Result};

/// Model and findings produced by a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Lookup state built from pre-supplied values.
    pub model: ConsistencyModel,
    /// Every finding, in row order.
    pub report: ValidationReport,
}

impl ScanOutcome {
    /// The model, or [`Error::Validation`] if any rule was broken.
    pub fn into_result(self) -> Result<ConsistencyModel> {
        if self.report.is_empty() {
            Ok(self.model)
        } else {
            Err(Error::Validation(self.report))
        }
    }
}

/// Scan every record against `profile`.
#[must_use]
pub fn scan(set: &RecordSet, profile: &Profile) -> ScanOutcome {
    let mut scanner = Scanner {
        profile,
        model: ConsistencyModel::new(),
        report: set.findings.clone(),
    };
    for record in &set.records {
        scanner.check(record);
    }

    let Scanner {
        mut report, model, ..
    } = scanner;
    report.sort();

    info!(
        rows = set.records.len(),
        findings = report.len(),
        documents = model.document_count(),
        families = model.family_count(),
        slugs = model.slug_count(),
        "scan complete"
    );

    ScanOutcome { model, report }
}

struct Scanner<'a> {
    profile: &'a Profile,
    model: ConsistencyModel,
    report: ValidationReport,
}

impl Scanner<'_> {
    fn check(&mut self, record: &Record) {
        let row = record.row;

        if record.category.is_empty() {
            self.report.push(row, Rule::MissingCategory, "no category specified");
        }
        if self.profile.require_action_id && record.action_id.is_empty() {
            self.report.push(row, Rule::MissingActionId, "no action id specified");
        }
        if let Some(id) = &record.existing.document_id {
            if !self.profile.identifier_format.accepts(id) {
                self.report.push(
                    row,
                    Rule::MalformedDocumentId,
                    format!("unexpected document id '{id}'"),
                );
            }
        }
        if record.title.is_empty() {
            self.report.push(row, Rule::MissingTitle, "no document title specified");
        }
        if record.family_name.is_empty() {
            self.report.push(row, Rule::MissingFamilyName, "family name is empty");
        }

        if let Some(slug) = &record.existing.document_slug {
            if !self.model.insert_slug(slug) {
                self.report.push(
                    row,
                    Rule::DuplicateSlug,
                    format!("document slug '{slug}' already exists"),
                );
            }
        }

        if let Some(id) = &record.existing.document_id {
            let slug = record.existing.document_slug.as_deref().unwrap_or_default();
            if !self.model.insert_document(id, slug) {
                self.report.push(
                    row,
                    Rule::DuplicateDocumentId,
                    format!("document id '{id}' already exists"),
                );
            }
        }

        if !record.family_name.is_empty() {
            self.check_family(record);
        }

        if self.profile.collections {
            self.check_collection(record);
        }
    }

    fn check_family(&mut self, record: &Record) {
        let row = record.row;
        let key = FamilyKey::for_record(record, self.profile.grouping);
        let known = self.model.family(&key).cloned().unwrap_or_default();

        if let Some(id) = &record.existing.family_id {
            match self.model.family_owner(id) {
                Some(owner) if *owner != key => {
                    let owner_name = owner.name.clone();
                    self.report.push(
                        row,
                        Rule::ConflictingFamilyName,
                        format!(
                            "family id '{id}' is already used by family '{owner_name}', not '{}'",
                            record.family_name
                        ),
                    );
                },
                _ => match &known.id {
                    Some(recorded) if recorded != id => {
                        self.report.push(
                            row,
                            Rule::ConflictingFamilyId,
                            format!(
                                "multiple ids for family '{}': '{recorded}' and '{id}'",
                                record.family_name
                            ),
                        );
                    },
                    Some(_) => {},
                    None => self.model.assign_family_id(&key, id),
                },
            }
        }

        if let Some(slug) = &record.existing.family_slug {
            match &known.slug {
                Some(recorded) if recorded != slug => {
                    self.report.push(
                        row,
                        Rule::ConflictingFamilySlug,
                        format!(
                            "multiple slugs for family '{}': '{recorded}' and '{slug}'",
                            record.family_name
                        ),
                    );
                },
                Some(_) => {},
                None => {
                    if self.model.insert_slug(slug) {
                        self.model.assign_family_slug(&key, slug);
                    } else {
                        self.report.push(
                            row,
                            Rule::DuplicateSlug,
                            format!("family slug '{slug}' already exists"),
                        );
                    }
                },
            }
        }

        self.model.touch_family(&key);
        if let Some(document_id) = &record.existing.document_id {
            self.model.add_family_document(&key, document_id);
        }
        if let Some(family_id) = &record.existing.family_id {
            if !record.action_id.is_empty() {
                self.model.link_action_family(&record.action_id, family_id);
            }
        }
    }

    fn check_collection(&mut self, record: &Record) {
        if record.collection_name.is_empty() || is_na(&record.collection_name) {
            return;
        }
        let Some(id) = &record.existing.collection_id else {
            return;
        };
        if is_na(id) {
            return;
        }

        let key = CollectionKey::new(&record.action_id, &record.collection_name);
        match self.model.collection(&key) {
            Some(recorded) if recorded != id => {
                let message = format!(
                    "collection '{}' already has id '{recorded}', not '{id}'",
                    record.collection_name
                );
                self.report
                    .push(record.row, Rule::ConflictingCollectionId, message);
            },
            Some(_) => {},
            None => {
                debug!(row = record.row, collection = %id, "recorded collection id");
                self.model.assign_collection(&key, id);
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::records;

    fn unfccc_row<'a>(
        title: &'a str,
        family: &'a str,
        extra: &[(&'a str, &'a str)],
    ) -> Vec<(&'a str, &'a str)> {
        let mut row = vec![
            ("Category", "Party"),
            ("Author Type", "Party"),
            ("Document Title", title),
            ("Family Name", family),
        ];
        row.extend_from_slice(extra);
        row
    }

    fn cclw_row<'a>(
        action: &'a str,
        title: &'a str,
        family: &'a str,
        extra: &[(&'a str, &'a str)],
    ) -> Vec<(&'a str, &'a str)> {
        let mut row = vec![
            ("ID", action),
            ("Category", "Executive"),
            ("Document title", title),
            ("Family name", family),
        ];
        row.extend_from_slice(extra);
        row
    }

    #[test]
    fn test_clean_input_builds_model() {
        // Given: two rows of one family with pre-supplied values
        let profile = Profile::unfccc();
        let a = unfccc_row(
            "First NDC",
            "NDC",
            &[
                ("CPR Document ID", "CCLW.party.1.0"),
                ("CPR Document Slug", "first-ndc_0001"),
                ("CPR Family ID", "UNFCCC.family.0.0"),
                ("CPR Family Slug", "ndc_0002"),
            ],
        );
        let b = unfccc_row("Second NDC", "NDC", &[("CPR Family ID", "UNFCCC.family.0.0")]);
        let set = records(&profile, &[&a, &b]);

        // When: scanning
        let model = scan(&set, &profile).into_result().unwrap();

        // Then: the model holds every pre-supplied value once
        assert_eq!(model.document_slug("CCLW.party.1.0"), Some("first-ndc_0001"));
        assert!(model.has_slug("ndc_0002"));
        assert_eq!(model.slug_count(), 2);
        let key = FamilyKey {
            group: String::new(),
            name: "NDC".to_string(),
        };
        let family = model.family(&key).unwrap();
        assert_eq!(family.id.as_deref(), Some("UNFCCC.family.0.0"));
        assert_eq!(family.documents, vec!["CCLW.party.1.0".to_string()]);
    }

    #[test]
    fn test_missing_values_are_all_reported() {
        // Given: a row with no category, title or family name
        let profile = Profile::cclw();
        let row = [("ID", "1")];
        let set = records(&profile, &[&row]);

        // When: scanning
        let outcome = scan(&set, &profile);

        // Then: each rule is reported on row 1
        for rule in [Rule::MissingCategory, Rule::MissingTitle, Rule::MissingFamilyName] {
            assert!(outcome.report.has(1, rule), "missing {rule}");
        }
        assert!(!outcome.report.has(1, Rule::MissingActionId));
    }

    #[test]
    fn test_action_id_required_only_when_profile_says_so() {
        let cclw = Profile::cclw();
        let row = cclw_row("", "Act", "Act family", &[]);
        let outcome = scan(&records(&cclw, &[&row]), &cclw);
        assert!(outcome.report.has(1, Rule::MissingActionId));

        let unfccc = Profile::unfccc();
        let row = unfccc_row("Act", "Act family", &[]);
        assert!(scan(&records(&unfccc, &[&row]), &unfccc).report.is_empty());
    }

    #[test]
    fn test_strict_format_rejects_bad_document_id() {
        let profile = Profile::unfccc();
        let row = unfccc_row("Act", "Act", &[("CPR Document ID", "CCLW.party.1.1")]);
        let outcome = scan(&records(&profile, &[&row]), &profile);
        assert!(outcome.report.has(1, Rule::MalformedDocumentId));

        let profile = Profile::cclw();
        let row = cclw_row("1", "Act", "Act", &[("CPR Document ID", "legacy-42")]);
        assert!(scan(&records(&profile, &[&row]), &profile).report.is_empty());
    }

    #[test]
    fn test_duplicate_document_slug_cites_second_row() {
        // Given: two rows sharing a document slug
        let profile = Profile::unfccc();
        let a = unfccc_row("A", "F1", &[("CPR Document Slug", "same_0000")]);
        let b = unfccc_row("B", "F2", &[("CPR Document Slug", "same_0000")]);

        // When: scanning
        let outcome = scan(&records(&profile, &[&a, &b]), &profile);

        // Then: only the later row is at fault
        assert!(!outcome.report.has(1, Rule::DuplicateSlug));
        assert!(outcome.report.has(2, Rule::DuplicateSlug));
        assert!(matches!(outcome.into_result(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_duplicate_document_id() {
        let profile = Profile::unfccc();
        let a = unfccc_row("A", "F1", &[("CPR Document ID", "CCLW.party.1.0")]);
        let b = unfccc_row("B", "F2", &[("CPR Document ID", "CCLW.party.1.0")]);
        let outcome = scan(&records(&profile, &[&a, &b]), &profile);
        assert!(outcome.report.has(2, Rule::DuplicateDocumentId));
        assert_eq!(outcome.report.len(), 1);
    }

    #[test]
    fn test_conflicting_family_id_and_slug() {
        // Given: one family name given two ids and two slugs
        let profile = Profile::unfccc();
        let a = unfccc_row(
            "A",
            "NDC",
            &[("CPR Family ID", "UNFCCC.family.0.0"), ("CPR Family Slug", "ndc_aaaa")],
        );
        let b = unfccc_row(
            "B",
            "NDC",
            &[("CPR Family ID", "UNFCCC.family.1.0"), ("CPR Family Slug", "ndc_bbbb")],
        );

        // When: scanning
        let outcome = scan(&records(&profile, &[&a, &b]), &profile);

        // Then: both conflicts land on row 2
        assert!(outcome.report.has(2, Rule::ConflictingFamilyId));
        assert!(outcome.report.has(2, Rule::ConflictingFamilySlug));
        assert!(outcome.report.rows().into_iter().eq([2]));
    }

    #[test]
    fn test_family_id_shared_by_two_names() {
        let profile = Profile::unfccc();
        let a = unfccc_row("A", "NDC", &[("CPR Family ID", "UNFCCC.family.0.0")]);
        let b = unfccc_row("B", "LTS", &[("CPR Family ID", "UNFCCC.family.0.0")]);
        let outcome = scan(&records(&profile, &[&a, &b]), &profile);
        assert!(outcome.report.has(2, Rule::ConflictingFamilyName));
    }

    #[test]
    fn test_family_slug_clashing_with_document_slug() {
        let profile = Profile::unfccc();
        let a = unfccc_row("A", "NDC", &[("CPR Document Slug", "ndc_0000")]);
        let b = unfccc_row("B", "NDC", &[("CPR Family Slug", "ndc_0000")]);
        let outcome = scan(&records(&profile, &[&a, &b]), &profile);
        assert!(outcome.report.has(2, Rule::DuplicateSlug));
    }

    #[test]
    fn test_later_row_fills_missing_family_id() {
        // Given: the first row of a family has no id, the second supplies one
        let profile = Profile::cclw();
        let a = cclw_row("10", "A", "Climate Act", &[]);
        let b = cclw_row("10", "B", "climate act", &[("CPR Family ID", "CCLW.family.10.0")]);

        // When: scanning
        let outcome = scan(&records(&profile, &[&a, &b]), &profile);

        // Then: no conflict, and the id is recorded for the case-folded key
        assert!(outcome.report.is_empty());
        let key = FamilyKey {
            group: "10".to_string(),
            name: "climate act".to_string(),
        };
        assert_eq!(
            outcome.model.family(&key).and_then(|f| f.id.as_deref()),
            Some("CCLW.family.10.0")
        );
        assert!(outcome.model.action_families("10").unwrap().contains("CCLW.family.10.0"));
    }

    #[test]
    fn test_conflicting_collection_id() {
        let profile = Profile::cclw();
        let a = cclw_row(
            "5",
            "A",
            "F",
            &[("Collection name", "Plans"), ("CPR Collection ID", "CCLW.collection.5.0")],
        );
        let b = cclw_row(
            "5",
            "B",
            "F",
            &[("Collection name", "plans"), ("CPR Collection ID", "CCLW.collection.5.1")],
        );
        let outcome = scan(&records(&profile, &[&a, &b]), &profile);
        assert!(outcome.report.has(2, Rule::ConflictingCollectionId));
    }

    #[test]
    fn test_parse_findings_are_merged_in_row_order() {
        // Given: a type error on row 2 and a missing title on row 1
        let mut profile = Profile::unfccc();
        profile
            .field_kinds
            .insert("Date".to_string(), crate::record::FieldKind::Integer);
        let a = unfccc_row("", "F", &[]);
        let b = unfccc_row("B", "F", &[("Date", "soon")]);

        // When: scanning
        let outcome = scan(&records(&profile, &[&a, &b]), &profile);

        // Then: findings are ordered by row
        let rows: Vec<_> = outcome.report.findings().iter().map(|f| f.row).collect();
        assert_eq!(rows, vec![1, 2]);
        assert!(outcome.report.has(2, Rule::InvalidField));
    }
}
