//! Source profiles.
//!
//! A [`Profile`] describes one family of input tables: which columns must be
//! present, which columns play which role, how rows are grouped into
//! families, how identifiers are synthesized and whether collections are
//! resolved. The reconciliation engine is written once against this
//! description; every data source is just another profile.
//!
//! Two profiles are built in:
//!
//! - `cclw`: families are grouped by action id and family name, collections
//!   are resolved, document identifiers are free-form.
//! - `unfccc`: families are grouped by name, document identifiers must be
//!   four dotted parts ending in `0`, every row is marked `PUBLISHED`.
//!
//! Custom profiles can be declared in the configuration file:
//!
//! ```toml
//! [[profiles]]
//! name = "example"
//! required_columns = ["Category", "Title", "Family"]
//! extra_columns = ["Doc ID", "Doc Slug", "Family ID", "Family Slug"]
//! grouping = "family_name"
//! identifier_format = "free"
//!
//! [profiles.columns]
//! category = "Category"
//! title = "Title"
//! family_name = "Family"
//! document_id = "Doc ID"
//! document_slug = "Doc Slug"
//! family_id = "Family ID"
//! family_slug = "Family Slug"
//!
//! [profiles.templates]
//! document = "EX.{category}.{row}.0"
//! family = "EX.family.{index}.0"
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::record::FieldKind;
use crate::template::{IdTemplate, Placeholder};
use crate::{Error, Result};

/// How rows are grouped into families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// Rows with the same (trimmed) family name form one family.
    FamilyName,
    /// Rows with the same action id and (case-insensitive) family name form
    /// one family; the action id also scopes the family sequence counter.
    ActionFamily,
}

/// Accepted shape of pre-supplied document identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierFormat {
    /// Any non-empty value is accepted.
    Free,
    /// Exactly four dotted parts, the last of which is `0`.
    Strict,
}

impl IdentifierFormat {
    /// Whether `id` is acceptable under this format.
    #[must_use]
    pub fn accepts(self, id: &str) -> bool {
        match self {
            Self::Free => !id.trim().is_empty(),
            Self::Strict => {
                let parts: Vec<&str> = id.split('.').collect();
                parts.len() == 4 && parts[3] == "0" && parts.iter().all(|p| !p.is_empty())
            },
        }
    }
}

/// Which header names play which role.
///
/// Input-only roles (`category`, `title`, `family_name`, `action_id`,
/// `document_number`, `collection_name`, `id_tag`) must be required columns.
/// The identifier, slug and status roles name output columns; they may be
/// absent from the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    /// Row category.
    pub category: String,
    /// Document title (document slug base).
    pub title: String,
    /// Family name (family slug base, grouping key).
    pub family_name: String,
    /// External action id.
    #[serde(default)]
    pub action_id: Option<String>,
    /// Source document number within the action.
    #[serde(default)]
    pub document_number: Option<String>,
    /// Collection name.
    #[serde(default)]
    pub collection_name: Option<String>,
    /// Identifier tag used by document templates.
    #[serde(default)]
    pub id_tag: Option<String>,
    /// Document identifier.
    pub document_id: String,
    /// Document slug.
    pub document_slug: String,
    /// Family identifier.
    pub family_id: String,
    /// Family slug.
    pub family_slug: String,
    /// Collection identifier.
    #[serde(default)]
    pub collection_id: Option<String>,
    /// Publication status.
    #[serde(default)]
    pub status: Option<String>,
}

/// Identifier templates for synthesized values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Templates {
    /// Document identifier template.
    pub document: IdTemplate,
    /// Family identifier template.
    pub family: IdTemplate,
    /// Collection identifier template (collection-aware profiles only).
    #[serde(default)]
    pub collection: Option<IdTemplate>,
}

fn default_true() -> bool {
    true
}

/// Description of one input source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique profile name.
    pub name: String,
    /// One-line description shown by `dfc profiles`.
    #[serde(default)]
    pub description: String,
    /// Columns that must be present in the input header.
    pub required_columns: Vec<String>,
    /// Additional output columns (generated values and optional passthrough).
    #[serde(default)]
    pub extra_columns: Vec<String>,
    /// Role assignment for header names.
    pub columns: ColumnRoles,
    /// Typed columns; unlisted columns are text.
    #[serde(default)]
    pub field_kinds: BTreeMap<String, FieldKind>,
    /// Family grouping strategy.
    pub grouping: Grouping,
    /// Accepted shape of pre-supplied document identifiers.
    pub identifier_format: IdentifierFormat,
    /// Whether an empty action id is a validation error.
    #[serde(default)]
    pub require_action_id: bool,
    /// Identifier templates.
    pub templates: Templates,
    /// Whether collection identifiers are resolved.
    #[serde(default)]
    pub collections: bool,
    /// Status written to every output row, if any.
    #[serde(default)]
    pub status: Option<String>,
    /// Default row offset for `{row}` and `{index}`.
    #[serde(default)]
    pub row_offset: usize,
    /// Reject input columns that are not part of the output.
    #[serde(default = "default_true")]
    pub strict_columns: bool,
}

/// Sentinel collection identifier for rows outside any collection.
pub const NOT_APPLICABLE: &str = "N/A";

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

const CCLW_DOCUMENT_ID: &str = "CCLW.{category}.{action_id}.{document_number}";
const CCLW_FAMILY_ID: &str = "CCLW.family.{action_id}.{group_seq}";
const CCLW_COLLECTION_ID: &str = "CCLW.collection.{action_id}.{group_seq}";
const UNFCCC_DOCUMENT_ID: &str = "CCLW.{id_tag}.{row}.0";
const UNFCCC_FAMILY_ID: &str = "UNFCCC.family.{index}.0";

const BUILTIN_TEMPLATES: [&str; 5] = [
    CCLW_DOCUMENT_ID,
    CCLW_FAMILY_ID,
    CCLW_COLLECTION_ID,
    UNFCCC_DOCUMENT_ID,
    UNFCCC_FAMILY_ID,
];

#[allow(
    clippy::unreachable,
    reason = "only called with BUILTIN_TEMPLATES, all parsed in test_builtin_templates_parse"
)]
fn template(source: &str) -> IdTemplate {
    IdTemplate::parse(source).unwrap_or_else(|err| unreachable!("built-in template: {err}"))
}

impl Profile {
    /// The action-grouped, collection-aware profile.
    #[must_use]
    pub fn cclw() -> Self {
        let list_columns = [
            "Sectors",
            "Instruments",
            "Frameworks",
            "Responses",
            "Natural Hazards",
            "Keywords",
        ];
        Self {
            name: "cclw".to_string(),
            description: "Action-grouped families with collections".to_string(),
            required_columns: strings(&[
                "ID",
                "Document ID",
                "Collection name",
                "Collection summary",
                "Document title",
                "Family name",
                "Family summary",
                "Document role",
                "Document variant",
                "Geography ISO",
                "Documents",
                "Category",
                "Sectors",
                "Instruments",
                "Frameworks",
                "Responses",
                "Natural Hazards",
                "Document Type",
                "Language",
                "Keywords",
                "Geography",
            ]),
            extra_columns: strings(&[
                "CPR Document ID",
                "CPR Family ID",
                "CPR Collection ID",
                "CPR Family Slug",
                "CPR Document Slug",
                "CPR Document Status",
            ]),
            columns: ColumnRoles {
                category: "Category".to_string(),
                title: "Document title".to_string(),
                family_name: "Family name".to_string(),
                action_id: Some("ID".to_string()),
                document_number: Some("Document ID".to_string()),
                collection_name: Some("Collection name".to_string()),
                id_tag: None,
                document_id: "CPR Document ID".to_string(),
                document_slug: "CPR Document Slug".to_string(),
                family_id: "CPR Family ID".to_string(),
                family_slug: "CPR Family Slug".to_string(),
                collection_id: Some("CPR Collection ID".to_string()),
                status: Some("CPR Document Status".to_string()),
            },
            field_kinds: list_columns
                .iter()
                .map(|c| ((*c).to_string(), FieldKind::List))
                .collect(),
            grouping: Grouping::ActionFamily,
            identifier_format: IdentifierFormat::Free,
            require_action_id: true,
            templates: Templates {
                document: template(CCLW_DOCUMENT_ID),
                family: template(CCLW_FAMILY_ID),
                collection: Some(template(CCLW_COLLECTION_ID)),
            },
            collections: true,
            status: None,
            row_offset: 0,
            strict_columns: true,
        }
    }

    /// The name-grouped profile with strict document identifiers.
    #[must_use]
    pub fn unfccc() -> Self {
        Self {
            name: "unfccc".to_string(),
            description: "Name-grouped families, strict document ids, published status"
                .to_string(),
            required_columns: strings(&[
                "Category",
                "Submission Type",
                "Family Name",
                "Document Title",
                "Documents",
                "Author",
                "Author Type",
                "Geography",
                "Geography ISO",
                "Date",
                "Document Role",
                "Document Variant",
                "Language",
                "CPR Collection ID",
                "CPR Document ID",
            ]),
            extra_columns: strings(&[
                "CPR Family ID",
                "CPR Family Slug",
                "CPR Document Slug",
                "CPR Document Status",
                "md5sum",
                "Download URL",
            ]),
            columns: ColumnRoles {
                category: "Category".to_string(),
                title: "Document Title".to_string(),
                family_name: "Family Name".to_string(),
                action_id: None,
                document_number: None,
                collection_name: None,
                id_tag: Some("Author Type".to_string()),
                document_id: "CPR Document ID".to_string(),
                document_slug: "CPR Document Slug".to_string(),
                family_id: "CPR Family ID".to_string(),
                family_slug: "CPR Family Slug".to_string(),
                collection_id: Some("CPR Collection ID".to_string()),
                status: Some("CPR Document Status".to_string()),
            },
            field_kinds: BTreeMap::new(),
            grouping: Grouping::FamilyName,
            identifier_format: IdentifierFormat::Strict,
            require_action_id: false,
            templates: Templates {
                document: template(UNFCCC_DOCUMENT_ID),
                family: template(UNFCCC_FAMILY_ID),
                collection: None,
            },
            collections: false,
            status: Some("PUBLISHED".to_string()),
            row_offset: 0,
            strict_columns: true,
        }
    }

    /// All built-in profiles.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![Self::cclw(), Self::unfccc()]
    }

    /// Output header: required columns followed by extra columns, without
    /// duplicates.
    #[must_use]
    pub fn output_columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.required_columns
            .iter()
            .chain(&self.extra_columns)
            .filter(|c| seen.insert(c.as_str()))
            .cloned()
            .collect()
    }

    /// Whether `column` is part of the output header.
    #[must_use]
    pub fn knows_column(&self, column: &str) -> bool {
        self.required_columns.iter().any(|c| c == column)
            || self.extra_columns.iter().any(|c| c == column)
    }

    /// Kind of a column according to the field table.
    #[must_use]
    pub fn field_kind(&self, column: &str) -> FieldKind {
        self.field_kinds.get(column).copied().unwrap_or_default()
    }

    /// Check internal consistency.
    ///
    /// Run on every profile loaded from configuration; the built-in profiles
    /// pass by construction.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::Config(format!("profile '{}': {msg}", self.name)));

        if self.name.trim().is_empty() {
            return Err(Error::Config("profile name must not be empty".into()));
        }
        if self.required_columns.is_empty() {
            return fail("required_columns must not be empty".into());
        }

        let required = |column: &str| self.required_columns.iter().any(|c| c == column);
        let roles = &self.columns;
        let mut input_roles = vec![
            ("category", Some(&roles.category)),
            ("title", Some(&roles.title)),
            ("family_name", Some(&roles.family_name)),
            ("action_id", roles.action_id.as_ref()),
            ("document_number", roles.document_number.as_ref()),
            ("id_tag", roles.id_tag.as_ref()),
        ];
        if self.collections {
            input_roles.push(("collection_name", roles.collection_name.as_ref()));
        }
        for (role, column) in input_roles {
            if let Some(column) = column {
                if !required(column) {
                    return fail(format!(
                        "column '{column}' for role '{role}' must be a required column"
                    ));
                }
            }
        }

        let mut output_roles = vec![
            ("document_id", Some(&roles.document_id)),
            ("document_slug", Some(&roles.document_slug)),
            ("family_id", Some(&roles.family_id)),
            ("family_slug", Some(&roles.family_slug)),
        ];
        if self.collections {
            output_roles.push(("collection_id", roles.collection_id.as_ref()));
        }
        if self.status.is_some() {
            output_roles.push(("status", roles.status.as_ref()));
        }
        for (role, column) in output_roles {
            match column {
                Some(column) if self.knows_column(column) => {},
                Some(column) => {
                    return fail(format!(
                        "column '{column}' for role '{role}' is not an output column"
                    ));
                },
                None => return fail(format!("role '{role}' has no column")),
            }
        }

        if self.require_action_id && roles.action_id.is_none() {
            return fail("require_action_id is set but no action_id column is mapped".into());
        }
        if self.grouping == Grouping::ActionFamily && roles.action_id.is_none() {
            return fail("action_family grouping needs an action_id column".into());
        }

        let mut templates = vec![("document", &self.templates.document), ("family", &self.templates.family)];
        if self.collections {
            match &self.templates.collection {
                Some(t) => templates.push(("collection", t)),
                None => return fail("collections are enabled but no collection template is set".into()),
            }
        }
        for (kind, t) in templates {
            for placeholder in t.placeholders() {
                let available = match placeholder {
                    Placeholder::ActionId => roles.action_id.is_some(),
                    Placeholder::DocumentNumber => roles.document_number.is_some(),
                    Placeholder::IdTag => roles.id_tag.is_some(),
                    Placeholder::GroupSeq => kind != "document",
                    Placeholder::Category | Placeholder::Row | Placeholder::Index => true,
                };
                if !available {
                    return fail(format!(
                        "{kind} template '{t}' uses {{{}}} which this profile cannot supply",
                        placeholder.name()
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_parse() {
        // Given: every template source the built-in profiles use
        for source in BUILTIN_TEMPLATES {
            // Then: each parses and keeps its source text
            let parsed = IdTemplate::parse(source).unwrap();
            assert_eq!(parsed.as_str(), source);
        }
    }

    #[test]
    fn test_builtin_profiles_validate() {
        for profile in Profile::builtin() {
            profile.validate().unwrap();
        }
    }

    #[test]
    fn test_output_columns_keep_order_and_dedupe() {
        // Given: the strict profile, which lists CPR Document ID as required
        let profile = Profile::unfccc();

        // When: computing output columns
        let columns = profile.output_columns();

        // Then: required columns come first, extras follow, nothing repeats
        assert_eq!(columns.first().map(String::as_str), Some("Category"));
        assert_eq!(columns.last().map(String::as_str), Some("Download URL"));
        let unique: HashSet<_> = columns.iter().collect();
        assert_eq!(unique.len(), columns.len());
    }

    #[test]
    fn test_strict_identifier_format() {
        let strict = IdentifierFormat::Strict;
        assert!(strict.accepts("CCLW.party.12.0"));
        assert!(!strict.accepts("CCLW.party.12.1"));
        assert!(!strict.accepts("CCLW.party.12"));
        assert!(!strict.accepts("CCLW..12.0"));
        assert!(!strict.accepts("free-form"));

        let free = IdentifierFormat::Free;
        assert!(free.accepts("free-form"));
        assert!(!free.accepts("  "));
    }

    #[test]
    fn test_validate_rejects_unmapped_template_placeholder() {
        // Given: a name-grouped profile whose family template needs an action id
        let mut profile = Profile::unfccc();
        profile.templates.family = IdTemplate::parse("X.{action_id}.{group_seq}").unwrap();

        // Then: validation explains the problem
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("{action_id}"), "{err}");
    }

    #[test]
    fn test_validate_rejects_group_seq_in_document_template() {
        let mut profile = Profile::cclw();
        profile.templates.document = IdTemplate::parse("X.{group_seq}").unwrap();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_validate_requires_role_columns() {
        let mut profile = Profile::cclw();
        profile.columns.title = "Headline".to_string();
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("Headline"));

        let mut profile = Profile::cclw();
        profile.templates.collection = None;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_profile_toml_roundtrip() {
        // Given: a built-in profile serialized to TOML
        let profile = Profile::cclw();
        let text = toml::to_string(&profile).unwrap();

        // When: parsing it back
        let parsed: Profile = toml::from_str(&text).unwrap();

        // Then: nothing is lost, including compiled templates
        assert_eq!(parsed, profile);
    }

    #[test]
    fn test_profile_rejects_bad_template_on_load() {
        let text = toml::to_string(&Profile::unfccc())
            .unwrap()
            .replace("UNFCCC.family.{index}.0", "UNFCCC.family.{idx}.0");
        let parsed: std::result::Result<Profile, _> = toml::from_str(&text);
        assert!(parsed.is_err());
    }
}
