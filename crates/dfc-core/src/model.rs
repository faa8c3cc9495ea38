//! Run-scoped lookup state shared by the scanner and the generator.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::profile::Grouping;
use crate::record::Record;

/// Key under which rows belong to the same family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FamilyKey {
    /// Group scoping the family sequence counter (the action id, or empty
    /// for name-grouped profiles).
    pub group: String,
    /// Family name as compared for grouping.
    pub name: String,
}

impl FamilyKey {
    /// Grouping key of `record` under `grouping`.
    #[must_use]
    pub fn for_record(record: &Record, grouping: Grouping) -> Self {
        match grouping {
            Grouping::FamilyName => Self {
                group: String::new(),
                name: record.family_name.clone(),
            },
            Grouping::ActionFamily => Self {
                group: record.action_id.clone(),
                name: record.family_name.to_lowercase(),
            },
        }
    }
}

/// What is known about one family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyInfo {
    /// Canonical identifier, once known.
    pub id: Option<String>,
    /// Canonical slug, once known.
    pub slug: Option<String>,
    /// Document identifiers that belong to the family.
    pub documents: Vec<String>,
}

/// Key of a collection: its action and lowercased name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionKey {
    /// Owning action id.
    pub action_id: String,
    /// Lowercased collection name.
    pub name: String,
}

impl CollectionKey {
    /// Build a key, lowercasing the name.
    #[must_use]
    pub fn new(action_id: &str, name: &str) -> Self {
        Self {
            action_id: action_id.to_string(),
            name: name.trim().to_lowercase(),
        }
    }
}

/// Everything assigned so far in a run.
///
/// Built by the scanner from pre-supplied values, then extended by the
/// generator. One model per run; nothing is shared between runs.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyModel {
    slugs: HashSet<String>,
    documents: HashMap<String, String>,
    families: HashMap<FamilyKey, FamilyInfo>,
    family_owners: HashMap<String, FamilyKey>,
    group_assigned: HashMap<String, usize>,
    collections: HashMap<CollectionKey, String>,
    collection_counts: HashMap<String, usize>,
    action_families: BTreeMap<String, BTreeSet<String>>,
}

impl ConsistencyModel {
    /// Empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `slug` is taken by any document or family.
    #[must_use]
    pub fn has_slug(&self, slug: &str) -> bool {
        self.slugs.contains(slug)
    }

    /// Register a slug; `false` if it was already taken.
    pub fn insert_slug(&mut self, slug: &str) -> bool {
        self.slugs.insert(slug.to_string())
    }

    /// The slug set, for the slug generator.
    pub fn slugs_mut(&mut self) -> &mut HashSet<String> {
        &mut self.slugs
    }

    /// Number of distinct slugs.
    #[must_use]
    pub fn slug_count(&self) -> usize {
        self.slugs.len()
    }

    /// Whether `id` is a known document identifier.
    #[must_use]
    pub fn has_document(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// Register a document identifier with its slug (possibly empty); `false`
    /// if the identifier was already known.
    pub fn insert_document(&mut self, id: &str, slug: &str) -> bool {
        if self.documents.contains_key(id) {
            return false;
        }
        self.documents.insert(id.to_string(), slug.to_string());
        true
    }

    /// Slug recorded for document `id`.
    #[must_use]
    pub fn document_slug(&self, id: &str) -> Option<&str> {
        self.documents.get(id).map(String::as_str)
    }

    /// Number of known documents.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Family recorded under `key`.
    #[must_use]
    pub fn family(&self, key: &FamilyKey) -> Option<&FamilyInfo> {
        self.families.get(key)
    }

    /// Number of known families.
    #[must_use]
    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    /// Every known family.
    pub fn families(&self) -> impl Iterator<Item = (&FamilyKey, &FamilyInfo)> {
        self.families.iter()
    }

    /// Record that a family exists under `key` without assigning anything.
    pub fn touch_family(&mut self, key: &FamilyKey) {
        self.families.entry(key.clone()).or_default();
    }

    /// Key that owns family identifier `id`.
    #[must_use]
    pub fn family_owner(&self, id: &str) -> Option<&FamilyKey> {
        self.family_owners.get(id)
    }

    /// Assign `id` to the family under `key`.
    ///
    /// Keeps the owner index and the per-group count in step. Does nothing
    /// if the family already has an identifier.
    pub fn assign_family_id(&mut self, key: &FamilyKey, id: &str) {
        let info = self.families.entry(key.clone()).or_default();
        if info.id.is_some() {
            return;
        }
        info.id = Some(id.to_string());
        self.family_owners
            .entry(id.to_string())
            .or_insert_with(|| key.clone());
        *self.group_assigned.entry(key.group.clone()).or_default() += 1;
    }

    /// Assign `slug` to the family under `key` if it has none.
    pub fn assign_family_slug(&mut self, key: &FamilyKey, slug: &str) {
        let info = self.families.entry(key.clone()).or_default();
        if info.slug.is_none() {
            info.slug = Some(slug.to_string());
        }
    }

    /// Add a document to the family under `key`.
    pub fn add_family_document(&mut self, key: &FamilyKey, document_id: &str) {
        let info = self.families.entry(key.clone()).or_default();
        if !info.documents.iter().any(|d| d == document_id) {
            info.documents.push(document_id.to_string());
        }
    }

    /// Number of families in `group` that have an identifier.
    #[must_use]
    pub fn families_in_group(&self, group: &str) -> usize {
        self.group_assigned.get(group).copied().unwrap_or(0)
    }

    /// Collection identifier recorded for `key`.
    #[must_use]
    pub fn collection(&self, key: &CollectionKey) -> Option<&str> {
        self.collections.get(key).map(String::as_str)
    }

    /// Assign a collection identifier if `key` has none.
    pub fn assign_collection(&mut self, key: &CollectionKey, id: &str) {
        if !self.collections.contains_key(key) {
            self.collections.insert(key.clone(), id.to_string());
            *self
                .collection_counts
                .entry(key.action_id.clone())
                .or_default() += 1;
        }
    }

    /// Number of collections recorded for `action_id`.
    #[must_use]
    pub fn collections_in_action(&self, action_id: &str) -> usize {
        self.collection_counts.get(action_id).copied().unwrap_or(0)
    }

    /// Whether any collection already uses identifier `id`.
    #[must_use]
    pub fn collection_id_taken(&self, id: &str) -> bool {
        self.collections.values().any(|v| v == id)
    }

    /// Number of known collections.
    #[must_use]
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Link a pre-supplied family identifier to its action.
    pub fn link_action_family(&mut self, action_id: &str, family_id: &str) {
        self.action_families
            .entry(action_id.to_string())
            .or_default()
            .insert(family_id.to_string());
    }

    /// Family identifiers linked to `action_id`, sorted.
    #[must_use]
    pub fn action_families(&self, action_id: &str) -> Option<&BTreeSet<String>> {
        self.action_families.get(action_id)
    }
}
