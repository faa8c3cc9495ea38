//! Second pass: backfill identifiers and slugs.
//!
//! Runs over the same records the scanner accepted, in input order, and
//! extends the model as it goes so later rows of the same family or
//! collection reuse what earlier rows received.

use serde::Serialize;
use tracing::{debug, info};

use crate::model::{CollectionKey, ConsistencyModel, FamilyKey};
use crate::profile::{NOT_APPLICABLE, Profile};
use crate::record::{Record, RecordSet, is_na};
use crate::slug::{SlugGenerator, SuffixSource, slugify};
use crate::template::{IdTemplate, Placeholder, TemplateContext};
use crate::{Error, Result};

/// Identifiers and slugs resolved for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRecord {
    /// 1-based data row number.
    pub row: usize,
    /// Document identifier.
    pub document_id: String,
    /// Document slug.
    pub document_slug: String,
    /// Family identifier.
    pub family_id: String,
    /// Family slug.
    pub family_slug: String,
    /// Collection identifier (collection-aware profiles only).
    pub collection_id: Option<String>,
    /// Status marker, when the profile sets one.
    pub status: Option<String>,
}

/// Counts of values synthesized during one generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedCounts {
    /// Document identifiers rendered from the template.
    pub document_ids: usize,
    /// Document slugs generated.
    pub document_slugs: usize,
    /// Family identifiers rendered from the template.
    pub family_ids: usize,
    /// Family slugs generated.
    pub family_slugs: usize,
    /// Collection identifiers rendered from the template.
    pub collection_ids: usize,
}

/// Backfills missing values for one run.
pub struct Generator<'a, S> {
    profile: &'a Profile,
    slugs: &'a mut SlugGenerator<S>,
    row_offset: usize,
    counts: GeneratedCounts,
}

struct RowValues<'r> {
    category: String,
    id_tag: String,
    document_number: &'r str,
    action_id: &'r str,
    row: usize,
    index: usize,
}

impl<'r> RowValues<'r> {
    fn new(record: &'r Record, row_offset: usize) -> Result<Self> {
        let row = row_offset
            .checked_add(record.row)
            .ok_or(Error::RowOffsetOverflow {
                offset: row_offset,
                row: record.row,
            })?;
        Ok(Self {
            category: record.category.to_lowercase(),
            id_tag: record.id_tag.to_lowercase(),
            document_number: if record.document_number.is_empty() {
                "0"
            } else {
                record.document_number.as_str()
            },
            action_id: &record.action_id,
            row,
            index: row - 1,
        })
    }

    fn context(&self, group_seq: usize) -> TemplateContext<'_> {
        TemplateContext {
            category: &self.category,
            action_id: self.action_id,
            document_number: self.document_number,
            id_tag: &self.id_tag,
            row: self.row,
            index: self.index,
            group_seq,
        }
    }
}

impl<'a, S: SuffixSource> Generator<'a, S> {
    /// Generator for `profile`, drawing slug suffixes from `slugs`.
    pub fn new(profile: &'a Profile, slugs: &'a mut SlugGenerator<S>, row_offset: usize) -> Self {
        Self {
            profile,
            slugs,
            row_offset,
            counts: GeneratedCounts::default(),
        }
    }

    /// Values synthesized so far.
    pub const fn counts(&self) -> GeneratedCounts {
        self.counts
    }

    /// Resolve every record, extending `model`.
    ///
    /// Stops at the first slug exhaustion or identifier collision.
    pub fn resolve_all(
        &mut self,
        set: &RecordSet,
        model: &mut ConsistencyModel,
    ) -> Result<Vec<ResolvedRecord>> {
        let resolved = set
            .records
            .iter()
            .map(|record| self.resolve(record, model))
            .collect::<Result<Vec<_>>>()?;

        let c = self.counts;
        info!(
            rows = resolved.len(),
            document_ids = c.document_ids,
            document_slugs = c.document_slugs,
            family_ids = c.family_ids,
            family_slugs = c.family_slugs,
            collection_ids = c.collection_ids,
            "generation complete"
        );
        Ok(resolved)
    }

    /// Resolve one record.
    pub fn resolve(
        &mut self,
        record: &Record,
        model: &mut ConsistencyModel,
    ) -> Result<ResolvedRecord> {
        let values = RowValues::new(record, self.row_offset)?;
        let row = record.row;

        let document_id = match &record.existing.document_id {
            Some(id) => id.clone(),
            None => {
                let id = self.profile.templates.document.render(&values.context(0));
                if model.has_document(&id) {
                    return Err(Error::IdentifierCollision {
                        row,
                        kind: "document",
                        id,
                    });
                }
                debug!(row, %id, "generated document id");
                self.counts.document_ids += 1;
                id
            },
        };

        let document_slug = match &record.existing.document_slug {
            Some(slug) => slug.clone(),
            None => {
                let slug = self
                    .slugs
                    .generate(&slugify(&record.title), model.slugs_mut())?;
                debug!(row, %slug, "generated document slug");
                self.counts.document_slugs += 1;
                slug
            },
        };
        model.insert_document(&document_id, &document_slug);

        let key = FamilyKey::for_record(record, self.profile.grouping);
        let family_id = self.family_id(record, &key, &values, model)?;
        let family_slug = self.family_slug(record, &key, model)?;
        model.add_family_document(&key, &document_id);

        let collection_id = if self.profile.collections {
            Some(self.collection_id(record, &values, model)?)
        } else {
            None
        };

        Ok(ResolvedRecord {
            row,
            document_id,
            document_slug,
            family_id,
            family_slug,
            collection_id,
            status: self.profile.status.clone(),
        })
    }

    fn family_id(
        &mut self,
        record: &Record,
        key: &FamilyKey,
        values: &RowValues<'_>,
        model: &mut ConsistencyModel,
    ) -> Result<String> {
        if let Some(id) = &record.existing.family_id {
            model.assign_family_id(key, id);
            return Ok(id.clone());
        }
        if let Some(id) = model.family(key).and_then(|f| f.id.clone()) {
            return Ok(id);
        }

        let id = render_free(
            &self.profile.templates.family,
            values,
            model.families_in_group(&key.group),
            |candidate| model.family_owner(candidate).is_some(),
        )
        .ok_or_else(|| Error::IdentifierCollision {
            row: record.row,
            kind: "family",
            id: self
                .profile
                .templates
                .family
                .render(&values.context(model.families_in_group(&key.group))),
        })?;

        debug!(row = record.row, %id, family = %key.name, "generated family id");
        self.counts.family_ids += 1;
        model.assign_family_id(key, &id);
        Ok(id)
    }

    fn family_slug(
        &mut self,
        record: &Record,
        key: &FamilyKey,
        model: &mut ConsistencyModel,
    ) -> Result<String> {
        if let Some(slug) = &record.existing.family_slug {
            model.assign_family_slug(key, slug);
            return Ok(slug.clone());
        }
        if let Some(slug) = model.family(key).and_then(|f| f.slug.clone()) {
            return Ok(slug);
        }

        let slug = self
            .slugs
            .generate(&slugify(&record.family_name), model.slugs_mut())?;
        debug!(row = record.row, %slug, family = %key.name, "generated family slug");
        self.counts.family_slugs += 1;
        model.assign_family_slug(key, &slug);
        Ok(slug)
    }

    fn collection_id(
        &mut self,
        record: &Record,
        values: &RowValues<'_>,
        model: &mut ConsistencyModel,
    ) -> Result<String> {
        if record.collection_name.is_empty() || is_na(&record.collection_name) {
            return Ok(NOT_APPLICABLE.to_string());
        }

        let key = CollectionKey::new(&record.action_id, &record.collection_name);
        if let Some(id) = record.existing.collection_id.as_ref().filter(|id| !is_na(id)) {
            model.assign_collection(&key, id);
            return Ok(id.clone());
        }
        if let Some(id) = model.collection(&key) {
            return Ok(id.to_string());
        }

        let Some(template) = &self.profile.templates.collection else {
            return Err(Error::Config(format!(
                "profile '{}' resolves collections but has no collection template",
                self.profile.name
            )));
        };
        let start = model.collections_in_action(&record.action_id);
        let id = render_free(template, values, start, |candidate| {
            model.collection_id_taken(candidate)
        })
        .ok_or_else(|| Error::IdentifierCollision {
            row: record.row,
            kind: "collection",
            id: template.render(&values.context(start)),
        })?;

        debug!(row = record.row, %id, collection = %key.name, "generated collection id");
        self.counts.collection_ids += 1;
        model.assign_collection(&key, &id);
        Ok(id)
    }
}

/// Render `template` starting at sequence `start`, skipping taken values.
///
/// Only templates that use `{group_seq}` can move past a taken value; any
/// other template yields `None` on its first collision.
fn render_free(
    template: &IdTemplate,
    values: &RowValues<'_>,
    start: usize,
    taken: impl Fn(&str) -> bool,
) -> Option<String> {
    let sequenced = template.uses(Placeholder::GroupSeq);
    let mut seq = start;
    loop {
        let candidate = template.render(&values.context(seq));
        if !taken(&candidate) {
            return Some(candidate);
        }
        if !sequenced {
            return None;
        }
        seq += 1;
    }
}
