//! Identifier templates.
//!
//! Identifiers are synthesized from a short pattern such as
//! `CCLW.{category}.{action_id}.{document_number}`. Patterns are parsed once
//! into segments; an unknown placeholder name is rejected at parse time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A value that can be substituted into an identifier template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Lowercased category of the row.
    Category,
    /// External action identifier grouping several families.
    ActionId,
    /// Source document number within the action (`0` when blank).
    DocumentNumber,
    /// Lowercased identifier tag (e.g. author type).
    IdTag,
    /// 1-based row position plus the run offset.
    Row,
    /// 0-based row position plus the run offset.
    Index,
    /// Per-group sequence counter.
    GroupSeq,
}

impl Placeholder {
    const ALL: [Self; 7] = [
        Self::Category,
        Self::ActionId,
        Self::DocumentNumber,
        Self::IdTag,
        Self::Row,
        Self::Index,
        Self::GroupSeq,
    ];

    /// The name used between braces in a template.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::ActionId => "action_id",
            Self::DocumentNumber => "document_number",
            Self::IdTag => "id_tag",
            Self::Row => "row",
            Self::Index => "index",
            Self::GroupSeq => "group_seq",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Value(Placeholder),
}

/// Per-row values available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext<'a> {
    /// See [`Placeholder::Category`].
    pub category: &'a str,
    /// See [`Placeholder::ActionId`].
    pub action_id: &'a str,
    /// See [`Placeholder::DocumentNumber`].
    pub document_number: &'a str,
    /// See [`Placeholder::IdTag`].
    pub id_tag: &'a str,
    /// See [`Placeholder::Row`].
    pub row: usize,
    /// See [`Placeholder::Index`].
    pub index: usize,
    /// See [`Placeholder::GroupSeq`].
    pub group_seq: usize,
}

/// A parsed identifier template.
///
/// Serializes as its source string; deserializing parses and rejects invalid
/// templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl IdTemplate {
    /// Parse a template string.
    ///
    /// `{{` and `}}` escape literal braces.
    pub fn parse(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Err(Error::Template("template is empty".into()));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                },
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                },
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }
                    if !closed {
                        return Err(Error::Template(format!(
                            "unclosed placeholder in '{source}'"
                        )));
                    }
                    let placeholder = Placeholder::from_name(name.trim()).ok_or_else(|| {
                        Error::Template(format!("unknown placeholder '{{{name}}}' in '{source}'"))
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Value(placeholder));
                },
                '}' => {
                    return Err(Error::Template(format!(
                        "unmatched '}}' in '{source}'"
                    )));
                },
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The original template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the template references `placeholder`.
    #[must_use]
    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.placeholders().any(|p| p == placeholder)
    }

    /// Placeholders referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Value(p) => Some(*p),
            Segment::Literal(_) => None,
        })
    }

    /// Render the template for one row.
    #[must_use]
    pub fn render(&self, ctx: &TemplateContext<'_>) -> String {
        let mut out = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Value(p) => match p {
                    Placeholder::Category => out.push_str(ctx.category),
                    Placeholder::ActionId => out.push_str(ctx.action_id),
                    Placeholder::DocumentNumber => out.push_str(ctx.document_number),
                    Placeholder::IdTag => out.push_str(ctx.id_tag),
                    Placeholder::Row => out.push_str(&ctx.row.to_string()),
                    Placeholder::Index => out.push_str(&ctx.index.to_string()),
                    Placeholder::GroupSeq => out.push_str(&ctx.group_seq.to_string()),
                },
            }
        }
        out
    }
}

impl TryFrom<String> for IdTemplate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<IdTemplate> for String {
    fn from(template: IdTemplate) -> Self {
        template.source
    }
}

impl fmt::Display for IdTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
