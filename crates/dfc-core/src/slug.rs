//! Slug construction and collision-free suffixing.
//!
//! A slug is the slugified title or family name followed by `_` and a short
//! random suffix, e.g. `paris-agreement_3f2a`. Documents and families share
//! one namespace, so the generator is always handed the run's full slug set.

use std::collections::HashSet;

use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use uuid::Uuid;

use crate::{Error, Result};

/// Turn free text into a URL-safe slug base.
///
/// Decomposes to NFKD and drops combining marks, then transliterates what is
/// left to ASCII (`ß` → `ss`, `Ł` → `L`, `Þ` → `Th`). Apostrophes are
/// removed, letters lowercased, and every other run of non-alphanumeric
/// characters collapses into a single `-`. Leading and trailing separators
/// are trimmed; the result may be empty.
///
/// ```rust
/// use dfc_core::slugify;
///
/// assert_eq!(slugify("  Loi 2015-992 relative à la Transition  "), "loi-2015-992-relative-a-la-transition");
/// assert_eq!(slugify("Children's Act"), "childrens-act");
/// assert_eq!(slugify("Łódź Climate Act"), "lodz-climate-act");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let folded: String = text.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let ascii = deunicode(&folded);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c == '\'' {
            continue;
        }
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Source of random slug suffixes.
///
/// The default draws from UUID v4; tests substitute a deterministic source.
pub trait SuffixSource {
    /// Produce a suffix of `len` characters.
    fn next_suffix(&mut self, len: usize) -> String;
}

/// Suffixes taken from the hex digits of a random UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSuffix;

impl SuffixSource for UuidSuffix {
    fn next_suffix(&mut self, len: usize) -> String {
        let mut hex = Uuid::new_v4().simple().to_string();
        hex.truncate(len);
        hex
    }
}

impl<F> SuffixSource for F
where
    F: FnMut(usize) -> String,
{
    fn next_suffix(&mut self, len: usize) -> String {
        self(len)
    }
}

/// Longest suffix a UUID can supply.
pub const MAX_SUFFIX_LENGTH: usize = 32;

const fn default_suffix_length() -> usize {
    4
}

const fn default_max_attempts() -> usize {
    100
}

/// Tunables for slug generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugSettings {
    /// Number of suffix characters.
    #[serde(default = "default_suffix_length")]
    pub suffix_length: usize,
    /// Number of suffixes drawn before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for SlugSettings {
    fn default() -> Self {
        Self {
            suffix_length: default_suffix_length(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl SlugSettings {
    /// Reject settings that cannot produce a slug.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SUFFIX_LENGTH).contains(&self.suffix_length) {
            return Err(Error::Config(format!(
                "slug.suffix_length must be between 1 and {MAX_SUFFIX_LENGTH}, got {}",
                self.suffix_length
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config("slug.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

/// Generates slugs that are unique within a slug set.
#[derive(Debug)]
pub struct SlugGenerator<S = UuidSuffix> {
    settings: SlugSettings,
    source: S,
}

impl SlugGenerator<UuidSuffix> {
    /// Generator drawing random UUID suffixes.
    #[must_use]
    pub const fn new(settings: SlugSettings) -> Self {
        Self {
            settings,
            source: UuidSuffix,
        }
    }
}

impl<S: SuffixSource> SlugGenerator<S> {
    /// Generator drawing suffixes from `source`.
    pub const fn with_source(settings: SlugSettings, source: S) -> Self {
        Self { settings, source }
    }

    /// Produce `base_suffix` not present in `taken` and register it there.
    ///
    /// Draws at most `max_attempts` suffixes, then fails with
    /// [`Error::SlugExhausted`].
    pub fn generate(&mut self, base: &str, taken: &mut HashSet<String>) -> Result<String> {
        for attempt in 1..=self.settings.max_attempts {
            let suffix = self.source.next_suffix(self.settings.suffix_length);
            let candidate = format!("{base}_{suffix}");
            if taken.insert(candidate.clone()) {
                if attempt > 1 {
                    debug!(base, attempt, "slug suffix collided before succeeding");
                }
                return Ok(candidate);
            }
        }
        Err(Error::SlugExhausted {
            base: base.to_string(),
            attempts: self.settings.max_attempts,
        })
    }
}
