//! Category and tag filters.
//!
//! Filters come in as comma-separated slug lists where a leading `-` marks
//! an exclusion: `"news, -archive"` includes `news` and excludes `archive`.
//! Blank entries are ignored and whitespace around each slug is trimmed.

use serde::{Deserialize, Serialize};

use crate::event::{Event, Occurrence, Term};

/// How multiple included categories combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relation {
    /// All included terms must be present.
    And,
    /// Any included term suffices.
    #[default]
    Or,
}

impl Relation {
    /// Parses `AND`/`OR` case-insensitively; anything else is `Or`.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("and") {
            Self::And
        } else {
            Self::Or
        }
    }

    /// Parses an optional value, `None` meaning the given default.
    pub fn parse_or(value: Option<&str>, default: Self) -> Self {
        match value.map(str::trim) {
            None | Some("") => default,
            Some(v) => Self::parse(v),
        }
    }
}

/// Included and excluded slugs for one taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermFilter {
    /// Slugs the item should carry.
    pub include: Vec<String>,
    /// Slugs the item must not carry.
    pub exclude: Vec<String>,
}

impl TermFilter {
    /// Parses a comma-separated list such as `"news,-archive"`.
    pub fn parse(value: &str) -> Self {
        let mut filter = Self::default();
        for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match item.strip_prefix('-') {
                Some(excluded) => {
                    let excluded = excluded.trim();
                    if !excluded.is_empty() {
                        filter.exclude.push(excluded.to_string());
                    }
                }
                None => filter.include.push(item.to_string()),
            }
        }
        filter
    }

    /// Returns true if the filter has neither includes nor excludes.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Matches a set of terms.
    ///
    /// An excluded slug always rejects. With includes present, `Or` needs at
    /// least one of them and `And` needs all of them.
    pub fn matches(&self, terms: &[Term], relation: Relation) -> bool {
        let has = |slug: &String| terms.iter().any(|t| &t.slug == slug);

        if self.exclude.iter().any(has) {
            return false;
        }
        if self.include.is_empty() {
            return true;
        }
        match relation {
            Relation::Or => self.include.iter().any(has),
            Relation::And => self.include.iter().all(has),
        }
    }
}

/// Renders back into the request form, includes first.
impl std::fmt::Display for TermFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items = self
            .include
            .iter()
            .map(|s| s.to_string())
            .chain(self.exclude.iter().map(|s| format!("-{s}")))
            .collect::<Vec<_>>();
        f.write_str(&items.join(","))
    }
}

/// Combined category and tag filter, each with its own [`Relation`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyFilter {
    pub categories: TermFilter,
    pub category_relation: Relation,
    pub tags: TermFilter,
    pub tag_relation: Relation,
}

impl TaxonomyFilter {
    /// Builds a filter from raw request strings. Tags match any-of.
    pub fn parse(categories: &str, category_relation: Relation, tags: &str) -> Self {
        Self {
            categories: TermFilter::parse(categories),
            category_relation,
            tags: TermFilter::parse(tags),
            tag_relation: Relation::Or,
        }
    }

    /// Builder method to set the tag relation.
    pub fn with_tag_relation(mut self, relation: Relation) -> Self {
        self.tag_relation = relation;
        self
    }

    /// Returns true if the filter constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.tags.is_empty()
    }

    fn matches_terms(&self, categories: &[Term], tags: &[Term]) -> bool {
        self.categories.matches(categories, self.category_relation)
            && self.tags.matches(tags, self.tag_relation)
    }

    /// Matches a stored event.
    pub fn matches_event(&self, event: &Event) -> bool {
        self.matches_terms(&event.categories, &event.tags)
    }

    /// Matches an occurrence.
    pub fn matches_occurrence(&self, occurrence: &Occurrence) -> bool {
        self.matches_terms(&occurrence.categories, &occurrence.tags)
    }
}

/// Re-applies a tag filter to occurrences, keeping their order.
///
/// Remote sources may ignore the tag parameter they are sent, so their
/// results are narrowed again locally.
pub fn retain_by_tags(occurrences: &mut Vec<Occurrence>, tags: &TermFilter) {
    if tags.is_empty() {
        return;
    }
    occurrences.retain(|o| tags.matches(&o.tags, Relation::Or));
}
