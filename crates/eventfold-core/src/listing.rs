//! Ordering and pagination of merged occurrence lists.

use std::cmp::Ordering;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::event::Occurrence;

/// Sort direction on `(start date, start time)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses `ASC`/`DESC` case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Returns the wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares two occurrences by start date then start time.
///
/// A missing start date sorts after every dated occurrence in both
/// directions; a missing start time counts as midnight.
pub fn compare_start(a: &Occurrence, b: &Occurrence, order: SortOrder) -> Ordering {
    match (a.start_date, b.start_date) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(da), Some(db)) => {
            let ka = (da, a.start_time.unwrap_or(NaiveTime::MIN));
            let kb = (db, b.start_time.unwrap_or(NaiveTime::MIN));
            match order {
                SortOrder::Asc => ka.cmp(&kb),
                SortOrder::Desc => kb.cmp(&ka),
            }
        }
    }
}

/// Sorts in place. Equal keys keep their relative order.
pub fn sort_occurrences(occurrences: &mut [Occurrence], order: SortOrder) {
    occurrences.sort_by(|a, b| compare_start(a, b, order));
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Items across all pages.
    pub total: usize,
    /// Page size used.
    pub per_page: usize,
    /// The page returned, after clamping.
    pub current_page: usize,
    /// `ceil(total / per_page)`; zero for an empty listing.
    pub total_pages: usize,
}

/// Slices `items` into the requested page.
///
/// `page` is clamped into `[1, max(1, total_pages)]`; a `per_page` of zero
/// is treated as one.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    let current_page = page.clamp(1, total_pages.max(1));
    let offset = (current_page - 1) * per_page;

    let items = items.into_iter().skip(offset).take(per_page).collect();

    Page {
        items,
        total,
        per_page,
        current_page,
        total_pages,
    }
}
