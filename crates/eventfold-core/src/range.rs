//! Date-range selection of occurrences.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::event::Occurrence;

/// Which occurrences a listing asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RangeMode {
    /// Occurrences that have not ended before today.
    #[default]
    Upcoming,
    /// Occurrences that ended before today.
    Archive,
    /// Occurrences overlapping `[start, end]`, both inclusive.
    Explicit { start: NaiveDate, end: NaiveDate },
}

impl RangeMode {
    /// Resolves request inputs into a mode.
    ///
    /// An explicit range needs both bounds and wins over `archive`.
    pub fn resolve(start: Option<NaiveDate>, end: Option<NaiveDate>, archive: bool) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => Self::Explicit { start, end },
            _ if archive => Self::Archive,
            _ => Self::Upcoming,
        }
    }

    /// Returns true for [`RangeMode::Archive`].
    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive)
    }
}

/// A [`RangeMode`] bound to a specific "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeFilter {
    mode: RangeMode,
    today: NaiveDate,
}

impl RangeFilter {
    /// Creates a filter. `today` is the current date in the request's zone.
    pub fn new(mode: RangeMode, today: NaiveDate) -> Self {
        Self { mode, today }
    }

    /// Returns the mode.
    pub fn mode(&self) -> RangeMode {
        self.mode
    }

    /// Returns the reference date.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Returns true if the occurrence falls inside the range.
    ///
    /// Occurrences without a start date never match.
    pub fn includes(&self, occurrence: &Occurrence) -> bool {
        let Some(start) = occurrence.start_date else {
            return false;
        };
        let end = occurrence.end_date.unwrap_or(start);
        self.includes_dates(start, end)
    }

    /// Applies the filter to an explicit `[start, end]` pair.
    pub fn includes_dates(&self, start: NaiveDate, end: NaiveDate) -> bool {
        match self.mode {
            RangeMode::Explicit {
                start: range_start,
                end: range_end,
            } => start <= range_end && end >= range_start,
            RangeMode::Archive => end < self.today,
            RangeMode::Upcoming => start >= self.today || end >= self.today,
        }
    }

    /// Keeps the matching occurrences, preserving order.
    pub fn retain(&self, occurrences: &mut Vec<Occurrence>) {
        occurrences.retain(|o| self.includes(o));
    }
}
