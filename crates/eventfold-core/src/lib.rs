//! Core types: events, recurrence expansion, range and taxonomy filters, ordering

pub mod event;
pub mod listing;
pub mod range;
pub mod recurrence;
pub mod taxonomy;
pub mod time;
pub mod tracing;

pub use event::{DEFAULT_STATUS, Event, Location, Occurrence, Term};
pub use listing::{Page, SortOrder, compare_start, paginate, sort_occurrences};
pub use range::{RangeFilter, RangeMode};
pub use recurrence::{
    ExpansionError, Frequency, GenerationLimits, MonthlyMode, OccurrenceGenerator,
    RecurrencePattern, RecurrenceRule, WeekOfMonth,
};
pub use taxonomy::{Relation, TaxonomyFilter, TermFilter, retain_by_tags};
pub use time::{parse_date, parse_time, parse_timezone, today_in};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
