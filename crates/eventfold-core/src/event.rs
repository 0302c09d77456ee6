//! Event types.
//!
//! This module provides the two shapes an event takes inside the engine:
//! - [`Event`]: one stored definition, possibly recurring
//! - [`Occurrence`]: one concrete calendar instance, produced per request
//!
//! Plus the small value types they share ([`Location`], [`Term`]).

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrencePattern;

/// Default publication status of stored events.
pub const DEFAULT_STATUS: &str = "publish";

/// Where an event takes place. All parts are optional free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Venue name.
    pub name: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Extra directions (room, floor, parking).
    pub details: Option<String>,
}

impl Location {
    /// Returns true if no part of the location is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none() && self.details.is_none()
    }
}

/// A taxonomy term (category or tag) attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Numeric term id, when the store has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// URL-safe identifier used by filters.
    pub slug: String,
}

impl Term {
    /// Creates a term whose name equals its slug.
    pub fn new(slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            id: None,
            name: slug.clone(),
            slug,
        }
    }

    /// Builder method to set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// One stored event definition.
///
/// Events are owned by the content store; the engine only reads them. An
/// event without a recurrence pattern (or with pattern type `none`) occurs
/// exactly once over `[start_date, end_date]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier, unique within its source.
    pub id: String,
    /// Event title.
    pub title: String,
    /// Long-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form type label (e.g. "Service", "Activity").
    #[serde(default)]
    pub event_type: String,
    /// Owning organizational unit, or empty.
    #[serde(default)]
    pub service_body: String,
    /// Publication status.
    #[serde(default = "default_status")]
    pub status: String,
    /// First (or only) day of the event. Blank means unset.
    #[serde(default, with = "opt_date")]
    pub start_date: Option<NaiveDate>,
    /// Last day of the event; defaults to `start_date`.
    #[serde(default, with = "opt_date")]
    pub end_date: Option<NaiveDate>,
    /// Time of day the event starts.
    #[serde(default, with = "opt_time")]
    pub start_time: Option<NaiveTime>,
    /// Time of day the event ends.
    #[serde(default, with = "opt_time")]
    pub end_time: Option<NaiveTime>,
    /// IANA timezone name; `None` means the system zone.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Venue.
    #[serde(default)]
    pub location: Location,
    /// Category terms.
    #[serde(default)]
    pub categories: Vec<Term>,
    /// Tag terms.
    #[serde(default)]
    pub tags: Vec<Term>,
    /// Public link to the event page.
    #[serde(default)]
    pub link: Option<String>,
    /// Stored recurrence pattern, if any.
    #[serde(default)]
    pub recurrence: Option<RecurrencePattern>,
    /// Dates suppressed from the generated occurrence sequence.
    #[serde(default)]
    pub exceptions: BTreeSet<NaiveDate>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl Event {
    /// Creates a single-day, non-recurring event.
    pub fn new(id: impl Into<String>, title: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            event_type: String::new(),
            service_body: String::new(),
            status: default_status(),
            start_date: Some(start_date),
            end_date: None,
            start_time: None,
            end_time: None,
            timezone: None,
            location: Location::default(),
            categories: Vec::new(),
            tags: Vec::new(),
            link: None,
            recurrence: None,
            exceptions: BTreeSet::new(),
        }
    }

    /// Returns the end date, falling back to the start date.
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        self.end_date.or(self.start_date)
    }

    /// Returns the number of days between start and end date.
    ///
    /// An end date before the start date counts as a zero-day span.
    pub fn span_days(&self) -> i64 {
        match (self.start_date, self.effective_end_date()) {
            (Some(start), Some(end)) => (end - start).num_days().max(0),
            _ => 0,
        }
    }

    /// Returns true if the event carries a recurrence pattern other than `none`.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.as_ref().is_some_and(|p| !p.is_none())
    }

    /// Returns true if the event has a tag with the given slug.
    pub fn has_tag(&self, slug: &str) -> bool {
        self.tags.iter().any(|t| t.slug == slug)
    }

    /// Returns true if the event has a category with the given slug.
    pub fn has_category(&self, slug: &str) -> bool {
        self.categories.iter().any(|t| t.slug == slug)
    }

    /// Builder method to set the end date.
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Builder method to set start and end times.
    pub fn with_times(mut self, start: NaiveTime, end: Option<NaiveTime>) -> Self {
        self.start_time = Some(start);
        self.end_time = end;
        self
    }

    /// Builder method to set the event type.
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    /// Builder method to set the service body.
    pub fn with_service_body(mut self, service_body: impl Into<String>) -> Self {
        self.service_body = service_body.into();
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Builder method to set the timezone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Builder method to add a tag.
    pub fn with_tag(mut self, slug: impl Into<String>) -> Self {
        self.tags.push(Term::new(slug));
        self
    }

    /// Builder method to add a category.
    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.categories.push(Term::new(slug));
        self
    }

    /// Builder method to attach a recurrence pattern.
    pub fn with_recurrence(mut self, pattern: RecurrencePattern) -> Self {
        self.recurrence = Some(pattern);
        self
    }

    /// Builder method to add an exception date.
    pub fn with_exception(mut self, date: NaiveDate) -> Self {
        self.exceptions.insert(date);
        self
    }
}

/// One concrete calendar instance of an event.
///
/// Occurrences are created per request and never stored. Local occurrences
/// are built from an [`Event`]; remote ones are decoded from the listing
/// contract, which is why the start date may be unresolvable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Id of the event this occurrence was produced from.
    pub source_event_id: String,
    /// Which source produced it (`local` or a remote id).
    pub source_id: String,
    /// Event title.
    pub title: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Free-form type label.
    pub event_type: String,
    /// Owning organizational unit, or empty.
    pub service_body: String,
    /// Start date of this instance.
    pub start_date: Option<NaiveDate>,
    /// End date of this instance.
    pub end_date: Option<NaiveDate>,
    /// Time of day the instance starts.
    pub start_time: Option<NaiveTime>,
    /// Time of day the instance ends.
    pub end_time: Option<NaiveTime>,
    /// IANA timezone name.
    pub timezone: Option<String>,
    /// Venue.
    pub location: Location,
    /// Category terms.
    pub categories: Vec<Term>,
    /// Tag terms.
    pub tags: Vec<Term>,
    /// Public link to the event page.
    pub link: Option<String>,
    /// Whether this is an instance of a recurring event.
    pub is_recurring: bool,
}

impl Occurrence {
    /// Creates the single occurrence of a non-recurring event.
    pub fn single(event: &Event) -> Self {
        Self::from_event(event, event.start_date, event.effective_end_date(), false)
    }

    /// Creates one instance of a recurring event on `start`.
    ///
    /// The end date keeps the original event's day span.
    pub fn instance(event: &Event, start: NaiveDate) -> Self {
        let end = start
            .checked_add_days(chrono::Days::new(event.span_days() as u64))
            .unwrap_or(start);
        Self::from_event(event, Some(start), Some(end), true)
    }

    fn from_event(
        event: &Event,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        is_recurring: bool,
    ) -> Self {
        Self {
            source_event_id: event.id.clone(),
            source_id: String::new(),
            title: event.title.clone(),
            description: event.description.clone(),
            event_type: event.event_type.clone(),
            service_body: event.service_body.clone(),
            start_date,
            end_date,
            start_time: event.start_time,
            end_time: event.end_time,
            timezone: event.timezone.clone(),
            location: event.location.clone(),
            categories: event.categories.clone(),
            tags: event.tags.clone(),
            link: event.link.clone(),
            is_recurring,
        }
    }

    /// Returns the end date, falling back to the start date.
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        self.end_date.or(self.start_date)
    }

    /// Returns true if the occurrence carries a tag with the given slug.
    pub fn has_tag(&self, slug: &str) -> bool {
        self.tags.iter().any(|t| t.slug == slug)
    }

    /// Builder method to set the producing source.
    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = source_id.into();
        self
    }
}

/// Serde support for optional stored dates.
///
/// Blank strings are unset; anything [`parse_date`](crate::time::parse_date)
/// rejects is an error.
pub(crate) mod opt_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => crate::time::parse_date(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s}"))),
        }
    }
}

/// Serde support for optional `HH:MM[:SS]` times.
pub(crate) mod opt_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => serializer.serialize_str(&t.format("%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => crate::time::parse_time(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::RecurrencePattern;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod event {
        use super::*;

        #[test]
        fn defaults() {
            let event = Event::new("42", "Group Meeting", date(2025, 3, 1));
            assert_eq!(event.status, DEFAULT_STATUS);
            assert_eq!(event.effective_end_date(), Some(date(2025, 3, 1)));
            assert_eq!(event.span_days(), 0);
            assert!(!event.is_recurring());
            assert!(event.location.is_empty());
        }

        #[test]
        fn span_and_backwards_end() {
            let event = Event::new("1", "Retreat", date(2025, 3, 1)).with_end_date(date(2025, 3, 3));
            assert_eq!(event.span_days(), 2);

            let event = Event::new("2", "Typo", date(2025, 3, 3)).with_end_date(date(2025, 3, 1));
            assert_eq!(event.span_days(), 0);
        }

        #[test]
        fn none_pattern_is_not_recurring() {
            let event = Event::new("1", "Once", date(2025, 3, 1)).with_recurrence(RecurrencePattern::none());
            assert!(!event.is_recurring());

            let event = Event::new("1", "Daily", date(2025, 3, 1)).with_recurrence(RecurrencePattern::daily(1));
            assert!(event.is_recurring());
        }

        #[test]
        fn taxonomy_lookup() {
            let event = Event::new("1", "Picnic", date(2025, 6, 1))
                .with_tag("outdoor")
                .with_category("social");
            assert!(event.has_tag("outdoor"));
            assert!(!event.has_tag("social"));
            assert!(event.has_category("social"));
        }

        #[test]
        fn deserialize_stored_shape() {
            let json = r#"{
                "id": "17",
                "title": "Thursday Night Group",
                "event_type": "Service",
                "start_date": "2025-01-16",
                "start_time": "18:00",
                "end_time": "19:30:00",
                "timezone": "America/Chicago",
                "tags": [{"name": "Open", "slug": "open"}],
                "recurrence": {"type": "weekly", "interval": 1, "weekdays": [4]},
                "exceptions": ["2025-01-23"]
            }"#;
            let event: Event = serde_json::from_str(json).unwrap();
            assert_eq!(event.status, "publish");
            assert_eq!(event.start_time, NaiveTime::from_hms_opt(18, 0, 0));
            assert_eq!(event.end_time, NaiveTime::from_hms_opt(19, 30, 0));
            assert!(event.is_recurring());
            assert!(event.exceptions.contains(&date(2025, 1, 23)));
            assert!(event.has_tag("open"));
        }

        #[test]
        fn blank_dates_are_unset() {
            let json = r#"{"id": "1", "title": "x", "start_date": "", "end_date": null}"#;
            let event: Event = serde_json::from_str(json).unwrap();
            assert_eq!(event.start_date, None);
            assert_eq!(event.end_date, None);

            let json = r#"{"id": "2", "title": "y", "start_date": "2025-02-01 18:00:00"}"#;
            let event: Event = serde_json::from_str(json).unwrap();
            assert_eq!(event.start_date, Some(date(2025, 2, 1)));
        }

        #[test]
        fn rejects_bad_dates() {
            let json = r#"{"id": "1", "title": "x", "start_date": "2025-13-45"}"#;
            assert!(serde_json::from_str::<Event>(json).is_err());

            let json = r#"{"id": "1", "title": "x", "start_date": "2025-01-01", "exceptions": ["not-a-date"]}"#;
            assert!(serde_json::from_str::<Event>(json).is_err());
        }

        #[test]
        fn rejects_bad_time() {
            let json = r#"{"id": "1", "title": "x", "start_time": "noon"}"#;
            assert!(serde_json::from_str::<Event>(json).is_err());
        }
    }

    mod occurrence {
        use super::*;

        #[test]
        fn single_copies_fields() {
            let event = Event::new("9", "Workshop", date(2025, 3, 1))
                .with_end_date(date(2025, 3, 2))
                .with_event_type("Activity")
                .with_tag("ws");
            let occ = Occurrence::single(&event).with_source("local");

            assert_eq!(occ.source_event_id, "9");
            assert_eq!(occ.source_id, "local");
            assert_eq!(occ.start_date, Some(date(2025, 3, 1)));
            assert_eq!(occ.end_date, Some(date(2025, 3, 2)));
            assert_eq!(occ.event_type, "Activity");
            assert!(occ.has_tag("ws"));
            assert!(!occ.is_recurring);
        }

        #[test]
        fn instance_keeps_span() {
            let event = Event::new("9", "Retreat", date(2025, 3, 1)).with_end_date(date(2025, 3, 3));
            let occ = Occurrence::instance(&event, date(2025, 4, 5));

            assert_eq!(occ.start_date, Some(date(2025, 4, 5)));
            assert_eq!(occ.end_date, Some(date(2025, 4, 7)));
            assert!(occ.is_recurring);
        }
    }
}
