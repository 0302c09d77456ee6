//! Event storage.

use std::path::Path;

use eventfold_core::{Event, Occurrence, RangeFilter};
use eventfold_protocol::EventFilters;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};

/// Read access to stored events.
///
/// Date filtering can only be pushed down for non-recurring events; a
/// recurring event's occurrences are not known until it is expanded.
pub trait EventStore: Send + Sync {
    /// Non-recurring events matching the filters whose single occurrence
    /// falls in `range`.
    fn non_recurring(&self, filters: &EventFilters, range: &RangeFilter)
    -> SourceResult<Vec<Event>>;

    /// Recurring events matching the filters, without date filtering.
    fn recurring(&self, filters: &EventFilters) -> SourceResult<Vec<Event>>;
}

/// Returns true if the event passes status, attribute and taxonomy filters.
pub fn matches_filters(event: &Event, filters: &EventFilters) -> bool {
    event.status == filters.status
        && filters.matches_attributes(&event.event_type, &event.service_body)
        && filters.taxonomy.matches_event(event)
}

/// An in-memory event store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Vec<Event>,
    skipped: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoreFile {
    Wrapped { events: Vec<Value> },
    Bare(Vec<Value>),
}

impl MemoryStore {
    /// Creates a store holding `events`.
    pub fn new(events: Vec<Event>) -> Self {
        Self { events, skipped: 0 }
    }

    /// Parses events from JSON: an array, or an object with an `events` array.
    ///
    /// Entries that are not valid events (a malformed date, a missing title)
    /// are logged and skipped; only a file of the wrong shape is an error.
    pub fn from_json(json: &str) -> SourceResult<Self> {
        let file: StoreFile = serde_json::from_str(json).map_err(|e| {
            SourceError::storage(format!("invalid event file: {e}")).with_source(e)
        })?;
        let entries = match file {
            StoreFile::Wrapped { events } | StoreFile::Bare(events) => events,
        };

        let mut events = Vec::with_capacity(entries.len());
        let mut skipped = 0;
        for entry in entries {
            let id = entry_id(&entry);
            match serde_json::from_value::<Event>(entry) {
                Ok(event) => events.push(event),
                Err(e) => {
                    warn!(event_id = %id, error = %e, "Skipping unreadable stored event");
                    skipped += 1;
                }
            }
        }
        Ok(Self { events, skipped })
    }

    /// Loads events from a JSON file.
    pub fn load(path: &Path) -> SourceResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SourceError::storage(format!("failed to read {}: {e}", path.display())).with_source(e)
        })?;
        let store = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            count = store.events.len(),
            skipped = store.skipped,
            "Loaded event store"
        );
        Ok(store)
    }

    /// Returns every stored event.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of entries skipped while loading.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns the event with the given id.
    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Adds an event.
    pub fn insert(&mut self, event: Event) {
        self.events.push(event);
    }
}

fn entry_id(entry: &Value) -> String {
    match entry.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => "?".to_string(),
    }
}

impl EventStore for MemoryStore {
    fn non_recurring(
        &self,
        filters: &EventFilters,
        range: &RangeFilter,
    ) -> SourceResult<Vec<Event>> {
        Ok(self
            .events
            .iter()
            .filter(|e| !e.is_recurring() && matches_filters(e, filters))
            .filter(|e| range.includes(&Occurrence::single(e)))
            .cloned()
            .collect())
    }

    fn recurring(&self, filters: &EventFilters) -> SourceResult<Vec<Event>> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.is_recurring() && matches_filters(e, filters))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use eventfold_core::{RangeMode, RecurrencePattern, Relation, TaxonomyFilter};
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> MemoryStore {
        MemoryStore::new(vec![
            Event::new("1", "Past", date(2025, 1, 10)).with_event_type("Service"),
            Event::new("2", "Future", date(2025, 4, 10))
                .with_event_type("Service")
                .with_service_body("3"),
            Event::new("3", "Draft", date(2025, 4, 11)).with_status("draft"),
            Event::new("4", "Weekly", date(2025, 1, 1))
                .with_event_type("Activity")
                .with_tag("online")
                .with_recurrence(RecurrencePattern::weekly(1, &[3])),
            Event::new("5", "Once", date(2025, 5, 1))
                .with_recurrence(RecurrencePattern::none()),
        ])
    }

    fn upcoming() -> RangeFilter {
        RangeFilter::new(RangeMode::Upcoming, date(2025, 3, 1))
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    mod queries {
        use super::*;

        #[test]
        fn non_recurring_applies_dates_and_status() {
            let events = store()
                .non_recurring(&EventFilters::default(), &upcoming())
                .unwrap();
            assert_eq!(ids(&events), vec!["2", "5"]);
        }

        #[test]
        fn recurring_ignores_dates() {
            let events = store().recurring(&EventFilters::default()).unwrap();
            assert_eq!(ids(&events), vec!["4"]);
        }

        #[test]
        fn attribute_filters() {
            let filters = EventFilters {
                event_type: Some("Service".to_string()),
                service_bodies: vec!["3".to_string()],
                ..EventFilters::default()
            };
            let events = store().non_recurring(&filters, &upcoming()).unwrap();
            assert_eq!(ids(&events), vec!["2"]);
            assert!(store().recurring(&filters).unwrap().is_empty());
        }

        #[test]
        fn taxonomy_applies_to_recurring() {
            let filters = EventFilters {
                taxonomy: TaxonomyFilter::parse("", Relation::Or, "-online"),
                ..EventFilters::default()
            };
            assert!(store().recurring(&filters).unwrap().is_empty());
        }

        #[test]
        fn status_filter() {
            let filters = EventFilters {
                status: "draft".to_string(),
                ..EventFilters::default()
            };
            let events = store().non_recurring(&filters, &upcoming()).unwrap();
            assert_eq!(ids(&events), vec!["3"]);
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn wrapped_and_bare() {
            let bare = r#"[{"id": "1", "title": "A", "start_date": "2025-01-01"}]"#;
            assert_eq!(MemoryStore::from_json(bare).unwrap().events().len(), 1);

            let wrapped = r#"{"events": [{"id": "1", "title": "A", "start_date": "2025-01-01"}]}"#;
            let store = MemoryStore::from_json(wrapped).unwrap();
            assert_eq!(store.get("1").map(|e| e.title.as_str()), Some("A"));
        }

        #[test]
        fn invalid_json_is_storage_error() {
            let err = MemoryStore::from_json("{not json").unwrap_err();
            assert_eq!(err.code(), crate::error::SourceErrorCode::StorageError);

            let err = MemoryStore::from_json(r#"{"events": 3}"#).unwrap_err();
            assert_eq!(err.code(), crate::error::SourceErrorCode::StorageError);
        }

        #[test]
        fn bad_entries_are_skipped() {
            let json = r#"[
                {"id": "good", "title": "Picnic", "start_date": "2025-06-01"},
                {"id": "bad-date", "title": "Daily", "start_date": "2025-13-45",
                 "recurrence": {"type": "daily", "interval": 1}},
                {"id": 7, "title": "Retreat", "start_date": "2025-06-02", "exceptions": ["not-a-date"]},
                {"id": "blank", "title": "Undated", "start_date": ""},
                {"title": "No id"}
            ]"#;
            let store = MemoryStore::from_json(json).unwrap();

            let ids: Vec<_> = store.events().iter().map(|e| e.id.as_str()).collect();
            assert_eq!(ids, vec!["good", "blank"]);
            assert_eq!(store.get("blank").unwrap().start_date, None);
            assert_eq!(store.skipped(), 3);
        }

        #[test]
        fn load_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(
                file,
                r#"[{{"id": "9", "title": "Picnic", "start_date": "2025-06-01", "tags": [{{"slug": "outdoor"}}]}}]"#
            )
            .unwrap();

            let store = MemoryStore::load(file.path()).unwrap();
            assert!(store.get("9").unwrap().has_tag("outdoor"));
        }

        #[test]
        fn missing_file() {
            let dir = tempfile::tempdir().unwrap();
            let err = MemoryStore::load(&dir.path().join("missing.json")).unwrap_err();
            assert_eq!(err.code(), crate::error::SourceErrorCode::StorageError);
        }
    }
}
