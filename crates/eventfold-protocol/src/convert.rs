//! Conversion between [`Occurrence`] and [`WireEvent`].

use chrono::{NaiveTime, Timelike};
use eventfold_core::{Location, Occurrence, Term, parse_date, parse_time};

use crate::types::{WireEvent, WireId, WireMeta, WireTerm, WireText};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `HH:MM`, or `HH:MM:SS` when the seconds are set.
fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

fn term_to_wire(term: &Term) -> WireTerm {
    WireTerm {
        id: term.id.map(WireId::Number),
        name: term.name.clone(),
        slug: term.slug.clone(),
        link: None,
    }
}

fn term_from_wire(term: &WireTerm) -> Term {
    let id = match &term.id {
        Some(WireId::Number(n)) => Some(*n),
        Some(WireId::Text(s)) => s.parse().ok(),
        None => None,
    };
    Term {
        id,
        name: if term.name.is_empty() {
            term.slug.clone()
        } else {
            term.name.clone()
        },
        slug: term.slug.clone(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl From<&Occurrence> for WireEvent {
    fn from(occurrence: &Occurrence) -> Self {
        Self {
            id: WireId::from(occurrence.source_event_id.as_str()),
            title: WireText::rendered(occurrence.title.clone()),
            content: Some(WireText::rendered(
                occurrence.description.clone().unwrap_or_default(),
            )),
            link: occurrence.link.clone(),
            meta: WireMeta {
                event_start_date: occurrence
                    .start_date
                    .map(|d| d.format(DATE_FORMAT).to_string()),
                event_end_date: occurrence
                    .effective_end_date()
                    .map(|d| d.format(DATE_FORMAT).to_string()),
                event_start_time: occurrence
                    .start_time
                    .map(format_time),
                event_end_time: occurrence
                    .end_time
                    .map(format_time),
                timezone: occurrence.timezone.clone(),
                event_type: non_empty(&occurrence.event_type),
                service_body: non_empty(&occurrence.service_body),
                location_name: occurrence.location.name.clone(),
                location_address: occurrence.location.address.clone(),
                location_details: occurrence.location.details.clone(),
            },
            categories: occurrence.categories.iter().map(term_to_wire).collect(),
            tags: occurrence.tags.iter().map(term_to_wire).collect(),
            recurring: occurrence.is_recurring,
            source_id: non_empty(&occurrence.source_id),
        }
    }
}

impl WireEvent {
    /// Converts a listed event into an occurrence attributed to `source_id`.
    ///
    /// Unparseable dates and times become `None`; such an occurrence is kept
    /// and sorts after every dated one. The remote's own `source_id` field
    /// is ignored.
    pub fn to_occurrence(&self, source_id: &str) -> Occurrence {
        let meta = &self.meta;
        let start_date = meta.event_start_date.as_deref().and_then(parse_date);
        let end_date = meta
            .event_end_date
            .as_deref()
            .and_then(parse_date)
            .or(start_date);

        Occurrence {
            source_event_id: self.id.to_string(),
            source_id: source_id.to_string(),
            title: self.title.as_str().to_string(),
            description: self
                .content
                .as_ref()
                .and_then(|c| non_empty(c.as_str())),
            event_type: meta.event_type.clone().unwrap_or_default(),
            service_body: meta.service_body.clone().unwrap_or_default(),
            start_date,
            end_date,
            start_time: meta.event_start_time.as_deref().and_then(parse_time),
            end_time: meta.event_end_time.as_deref().and_then(parse_time),
            timezone: meta.timezone.clone(),
            location: Location {
                name: meta.location_name.clone(),
                address: meta.location_address.clone(),
                details: meta.location_details.clone(),
            },
            categories: self.categories.iter().map(term_from_wire).collect(),
            tags: self.tags.iter().map(term_from_wire).collect(),
            link: self.link.clone(),
            is_recurring: self.recurring,
        }
    }
}
