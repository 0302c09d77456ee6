//! Listing request parameters.
//!
//! [`ListParams`] holds the raw query parameters exactly as received.
//! [`ListParams::validate`] turns them into a typed [`ListRequest`] or a
//! [`ValidationError`]; nothing is fetched for a request that fails here.

use chrono::NaiveDate;
use chrono_tz::Tz;
use eventfold_core::{
    DEFAULT_STATUS, RangeMode, Relation, SortOrder, TaxonomyFilter, TermFilter, parse_timezone,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A listing request that cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A date parameter is not `YYYY-MM-DD`.
    #[error("invalid {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    /// Only one bound of an explicit range was given.
    #[error("{given} requires {missing}")]
    HalfRange {
        given: &'static str,
        missing: &'static str,
    },

    /// `start_date` is after `end_date`.
    #[error("start_date {start} is after end_date {end}")]
    ReversedRange { start: NaiveDate, end: NaiveDate },

    /// `order` is neither `ASC` nor `DESC`.
    #[error("invalid order: {0:?} (expected ASC or DESC)")]
    InvalidOrder(String),

    /// A numeric parameter is not an integer.
    #[error("invalid {field}: {value:?} (expected an integer)")]
    InvalidNumber { field: &'static str, value: String },

    /// The timezone is not a known IANA name.
    #[error("unknown timezone: {0:?}")]
    InvalidTimezone(String),
}

/// Raw listing parameters, as they appear in a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub event_type: Option<String>,
    pub service_body: Option<String>,
    pub relation: Option<String>,
    pub categories: Option<String>,
    pub category_relation: Option<String>,
    pub tags: Option<String>,
    pub tag_relation: Option<String>,
    pub status: Option<String>,
    pub archive: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub order: Option<String>,
    pub source_ids: Option<String>,
    pub timezone: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl ListParams {
    /// Parses a query string (`a=1&b=2`, leading `?` optional).
    ///
    /// Unknown keys are ignored; a repeated key keeps its last value.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if let Some(slot) = params.slot(&key) {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        Some(match key {
            "event_type" => &mut self.event_type,
            "service_body" => &mut self.service_body,
            "relation" => &mut self.relation,
            "categories" => &mut self.categories,
            "category_relation" => &mut self.category_relation,
            "tags" => &mut self.tags,
            "tag_relation" => &mut self.tag_relation,
            "status" => &mut self.status,
            "archive" => &mut self.archive,
            "start_date" => &mut self.start_date,
            "end_date" => &mut self.end_date,
            "order" => &mut self.order,
            "source_ids" => &mut self.source_ids,
            "timezone" => &mut self.timezone,
            "page" => &mut self.page,
            "per_page" => &mut self.per_page,
            _ => return None,
        })
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// See [`ValidationError`].
    pub fn validate(&self) -> Result<ListRequest, ValidationError> {
        let start = parse_date_param("start_date", self.start_date.as_deref())?;
        let end = parse_date_param("end_date", self.end_date.as_deref())?;
        match (start, end) {
            (Some(_), None) => {
                return Err(ValidationError::HalfRange {
                    given: "start_date",
                    missing: "end_date",
                });
            }
            (None, Some(_)) => {
                return Err(ValidationError::HalfRange {
                    given: "end_date",
                    missing: "start_date",
                });
            }
            (Some(start), Some(end)) if start > end => {
                return Err(ValidationError::ReversedRange { start, end });
            }
            _ => {}
        }
        let archive = non_empty(self.archive.as_deref()).is_some_and(is_truthy);
        let range = RangeMode::resolve(start, end, archive);

        let order = match non_empty(self.order.as_deref()) {
            None => SortOrder::Asc,
            Some(raw) => {
                SortOrder::parse(raw).ok_or_else(|| ValidationError::InvalidOrder(raw.to_string()))?
            }
        };

        let timezone = match non_empty(self.timezone.as_deref()) {
            None => None,
            Some(raw) => Some(parse_timezone_param(raw)?),
        };

        let page = parse_count("page", self.page.as_deref())?.unwrap_or(1);
        let per_page = parse_count("per_page", self.per_page.as_deref())?;

        let source_ids = non_empty(self.source_ids.as_deref()).map(split_list);

        let taxonomy = TaxonomyFilter {
            categories: TermFilter::parse(self.categories.as_deref().unwrap_or_default()),
            category_relation: Relation::parse_or(self.category_relation.as_deref(), Relation::Or),
            tags: TermFilter::parse(self.tags.as_deref().unwrap_or_default()),
            tag_relation: Relation::parse_or(self.tag_relation.as_deref(), Relation::Or),
        };

        let filters = EventFilters {
            event_type: non_empty(self.event_type.as_deref()).map(str::to_string),
            service_bodies: self
                .service_body
                .as_deref()
                .map(split_list)
                .unwrap_or_default(),
            relation: Relation::parse_or(self.relation.as_deref(), Relation::And),
            taxonomy,
            status: non_empty(self.status.as_deref())
                .unwrap_or(DEFAULT_STATUS)
                .to_string(),
        };

        Ok(ListRequest {
            filters,
            range,
            timezone,
            source_ids,
            order,
            page,
            per_page,
        })
    }
}

/// Attribute filters applied to events before any date logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilters {
    /// Exact event type, if any.
    pub event_type: Option<String>,
    /// Accepted service bodies; empty accepts all.
    pub service_bodies: Vec<String>,
    /// How the event type and service body conditions combine.
    pub relation: Relation,
    /// Category and tag filter.
    pub taxonomy: TaxonomyFilter,
    /// Required publication status.
    pub status: String,
}

impl Default for EventFilters {
    fn default() -> Self {
        Self {
            event_type: None,
            service_bodies: Vec::new(),
            relation: Relation::And,
            taxonomy: TaxonomyFilter::default(),
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

impl EventFilters {
    /// Matches event type and service body under [`EventFilters::relation`].
    ///
    /// With no conditions set, everything matches.
    pub fn matches_attributes(&self, event_type: &str, service_body: &str) -> bool {
        let mut conditions = Vec::with_capacity(2);
        if let Some(wanted) = &self.event_type {
            conditions.push(event_type == wanted);
        }
        if !self.service_bodies.is_empty() {
            conditions.push(self.service_bodies.iter().any(|s| s == service_body));
        }

        if conditions.is_empty() {
            return true;
        }
        match self.relation {
            Relation::And => conditions.iter().all(|c| *c),
            Relation::Or => conditions.iter().any(|c| *c),
        }
    }

    /// The service body set in request form.
    pub fn service_body_param(&self) -> Option<String> {
        (!self.service_bodies.is_empty()).then(|| self.service_bodies.join(","))
    }
}

/// A validated listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub filters: EventFilters,
    pub range: RangeMode,
    /// Zone that decides "today"; `None` uses the deployment default.
    pub timezone: Option<Tz>,
    /// Requested sources; `None` means the default set.
    pub source_ids: Option<Vec<String>>,
    pub order: SortOrder,
    /// Requested page, at least 1.
    pub page: usize,
    /// Requested page size, at least 1; `None` uses the deployment default.
    pub per_page: Option<usize>,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            filters: EventFilters::default(),
            range: RangeMode::Upcoming,
            timezone: None,
            source_ids: None,
            order: SortOrder::Asc,
            page: 1,
            per_page: None,
        }
    }
}

impl ListRequest {
    /// Returns true if the request selects the given source.
    ///
    /// Without an explicit list every source is selected.
    pub fn wants_source(&self, id: &str) -> bool {
        self.source_ids
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|s| s == id))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_date_param(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, ValidationError> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: raw.to_string(),
        })
}

/// Parses a page number or size; values below 1 become 1.
fn parse_count(field: &'static str, value: Option<&str>) -> Result<Option<usize>, ValidationError> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };
    let n = raw
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: raw.to_string(),
        })?;
    Ok(Some(usize::try_from(n.max(1)).unwrap_or(usize::MAX)))
}

/// Timezones may arrive percent-encoded a second time (`America%2FNew_York`).
fn parse_timezone_param(raw: &str) -> Result<Tz, ValidationError> {
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    parse_timezone(&decoded).ok_or(ValidationError::InvalidTimezone(decoded))
}
