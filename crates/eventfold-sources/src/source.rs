//! EventSource trait definition.
//!
//! A source turns a [`SourceQuery`] into occurrences. The local store and
//! each remote deployment are sources; the aggregator fans one query out to
//! all of them and merges what comes back.

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDate;
use chrono_tz::Tz;
use eventfold_core::{Occurrence, RangeFilter, RangeMode};
use eventfold_protocol::{EventFilters, ListRequest, SourceInfo};

use crate::error::{SourceError, SourceResult};

/// The part of a listing request every source receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    /// Attribute and taxonomy filters.
    pub filters: EventFilters,
    /// Upcoming, archive or an explicit range.
    pub range: RangeMode,
    /// The current date in the request's zone.
    pub today: NaiveDate,
    /// The request's zone, when it named one.
    pub timezone: Option<Tz>,
}

impl SourceQuery {
    /// Creates a query for upcoming events with no filters.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            filters: EventFilters::default(),
            range: RangeMode::Upcoming,
            today,
            timezone: None,
        }
    }

    /// Derives the source query from a validated listing request.
    pub fn from_request(request: &ListRequest, today: NaiveDate) -> Self {
        Self {
            filters: request.filters.clone(),
            range: request.range,
            today,
            timezone: request.timezone,
        }
    }

    /// Builder method to set the filters.
    pub fn with_filters(mut self, filters: EventFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Builder method to set the range mode.
    pub fn with_range(mut self, range: RangeMode) -> Self {
        self.range = range;
        self
    }

    /// Builder method to set the timezone.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }

    /// Returns the range filter bound to this query's "today".
    pub fn range_filter(&self) -> RangeFilter {
        RangeFilter::new(self.range, self.today)
    }
}

/// Occurrences from one source.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Occurrences, in the order the source produced them.
    pub occurrences: Vec<Occurrence>,
    /// Metadata describing the source.
    pub source: SourceInfo,
    /// Entries the source returned that could not be used.
    pub skipped: usize,
}

impl FetchResult {
    /// Creates a fetch result.
    pub fn new(source: SourceInfo, occurrences: Vec<Occurrence>) -> Self {
        Self {
            occurrences,
            source,
            skipped: 0,
        }
    }

    /// Builder method to set the skipped count.
    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }
}

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A producer of occurrences.
///
/// Implementations must not fail for a single bad event: such events are
/// skipped and the rest returned. An `Err` means the whole source failed.
pub trait EventSource: Send + Sync {
    /// Returns the source id (`local` or a configured remote id).
    fn id(&self) -> &str;

    /// Returns metadata describing this source.
    fn info(&self) -> SourceInfo;

    /// Fetches occurrences matching the query.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source as a whole cannot be read.
    fn fetch(&self, query: SourceQuery) -> BoxFuture<'_, SourceResult<FetchResult>>;
}

/// A source that always fails.
///
/// Stands in for a source whose configuration could not be built, so the
/// failure still shows up in listing status.
#[derive(Debug)]
pub struct ErrorSource {
    info: SourceInfo,
    error: SourceError,
}

impl ErrorSource {
    /// Creates a failing source.
    pub fn new(info: SourceInfo, error: SourceError) -> Self {
        Self { info, error }
    }
}

impl EventSource for ErrorSource {
    fn id(&self) -> &str {
        &self.info.id
    }

    fn info(&self) -> SourceInfo {
        self.info.clone()
    }

    fn fetch(&self, _query: SourceQuery) -> BoxFuture<'_, SourceResult<FetchResult>> {
        let error = SourceError::new(self.error.code(), self.error.message())
            .with_source_id(&self.info.id);
        Box::pin(async move { Err(error) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceErrorCode;
    use eventfold_core::SortOrder;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn query_from_request() {
        let request = ListRequest {
            range: RangeMode::Archive,
            timezone: Some(chrono_tz::Europe::Paris),
            order: SortOrder::Desc,
            ..ListRequest::default()
        };
        let query = SourceQuery::from_request(&request, today());

        assert_eq!(query.range, RangeMode::Archive);
        assert_eq!(query.timezone, Some(chrono_tz::Europe::Paris));
        assert_eq!(query.range_filter().today(), today());
    }

    #[test]
    fn query_builder() {
        let query = SourceQuery::new(today())
            .with_range(RangeMode::Archive)
            .with_timezone(chrono_tz::UTC);
        assert!(query.range.is_archive());
        assert_eq!(query.timezone, Some(chrono_tz::UTC));
        assert_eq!(query.filters, EventFilters::default());
    }

    #[test]
    fn fetch_result_builder() {
        let result = FetchResult::new(SourceInfo::new("local", "Local", ""), Vec::new())
            .with_skipped(2);
        assert!(result.occurrences.is_empty());
        assert_eq!(result.skipped, 2);
    }

    #[tokio::test]
    async fn error_source_always_fails() {
        let source = ErrorSource::new(
            SourceInfo::new("broken", "Broken", "not a url"),
            SourceError::configuration("invalid url"),
        );
        assert_eq!(source.id(), "broken");

        let err = source.fetch(SourceQuery::new(today())).await.unwrap_err();
        assert_eq!(err.code(), SourceErrorCode::ConfigurationError);
        assert_eq!(err.source_id(), Some("broken"));
    }
}
