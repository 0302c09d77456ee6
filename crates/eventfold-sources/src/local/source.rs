//! The local event source.

use std::sync::Arc;

use eventfold_core::{Occurrence, OccurrenceGenerator};
use eventfold_protocol::SourceInfo;
use tracing::{debug, warn};

use crate::error::SourceResult;
use crate::source::{BoxFuture, EventSource, FetchResult, SourceQuery};

use super::store::EventStore;

/// Id of the local source.
pub const LOCAL_SOURCE_ID: &str = "local";

/// Serves events from an [`EventStore`], expanding recurring ones.
pub struct LocalEventSource {
    store: Arc<dyn EventStore>,
    generator: OccurrenceGenerator,
    info: SourceInfo,
}

impl LocalEventSource {
    /// Creates a local source over `store`.
    pub fn new(store: Arc<dyn EventStore>, generator: OccurrenceGenerator) -> Self {
        Self {
            store,
            generator,
            info: SourceInfo::new(LOCAL_SOURCE_ID, "Local Events", ""),
        }
    }

    /// Builder method to set the display name and URL reported in listings.
    pub fn with_info(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.info = SourceInfo::new(LOCAL_SOURCE_ID, name, url);
        self
    }

    /// Collects the occurrences matching `query`.
    ///
    /// Non-recurring events contribute their single occurrence; recurring
    /// events are expanded and their occurrences range-filtered. A recurring
    /// event that cannot be expanded is logged and skipped.
    pub fn collect(&self, query: &SourceQuery) -> SourceResult<FetchResult> {
        let range = query.range_filter();
        let filters = &query.filters;

        let mut occurrences: Vec<Occurrence> = self
            .store
            .non_recurring(filters, &range)?
            .iter()
            .map(Occurrence::single)
            .filter(|o| range.includes(o))
            .collect();
        let single_count = occurrences.len();

        let mut skipped = 0;
        for event in self.store.recurring(filters)? {
            match self.generator.expand(&event) {
                Ok(mut expanded) => {
                    range.retain(&mut expanded);
                    occurrences.extend(expanded);
                }
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "Skipping recurring event");
                    skipped += 1;
                }
            }
        }

        for occurrence in &mut occurrences {
            occurrence.source_id = LOCAL_SOURCE_ID.to_string();
        }

        debug!(
            single = single_count,
            expanded = occurrences.len() - single_count,
            skipped,
            "Collected local occurrences"
        );

        Ok(FetchResult::new(self.info.clone(), occurrences).with_skipped(skipped))
    }
}

impl EventSource for LocalEventSource {
    fn id(&self) -> &str {
        LOCAL_SOURCE_ID
    }

    fn info(&self) -> SourceInfo {
        self.info.clone()
    }

    fn fetch(&self, query: SourceQuery) -> BoxFuture<'_, SourceResult<FetchResult>> {
        Box::pin(async move { self.collect(&query) })
    }
}
