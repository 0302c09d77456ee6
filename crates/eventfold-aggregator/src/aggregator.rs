//! Multi-source listing.
//!
//! One listing fans out to the local source and every selected remote
//! concurrently, waits for them up to the request deadline, then merges,
//! sorts and paginates what came back. A failing or slow source contributes
//! nothing and is reported in [`ListOutcome::statuses`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use eventfold_core::{
    Occurrence, OccurrenceGenerator, paginate, retain_by_tags, sort_occurrences, today_in,
};
use eventfold_protocol::{
    ListParams, ListRequest, ListResponse, Pagination, SourceInfo, SourceStatus, WireEvent,
};
use eventfold_sources::local::{EventStore, LOCAL_SOURCE_ID, LocalEventSource};
use eventfold_sources::remote::{RemoteSource, RemoteSourceConfig};
use eventfold_sources::{
    ErrorSource, EventSource, FetchResult, SourceError, SourceQuery, SourceResult,
};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::AggregatorConfig;
use crate::error::{AggregateError, AggregateResult};

/// A configured remote and whether it is in the default set.
struct RemoteEntry {
    source: Arc<dyn EventSource>,
    enabled: bool,
}

/// Result of one listing.
#[derive(Debug, Clone)]
pub struct ListOutcome {
    /// The paginated response.
    pub response: ListResponse,
    /// One entry per queried source, local first.
    pub statuses: Vec<SourceStatus>,
}

/// Merges occurrences from the local store and remote deployments.
pub struct Aggregator {
    config: AggregatorConfig,
    local: Option<Arc<dyn EventSource>>,
    remotes: Vec<RemoteEntry>,
}

impl Aggregator {
    /// Creates an aggregator with no sources.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero request deadline.
    pub fn new(config: AggregatorConfig) -> AggregateResult<Self> {
        if config.request_deadline.is_zero() {
            return Err(AggregateError::config("request deadline must be positive"));
        }
        Ok(Self {
            config,
            local: None,
            remotes: Vec::new(),
        })
    }

    /// Creates an aggregator over a local store and remote configurations.
    ///
    /// The local source is added when enabled in the configuration. A remote
    /// whose client cannot be built is kept as a failing source so the
    /// problem shows up in every listing's status.
    pub fn from_parts(
        config: AggregatorConfig,
        store: Arc<dyn EventStore>,
        remotes: Vec<RemoteSourceConfig>,
    ) -> AggregateResult<Self> {
        let mut aggregator = Self::new(config)?;

        if aggregator.config.local.enabled {
            let local = LocalEventSource::new(
                store,
                OccurrenceGenerator::new(aggregator.config.limits.clone()),
            )
            .with_info(
                aggregator.config.local.name.clone(),
                aggregator.config.local.url.clone(),
            );
            aggregator.local = Some(Arc::new(local));
        }

        for remote in remotes {
            let enabled = remote.enabled;
            let remote = remote.with_per_page(aggregator.config.remote_per_page);
            let info = remote.source_info();
            let source: Arc<dyn EventSource> = match RemoteSource::new(remote) {
                Ok(source) => Arc::new(source),
                Err(e) => {
                    warn!(source = %info.id, error = %e, "Failed to create remote source");
                    Arc::new(ErrorSource::new(info, e))
                }
            };
            aggregator.add_remote(source, enabled)?;
        }

        Ok(aggregator)
    }

    /// Sets the local source.
    pub fn with_local(mut self, source: Arc<dyn EventSource>) -> Self {
        self.local = Some(source);
        self
    }

    /// Adds a remote source. Disabled remotes are only queried by id.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::DuplicateSource`] if the id is already
    /// taken or is the local id.
    pub fn add_remote(
        &mut self,
        source: Arc<dyn EventSource>,
        enabled: bool,
    ) -> AggregateResult<()> {
        let id = source.id();
        if id == LOCAL_SOURCE_ID || self.remotes.iter().any(|r| r.source.id() == id) {
            return Err(AggregateError::duplicate_source(id));
        }
        self.remotes.push(RemoteEntry { source, enabled });
        Ok(())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Returns metadata for every configured source, local first.
    pub fn sources(&self) -> Vec<SourceInfo> {
        self.local
            .iter()
            .chain(self.remotes.iter().map(|r| &r.source))
            .map(|s| s.info())
            .collect()
    }

    /// Validates raw parameters and lists.
    pub async fn list_params(&self, params: &ListParams) -> AggregateResult<ListOutcome> {
        let request = params.validate()?;
        Ok(self.list(&request).await)
    }

    /// Lists occurrences for a validated request, as of now.
    pub async fn list(&self, request: &ListRequest) -> ListOutcome {
        self.list_at(request, Utc::now()).await
    }

    /// Lists occurrences for a validated request, as of `now`.
    ///
    /// "Today" is `now` in the request's timezone, or in the configured
    /// default timezone.
    pub async fn list_at(&self, request: &ListRequest, now: DateTime<Utc>) -> ListOutcome {
        let tz = request.timezone.unwrap_or(self.config.default_timezone);
        let query = SourceQuery::from_request(request, today_in(&tz, now));

        let remotes: Vec<Arc<dyn EventSource>> = self
            .remotes
            .iter()
            .filter(|r| match &request.source_ids {
                Some(_) => request.wants_source(r.source.id()),
                None => r.enabled,
            })
            .map(|r| Arc::clone(&r.source))
            .collect();
        let local = self
            .local
            .as_ref()
            .filter(|s| request.wants_source(s.id()));

        debug!(
            local = local.is_some(),
            remotes = remotes.len(),
            today = %query.today,
            "Starting listing"
        );

        let deadline = Instant::now() + self.config.request_deadline;
        let mut tasks = JoinSet::new();
        for (index, source) in remotes.iter().enumerate() {
            let source = Arc::clone(source);
            let query = query.clone();
            tasks.spawn(async move {
                let started = Instant::now();
                let result = source.fetch(query).await;
                (index, result, elapsed_ms(started))
            });
        }

        let mut merged: Vec<Occurrence> = Vec::new();
        let mut sources = Vec::new();
        let mut statuses = Vec::new();

        if let Some(local) = local {
            let started = Instant::now();
            let result = local.fetch(query.clone()).await;
            let elapsed = elapsed_ms(started);
            record(local.id(), result, elapsed, &mut merged, &mut sources, &mut statuses, |_| {});
        }

        let mut slots: Vec<Option<(SourceResult<FetchResult>, u64)>> =
            remotes.iter().map(|_| None).collect();
        let mut timed_out = false;
        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((index, result, elapsed)))) => slots[index] = Some((result, elapsed)),
                Ok(Some(Err(e))) => warn!(error = %e, "Remote fetch task failed"),
                Ok(None) => break,
                Err(_) => {
                    tasks.abort_all();
                    timed_out = true;
                    break;
                }
            }
        }

        let deadline_ms = self.config.request_deadline.as_millis() as u64;
        let tags = &request.filters.taxonomy.tags;
        for (source, slot) in remotes.iter().zip(slots) {
            let (result, elapsed) = match slot {
                Some(outcome) => outcome,
                None if timed_out => (
                    Err(SourceError::timeout("Request deadline elapsed")
                        .with_source_id(source.id())),
                    deadline_ms,
                ),
                None => (
                    Err(SourceError::internal("Fetch task did not complete")
                        .with_source_id(source.id())),
                    0,
                ),
            };
            record(source.id(), result, elapsed, &mut merged, &mut sources, &mut statuses, |o| {
                retain_by_tags(o, tags)
            });
        }

        sort_occurrences(&mut merged, request.order);
        let per_page = request.per_page.unwrap_or(self.config.default_per_page);
        let page = paginate(merged, request.page, per_page);

        info!(
            total = page.total,
            page = page.current_page,
            total_pages = page.total_pages,
            failed = statuses.iter().filter(|s| !s.healthy).count(),
            "Listing complete"
        );

        ListOutcome {
            response: ListResponse {
                events: page.items.iter().map(WireEvent::from).collect(),
                sources,
                pagination: Pagination {
                    total: page.total,
                    per_page: page.per_page,
                    current_page: page.current_page,
                    total_pages: page.total_pages,
                },
            },
            statuses,
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Folds one source's result into the listing.
fn record(
    id: &str,
    result: SourceResult<FetchResult>,
    elapsed: u64,
    merged: &mut Vec<Occurrence>,
    sources: &mut Vec<SourceInfo>,
    statuses: &mut Vec<SourceStatus>,
    refilter: impl FnOnce(&mut Vec<Occurrence>),
) {
    match result {
        Ok(mut fetched) => {
            refilter(&mut fetched.occurrences);
            debug!(
                source = %id,
                count = fetched.occurrences.len(),
                skipped = fetched.skipped,
                elapsed_ms = elapsed,
                "Source fetched"
            );
            statuses.push(SourceStatus::healthy(id, fetched.occurrences.len(), elapsed));
            sources.push(fetched.source);
            merged.append(&mut fetched.occurrences);
        }
        Err(e) => {
            warn!(source = %id, code = %e.code(), error = %e.message(), "Source failed");
            statuses.push(SourceStatus::failed(id, e.code().as_str(), e.message(), elapsed));
        }
    }
}
