//! Remote deployment as an [`EventSource`].

use eventfold_core::RangeMode;
use eventfold_protocol::{RemotePayload, SourceInfo};
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::source::{BoxFuture, EventSource, FetchResult, SourceQuery};

use super::client::RemoteClient;
use super::config::RemoteSourceConfig;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fetches occurrences from another deployment's listing endpoint.
pub struct RemoteSource {
    client: RemoteClient,
    info: SourceInfo,
}

impl RemoteSource {
    /// Creates a remote source.
    pub fn new(config: RemoteSourceConfig) -> SourceResult<Self> {
        let info = config.source_info();
        let client = RemoteClient::new(config).map_err(|e| e.with_source_id(&info.id))?;
        Ok(Self { client, info })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RemoteSourceConfig {
        self.client.config()
    }

    async fn fetch_inner(&self, query: SourceQuery) -> SourceResult<FetchResult> {
        let params = remote_params(self.config(), &query);
        let body = self.client.get_events(&params).await?;

        let payload = RemotePayload::from_slice(&body).map_err(|e| {
            SourceError::invalid_response(format!("Invalid listing body: {}", e))
        })?;

        if payload.skipped > 0 {
            warn!(skipped = payload.skipped, "Skipped malformed remote events");
        }

        let occurrences = payload
            .events
            .iter()
            .map(|e| e.to_occurrence(&self.info.id))
            .collect::<Vec<_>>();

        debug!(count = occurrences.len(), "Fetched remote occurrences");

        Ok(FetchResult::new(self.info.clone(), occurrences).with_skipped(payload.skipped))
    }
}

impl EventSource for RemoteSource {
    fn id(&self) -> &str {
        &self.info.id
    }

    fn info(&self) -> SourceInfo {
        self.info.clone()
    }

    fn fetch(&self, query: SourceQuery) -> BoxFuture<'_, SourceResult<FetchResult>> {
        Box::pin(async move {
            self.fetch_inner(query)
                .await
                .map_err(|e| e.with_source_id(&self.info.id))
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Builds the query parameters sent to a remote deployment.
///
/// Values pinned in the source configuration win over the request's event
/// type, service bodies and categories. Request tags win over configured
/// tags. Range, timezone and relations always come from the request.
pub fn remote_params(config: &RemoteSourceConfig, query: &SourceQuery) -> Vec<(&'static str, String)> {
    let filters = &query.filters;
    let taxonomy = &filters.taxonomy;
    let mut params = Vec::new();

    let event_type = non_blank(config.event_type.as_deref())
        .or_else(|| non_blank(filters.event_type.as_deref()));
    if let Some(event_type) = event_type {
        params.push(("event_type", event_type));
    }

    let service_body = non_blank(config.service_body.as_deref())
        .or_else(|| filters.service_body_param());
    if let Some(service_body) = service_body {
        params.push(("service_body", service_body));
    }

    let categories = non_blank(config.categories.as_deref())
        .or_else(|| (!taxonomy.categories.is_empty()).then(|| taxonomy.categories.to_string()));
    if let Some(categories) = categories {
        params.push(("categories", categories));
        params.push(("category_relation", relation_param(taxonomy.category_relation)));
    }

    let tags = (!taxonomy.tags.is_empty())
        .then(|| taxonomy.tags.to_string())
        .or_else(|| non_blank(config.tags.as_deref()));
    if let Some(tags) = tags {
        params.push(("tags", tags));
    }

    params.push(("relation", relation_param(filters.relation)));
    params.push(("status", filters.status.clone()));

    match query.range {
        RangeMode::Upcoming => {}
        RangeMode::Archive => params.push(("archive", "true".to_string())),
        RangeMode::Explicit { start, end } => {
            params.push(("start_date", start.format(DATE_FORMAT).to_string()));
            params.push(("end_date", end.format(DATE_FORMAT).to_string()));
        }
    }

    if let Some(tz) = query.timezone {
        params.push(("timezone", tz.name().to_string()));
    }

    params.push(("per_page", config.per_page.to_string()));
    params
}

fn relation_param(relation: eventfold_core::Relation) -> String {
    match relation {
        eventfold_core::Relation::And => "AND".to_string(),
        eventfold_core::Relation::Or => "OR".to_string(),
    }
}
