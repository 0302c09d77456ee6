//! `list` command.

use eventfold_aggregator::{Aggregator, ListOutcome};
use eventfold_protocol::SourceStatus;
use tracing::debug;

use crate::cli::ListArgs;
use crate::config::EventfoldConfig;
use crate::error::ClientResult;

/// Builds the aggregator described by `config`.
pub fn build_aggregator(config: &EventfoldConfig) -> ClientResult<Aggregator> {
    let store = config.store()?;
    let aggregator =
        Aggregator::from_parts(config.aggregator_config()?, store, config.remote_configs()?)?;
    debug!(sources = aggregator.sources().len(), "Aggregator ready");
    Ok(aggregator)
}

/// Runs one listing.
pub async fn fetch(config: &EventfoldConfig, args: &ListArgs) -> ClientResult<ListOutcome> {
    let aggregator = build_aggregator(config)?;
    Ok(aggregator.list_params(&args.to_params()).await?)
}

/// Runs one listing and prints the response as JSON.
pub async fn run(config: &EventfoldConfig, args: &ListArgs) -> ClientResult<()> {
    let outcome = fetch(config, args).await?;
    println!("{}", outcome.response.to_json_pretty()?);

    if args.show_status {
        for status in &outcome.statuses {
            eprintln!("{}", format_status(status));
        }
    }
    Ok(())
}

fn format_status(status: &SourceStatus) -> String {
    if status.healthy {
        format!(
            "{}: ok, {} events in {}ms",
            status.id, status.event_count, status.elapsed_ms
        )
    } else {
        format!(
            "{}: {} ({}) after {}ms",
            status.id,
            status.code.as_deref().unwrap_or("error"),
            status.error.as_deref().unwrap_or_default(),
            status.elapsed_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    const EVENTS: &str = r#"{"events": [
        {"id": "1", "title": "Convention", "start_date": "2025-06-13", "end_date": "2025-06-15",
         "tags": [{"name": "Regional", "slug": "regional"}]},
        {"id": "2", "title": "Draft", "start_date": "2025-06-20", "status": "draft"},
        {"id": "3", "title": "Workshop", "start_date": "2025-06-02",
         "recurrence": {"type": "weekly", "interval": 1, "weekdays": [1], "endDate": "2025-06-30"}}
    ]}"#;

    fn config_with_events(dir: &tempfile::TempDir) -> EventfoldConfig {
        let path = dir.path().join("events.json");
        std::fs::write(&path, EVENTS).unwrap();
        let mut config = EventfoldConfig::default();
        config.local.events_file = Some(path);
        config
    }

    fn june() -> ListArgs {
        ListArgs {
            start_date: Some("2025-06-01".to_string()),
            end_date: Some("2025-06-30".to_string()),
            per_page: Some("50".to_string()),
            ..ListArgs::default()
        }
    }

    #[tokio::test]
    async fn lists_local_events_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = fetch(&config_with_events(&dir), &june()).await.unwrap();

        let titles: Vec<_> = outcome
            .response
            .events
            .iter()
            .map(|e| e.title.as_str().to_string())
            .collect();
        assert!(titles.contains(&"Convention".to_string()));
        assert!(titles.contains(&"Workshop".to_string()));
        assert!(!titles.contains(&"Draft".to_string()));
        assert_eq!(outcome.response.pagination.total, titles.len());
        assert_eq!(outcome.statuses.len(), 1);
        assert!(outcome.statuses[0].healthy);
    }

    #[tokio::test]
    async fn tag_filter_applies_locally() {
        let dir = tempfile::tempdir().unwrap();
        let args = ListArgs {
            tags: Some("regional".to_string()),
            ..june()
        };
        let outcome = fetch(&config_with_events(&dir), &args).await.unwrap();
        assert_eq!(outcome.response.events.len(), 1);
        assert_eq!(outcome.response.events[0].title.as_str(), "Convention");
    }

    #[tokio::test]
    async fn invalid_request_is_reported() {
        let args = ListArgs {
            order: Some("SIDEWAYS".to_string()),
            ..ListArgs::default()
        };
        let err = fetch(&EventfoldConfig::default(), &args).await.unwrap_err();
        assert!(matches!(err, ClientError::Request(_)));
    }

    #[test]
    fn status_lines() {
        let ok = SourceStatus::healthy("local", 3, 12);
        assert_eq!(format_status(&ok), "local: ok, 3 events in 12ms");

        let failed = SourceStatus::failed("north", "timeout", "deadline exceeded", 2000);
        assert_eq!(
            format_status(&failed),
            "north: timeout (deadline exceeded) after 2000ms"
        );
    }
}
