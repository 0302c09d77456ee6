//! Remote source configuration.

use std::time::Duration;
use url::Url;

use eventfold_protocol::{EVENTS_PATH, SourceInfo};

/// Configuration for one remote deployment.
#[derive(Debug, Clone)]
pub struct RemoteSourceConfig {
    /// Stable id used in `source_ids` and listing status.
    pub id: String,

    /// Base URL of the deployment.
    pub url: Url,

    /// Display name. Falls back to the URL host.
    pub name: Option<String>,

    /// Disabled sources are only queried when requested by id.
    pub enabled: bool,

    /// Event type sent instead of the request's.
    pub event_type: Option<String>,

    /// Service bodies sent instead of the request's (comma separated).
    pub service_body: Option<String>,

    /// Categories sent instead of the request's.
    pub categories: Option<String>,

    /// Tags sent when the request has none.
    pub tags: Option<String>,

    /// Listing path relative to `url`.
    pub events_path: String,

    /// Page size requested from the deployment.
    pub per_page: usize,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl RemoteSourceConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

    /// Default page size requested from remotes.
    pub const DEFAULT_PER_PAGE: usize = 100;

    /// Creates a configuration for the deployment at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(id: impl Into<String>, url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(url.as_ref().trim())?;
        Ok(Self {
            id: id.into(),
            url: parsed,
            name: None,
            enabled: true,
            event_type: None,
            service_body: None,
            categories: None,
            tags: None,
            events_path: EVENTS_PATH.to_string(),
            per_page: Self::DEFAULT_PER_PAGE,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("eventfold/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets whether the source is part of the default set.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Pins the event type sent to this source.
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Pins the service bodies sent to this source.
    pub fn with_service_body(mut self, service_body: impl Into<String>) -> Self {
        self.service_body = Some(service_body.into());
        self
    }

    /// Pins the categories sent to this source.
    pub fn with_categories(mut self, categories: impl Into<String>) -> Self {
        self.categories = Some(categories.into());
        self
    }

    /// Sets the default tags sent to this source.
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Sets the listing path.
    pub fn with_events_path(mut self, path: impl Into<String>) -> Self {
        self.events_path = path.into();
        self
    }

    /// Sets the page size requested from the deployment.
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the listing endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `events_path` cannot be joined onto the base URL.
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        let mut base = self.url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(self.events_path.trim_start_matches('/'))
    }

    /// Returns the configured name, or the URL host.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => self.url.host_str().unwrap_or(self.url.as_str()).to_string(),
        }
    }

    /// Metadata reported in listings. The URL is the deployment's host.
    pub fn source_info(&self) -> SourceInfo {
        SourceInfo::new(
            &self.id,
            self.display_name(),
            self.url.host_str().unwrap_or_default(),
        )
    }
}
