//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/eventfold/config.toml` by default:
//!
//! ```toml
//! [local]
//! name = "Region Events"
//! events_file = "/var/lib/eventfold/events.json"
//!
//! [aggregator]
//! request_deadline_secs = 20
//! default_timezone = "America/New_York"
//!
//! [[sources]]
//! id = "north"
//! url = "https://north.example.org"
//! service_body = "4,5"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use eventfold_aggregator::{AggregatorConfig, LocalSourceSettings};
use eventfold_core::{GenerationLimits, TracingConfig, TracingOutputFormat, parse_timezone};
use eventfold_sources::local::{LOCAL_SOURCE_ID, MemoryStore};
use eventfold_sources::remote::RemoteSourceConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the eventfold client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventfoldConfig {
    /// Debug mode.
    pub debug: bool,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// Local store settings.
    pub local: LocalSettings,

    /// Listing settings.
    pub aggregator: AggregatorSettings,

    /// Recurrence expansion caps.
    pub limits: GenerationLimits,

    /// Remote deployments.
    pub sources: Vec<SourceSettings>,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `compact`, `pretty` or `json`.
    pub format: Option<String>,

    /// Explicit filter directive, e.g. `eventfold=info`.
    pub filter: Option<String>,
}

/// Local store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    /// Whether the local store takes part in listings.
    pub enabled: bool,

    /// Display name.
    pub name: String,

    /// Public URL of this deployment.
    pub url: String,

    /// JSON file holding the stored events.
    pub events_file: Option<PathBuf>,
}

impl Default for LocalSettings {
    fn default() -> Self {
        let defaults = LocalSourceSettings::default();
        Self {
            enabled: defaults.enabled,
            name: defaults.name,
            url: defaults.url,
            events_file: None,
        }
    }
}

/// Listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorSettings {
    /// Overall deadline of one listing, in seconds.
    pub request_deadline_secs: u64,

    /// IANA zone deciding "today" when a request names none.
    pub default_timezone: String,

    /// Page size when a request gives none.
    pub default_per_page: usize,

    /// Page size requested from remotes.
    pub remote_per_page: usize,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            request_deadline_secs: AggregatorConfig::DEFAULT_DEADLINE_SECS,
            default_timezone: "UTC".to_string(),
            default_per_page: AggregatorConfig::DEFAULT_PER_PAGE,
            remote_per_page: AggregatorConfig::DEFAULT_REMOTE_PER_PAGE,
        }
    }
}

/// One remote deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Stable id.
    pub id: String,

    /// Base URL.
    pub url: String,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Part of the default source set.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Event type always sent to this source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// Service bodies always sent to this source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_body: Option<String>,

    /// Categories always sent to this source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,

    /// Tags sent when the request has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

impl SourceSettings {
    /// Converts to a remote source configuration.
    pub fn to_remote_config(&self) -> ClientResult<RemoteSourceConfig> {
        let mut config = RemoteSourceConfig::new(&self.id, &self.url).map_err(|e| {
            ClientError::Config(format!("source {:?}: invalid url {:?}: {}", self.id, self.url, e))
        })?;
        config = config.with_enabled(self.enabled);
        if let Some(ref name) = self.name {
            config = config.with_name(name);
        }
        if let Some(ref event_type) = self.event_type {
            config = config.with_event_type(event_type);
        }
        if let Some(ref service_body) = self.service_body {
            config = config.with_service_body(service_body);
        }
        if let Some(ref categories) = self.categories {
            config = config.with_categories(categories);
        }
        if let Some(ref tags) = self.tags {
            config = config.with_tags(tags);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

impl EventfoldConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("failed to read config: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventfold")
            .join("config.toml")
    }

    /// Checks everything a listing would need.
    pub fn validate(&self) -> ClientResult<()> {
        self.aggregator_config()?;
        self.remote_configs()?;

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(ClientError::Config("source id must not be empty".to_string()));
            }
            if source.id == LOCAL_SOURCE_ID || !seen.insert(source.id.as_str()) {
                return Err(ClientError::Config(format!(
                    "duplicate source id: {:?}",
                    source.id
                )));
            }
        }

        if let Some(ref path) = self.local.events_file {
            if !path.exists() {
                return Err(ClientError::Config(format!(
                    "events file not found: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Builds the aggregator configuration.
    pub fn aggregator_config(&self) -> ClientResult<AggregatorConfig> {
        let settings = &self.aggregator;
        let tz = parse_timezone(&settings.default_timezone).ok_or_else(|| {
            ClientError::Config(format!(
                "unknown default_timezone: {:?}",
                settings.default_timezone
            ))
        })?;
        if settings.request_deadline_secs == 0 {
            return Err(ClientError::Config(
                "request_deadline_secs must be positive".to_string(),
            ));
        }

        Ok(AggregatorConfig::default()
            .with_request_deadline(Duration::from_secs(settings.request_deadline_secs))
            .with_default_timezone(tz)
            .with_default_per_page(settings.default_per_page)
            .with_remote_per_page(settings.remote_per_page)
            .with_limits(self.limits.clone())
            .with_local(LocalSourceSettings {
                enabled: self.local.enabled,
                name: self.local.name.clone(),
                url: self.local.url.clone(),
            }))
    }

    /// Builds the remote source configurations.
    pub fn remote_configs(&self) -> ClientResult<Vec<RemoteSourceConfig>> {
        self.sources.iter().map(SourceSettings::to_remote_config).collect()
    }

    /// Loads the local event store. No events file means an empty store.
    pub fn store(&self) -> ClientResult<Arc<MemoryStore>> {
        match self.local.events_file {
            Some(ref path) => Ok(Arc::new(MemoryStore::load(path)?)),
            None => Ok(Arc::new(MemoryStore::default())),
        }
    }

    /// Builds the tracing configuration, command-line flags taking precedence.
    pub fn tracing_config(
        &self,
        debug: bool,
        format: Option<TracingOutputFormat>,
    ) -> ClientResult<TracingConfig> {
        let mut config = if debug || self.debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::cli()
        };

        let format = match (format, self.logging.format.as_deref()) {
            (Some(format), _) => Some(format),
            (None, Some(name)) => Some(name.parse().map_err(ClientError::Config)?),
            (None, None) => None,
        };
        if let Some(format) = format {
            config = config.with_format(format);
        }
        if let Some(ref filter) = self.logging.filter {
            config = config.with_env_filter(filter);
        }
        Ok(config)
    }
}
