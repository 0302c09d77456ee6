//! Aggregator configuration.

use std::time::Duration;

use chrono_tz::Tz;
use eventfold_core::GenerationLimits;

/// How the local source presents itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSourceSettings {
    /// Whether the local store takes part in listings.
    pub enabled: bool,
    /// Display name in the `sources` array.
    pub name: String,
    /// Public URL of this deployment.
    pub url: String,
}

impl Default for LocalSourceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "Local Events".to_string(),
            url: String::new(),
        }
    }
}

/// Aggregator configuration.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Overall deadline for one listing; slower sources are abandoned.
    pub request_deadline: Duration,

    /// Zone deciding "today" when the request names none.
    pub default_timezone: Tz,

    /// Local source settings.
    pub local: LocalSourceSettings,

    /// Page size when the request gives none.
    pub default_per_page: usize,

    /// Page size requested from remote deployments.
    pub remote_per_page: usize,

    /// Recurrence expansion caps.
    pub limits: GenerationLimits,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            request_deadline: Duration::from_secs(Self::DEFAULT_DEADLINE_SECS),
            default_timezone: chrono_tz::UTC,
            local: LocalSourceSettings::default(),
            default_per_page: Self::DEFAULT_PER_PAGE,
            remote_per_page: Self::DEFAULT_REMOTE_PER_PAGE,
            limits: GenerationLimits::default(),
        }
    }
}

impl AggregatorConfig {
    /// Default request deadline in seconds.
    pub const DEFAULT_DEADLINE_SECS: u64 = 20;

    /// Default page size.
    pub const DEFAULT_PER_PAGE: usize = 10;

    /// Default page size for remote fetches.
    pub const DEFAULT_REMOTE_PER_PAGE: usize = 100;

    /// Builder: set the request deadline.
    pub fn with_request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = deadline;
        self
    }

    /// Builder: set the default timezone.
    pub fn with_default_timezone(mut self, tz: Tz) -> Self {
        self.default_timezone = tz;
        self
    }

    /// Builder: set the local source settings.
    pub fn with_local(mut self, local: LocalSourceSettings) -> Self {
        self.local = local;
        self
    }

    /// Builder: set the default page size.
    pub fn with_default_per_page(mut self, per_page: usize) -> Self {
        self.default_per_page = per_page.max(1);
        self
    }

    /// Builder: set the remote page size.
    pub fn with_remote_per_page(mut self, per_page: usize) -> Self {
        self.remote_per_page = per_page.max(1);
        self
    }

    /// Builder: set the generation limits.
    pub fn with_limits(mut self, limits: GenerationLimits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AggregatorConfig::default();
        assert_eq!(config.request_deadline, Duration::from_secs(20));
        assert_eq!(config.default_timezone, chrono_tz::UTC);
        assert!(config.local.enabled);
        assert_eq!(config.local.name, "Local Events");
        assert_eq!(config.default_per_page, 10);
        assert_eq!(config.remote_per_page, 100);
        assert_eq!(config.limits, GenerationLimits::default());
    }

    #[test]
    fn custom_config() {
        let config = AggregatorConfig::default()
            .with_request_deadline(Duration::from_secs(5))
            .with_default_timezone(chrono_tz::Europe::Berlin)
            .with_default_per_page(0)
            .with_remote_per_page(50)
            .with_local(LocalSourceSettings {
                enabled: false,
                ..LocalSourceSettings::default()
            });

        assert_eq!(config.request_deadline, Duration::from_secs(5));
        assert_eq!(config.default_timezone, chrono_tz::Europe::Berlin);
        assert_eq!(config.default_per_page, 1);
        assert_eq!(config.remote_per_page, 50);
        assert!(!config.local.enabled);
    }
}
