// ── Runtime monitor configuration ──
//
// Describes *what* to poll and *how* to authenticate. Carries credential
// data and polling cadence, but never touches disk. The CLI builds a
// `MonitorConfig` from its config file / environment and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use whes_api::{ApiCredentials, Installation};

/// Production metrics endpoint (EU region).
pub const DEFAULT_BASE_URL: &str = "https://open-api-eu.weiheng-tech.com/open-api";

/// Server-side downsampling bucket passed with every metrics request.
pub const DEFAULT_SAMPLE_BY: &str = "10s";

/// Default gap between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Lower bound for the poll interval; shorter settings are clamped.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Extra lookback added to every query window to absorb ingest lag.
pub const WINDOW_OVERLAP: Duration = Duration::from_secs(15);

/// Default per-request transport timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for polling a single installation.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// API root, e.g. `https://open-api-eu.weiheng-tech.com/open-api`.
    /// A trailing slash is tolerated.
    pub base_url: String,
    /// Key identifying the API account.
    pub api_key: String,
    /// Signing secret paired with the key. Never logged.
    pub api_secret: SecretString,
    /// Project the installation belongs to.
    pub project_id: String,
    /// Device identifier of the battery system.
    pub device_id: String,
    /// Identifier of the grid meter attached to the installation.
    pub ammeter_id: String,
    /// Downsampling bucket (e.g. `10s`).
    pub sample_by: String,
    /// Gap between poll cycles. Values below [`MIN_POLL_INTERVAL`] are
    /// clamped by the monitor.
    pub poll_interval: Duration,
    /// Per-request transport timeout.
    pub timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            api_secret: SecretString::from(String::new()),
            project_id: String::new(),
            device_id: String::new(),
            ammeter_id: String::new(),
            sample_by: DEFAULT_SAMPLE_BY.to_owned(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl MonitorConfig {
    /// Poll interval with the floor applied.
    pub fn effective_poll_interval(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }

    /// Signing credentials for the API client.
    pub fn api_credentials(&self) -> ApiCredentials {
        ApiCredentials {
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
        }
    }

    /// Installation identifiers for the API client.
    pub fn installation(&self) -> Installation {
        Installation {
            project_id: self.project_id.clone(),
            device_id: self.device_id.clone(),
            ammeter_id: self.ammeter_id.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_eu_endpoint() {
        let config = MonitorConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.sample_by, "10s");
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn short_intervals_are_clamped_to_the_floor() {
        let config = MonitorConfig {
            poll_interval: Duration::from_secs(1),
            ..MonitorConfig::default()
        };
        assert_eq!(config.effective_poll_interval(), MIN_POLL_INTERVAL);

        let config = MonitorConfig {
            poll_interval: Duration::from_secs(120),
            ..MonitorConfig::default()
        };
        assert_eq!(config.effective_poll_interval(), Duration::from_secs(120));
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let config = MonitorConfig {
            api_secret: SecretString::from("hunter2".to_owned()),
            ..MonitorConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
