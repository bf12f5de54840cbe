use std::str::FromStr;
use std::time::Duration;

use tracing::Level;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const LATEST_DOCUMENT_PATH: &str = "/api/v1/mqtt/latest-mqtt-document";
pub const HEALTH_CHECK_PATH: &str = "/docs";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings baked into the bundle at build time, a CSR app has no runtime environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub log_level: Level,
    pub request_timeout: Duration,
    pub health_check_timeout: Duration,
}

impl Config {
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("PULSE_API_BASE_URL"),
            option_env!("PULSE_LOG_LEVEL"),
        )
    }

    pub fn from_values(api_base_url: Option<&str>, log_level: Option<&str>) -> Self {
        let api_base_url = api_base_url
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
            .to_string();

        let log_level = log_level
            .and_then(|level| Level::from_str(level.trim()).ok())
            .unwrap_or(Level::INFO);

        Self {
            api_base_url,
            log_level,
            request_timeout: REQUEST_TIMEOUT,
            health_check_timeout: HEALTH_CHECK_TIMEOUT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_values(None, None)
    }
}
