use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use humantime::format_duration;
use thiserror::Error;

use crate::types::TelemetryDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshInterval {
    TenSeconds,
    #[default]
    ThirtySeconds,
    OneMinute,
    FiveMinutes,
}

impl RefreshInterval {
    pub const ALL: [Self; 4] = [
        Self::TenSeconds,
        Self::ThirtySeconds,
        Self::OneMinute,
        Self::FiveMinutes,
    ];

    pub fn as_secs(self) -> u64 {
        match self {
            Self::TenSeconds => 10,
            Self::ThirtySeconds => 30,
            Self::OneMinute => 60,
            Self::FiveMinutes => 300,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.as_secs())
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_duration(self.as_duration()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown refresh interval {0:?}")]
pub struct UnknownInterval(pub String);

impl FromStr for RefreshInterval {
    type Err = UnknownInterval;

    /// Parses the number of seconds, as carried by the interval `<select>`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let secs = value
            .trim()
            .parse::<u64>()
            .map_err(|_| UnknownInterval(value.to_string()))?;

        Self::ALL
            .into_iter()
            .find(|interval| interval.as_secs() == secs)
            .ok_or_else(|| UnknownInterval(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    Mount,
    Timer,
    Manual,
}

impl FetchOrigin {
    // Timer ticks refresh in the background without flashing the loading card
    fn shows_loading(self) -> bool {
        matches!(self, Self::Mount | Self::Manual)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    FetchStarted(FetchOrigin),
    FetchSucceeded {
        document: TelemetryDocument,
        fetched_at: DateTime<Utc>,
    },
    FetchFailed(String),
    AutoRefreshToggled,
    IntervalChanged(RefreshInterval),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Connected,
    ConnectionError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    document: Option<TelemetryDocument>,
    loading: bool,
    error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    auto_refresh: bool,
    refresh_interval: RefreshInterval,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            document: None,
            loading: true,
            error: None,
            last_updated: None,
            auto_refresh: true,
            refresh_interval: RefreshInterval::default(),
        }
    }
}

impl DashboardState {
    #[must_use]
    pub fn reduce(self, event: DashboardEvent) -> Self {
        match event {
            DashboardEvent::FetchStarted(origin) => Self {
                loading: self.loading || origin.shows_loading(),
                error: None,
                ..self
            },
            DashboardEvent::FetchSucceeded {
                document,
                fetched_at,
            } => Self {
                document: Some(document),
                loading: false,
                error: None,
                last_updated: Some(fetched_at),
                ..self
            },
            // The previous document stays on screen next to the error
            DashboardEvent::FetchFailed(message) => Self {
                loading: false,
                error: Some(message),
                ..self
            },
            DashboardEvent::AutoRefreshToggled => Self {
                auto_refresh: !self.auto_refresh,
                ..self
            },
            DashboardEvent::IntervalChanged(refresh_interval) => Self {
                refresh_interval,
                ..self
            },
        }
    }

    pub fn document(&self) -> Option<&TelemetryDocument> {
        self.document.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn refresh_interval(&self) -> RefreshInterval {
        self.refresh_interval
    }

    /// Period of the refresh timer, `None` while auto-refresh is off.
    pub fn refresh_period(&self) -> Option<Duration> {
        self.auto_refresh
            .then(|| self.refresh_interval.as_duration())
    }

    pub fn connectivity(&self) -> Connectivity {
        if self.error.is_some() {
            Connectivity::ConnectionError
        } else {
            Connectivity::Connected
        }
    }

    pub fn auto_refresh_label(&self) -> String {
        if self.auto_refresh {
            format!("Every {}s", self.refresh_interval.as_secs())
        } else {
            "Disabled".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(id: &str) -> TelemetryDocument {
        TelemetryDocument {
            id: Some(id.to_string()),
            payload: None,
            publish_received_at: Some(1_700_000_000_000.0),
        }
    }

    fn succeeded(id: &str) -> DashboardEvent {
        DashboardEvent::FetchSucceeded {
            document: document(id),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn starts_loading_with_auto_refresh_every_thirty_seconds() {
        let state = DashboardState::default();

        assert!(state.is_loading());
        assert!(state.document().is_none());
        assert!(state.auto_refresh());
        assert_eq!(state.refresh_interval(), RefreshInterval::ThirtySeconds);
        assert_eq!(state.refresh_period(), Some(Duration::from_secs(30)));
        assert_eq!(state.last_updated(), None);
    }

    #[test]
    fn success_stores_document_and_clears_error() {
        let state = DashboardState::default()
            .reduce(DashboardEvent::FetchFailed("db down".to_string()))
            .reduce(DashboardEvent::FetchStarted(FetchOrigin::Timer))
            .reduce(succeeded("abc"));

        assert!(!state.is_loading());
        assert_eq!(state.error(), None);
        assert_eq!(state.document(), Some(&document("abc")));
        assert!(state.last_updated().is_some());
        assert_eq!(state.connectivity(), Connectivity::Connected);
    }

    #[test]
    fn failure_keeps_previous_document() {
        let state = DashboardState::default()
            .reduce(succeeded("abc"))
            .reduce(DashboardEvent::FetchStarted(FetchOrigin::Manual))
            .reduce(DashboardEvent::FetchFailed("db down".to_string()));

        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("db down"));
        assert_eq!(state.document(), Some(&document("abc")));
        assert_eq!(state.connectivity(), Connectivity::ConnectionError);
    }

    #[test]
    fn only_mount_and_manual_fetches_show_loading() {
        let ready = DashboardState::default().reduce(succeeded("abc"));

        assert!(!ready
            .clone()
            .reduce(DashboardEvent::FetchStarted(FetchOrigin::Timer))
            .is_loading());
        assert!(ready
            .clone()
            .reduce(DashboardEvent::FetchStarted(FetchOrigin::Manual))
            .is_loading());
        assert!(ready
            .reduce(DashboardEvent::FetchStarted(FetchOrigin::Mount))
            .is_loading());
    }

    #[test]
    fn starting_a_fetch_clears_the_error() {
        let state = DashboardState::default()
            .reduce(DashboardEvent::FetchFailed("db down".to_string()))
            .reduce(DashboardEvent::FetchStarted(FetchOrigin::Timer));

        assert_eq!(state.error(), None);
    }

    #[test]
    fn toggling_auto_refresh_clears_the_period() {
        let state = DashboardState::default().reduce(DashboardEvent::AutoRefreshToggled);

        assert!(!state.auto_refresh());
        assert_eq!(state.refresh_period(), None);
        assert_eq!(state.auto_refresh_label(), "Disabled");

        let state = state
            .reduce(DashboardEvent::IntervalChanged(RefreshInterval::FiveMinutes))
            .reduce(DashboardEvent::AutoRefreshToggled);

        assert_eq!(state.refresh_period(), Some(Duration::from_secs(300)));
        assert_eq!(state.auto_refresh_label(), "Every 300s");
        assert_eq!(DashboardState::default().auto_refresh_label(), "Every 30s");
    }

    #[test]
    fn intervals_render_and_parse_as_select_options() {
        let labels = RefreshInterval::ALL.map(|interval| interval.to_string());

        assert_eq!(labels, ["10s", "30s", "1m", "5m"]);
        assert_eq!("60".parse(), Ok(RefreshInterval::OneMinute));
        assert_eq!(
            "45".parse::<RefreshInterval>(),
            Err(UnknownInterval("45".to_string()))
        );
        assert!("soon".parse::<RefreshInterval>().is_err());
    }
}
