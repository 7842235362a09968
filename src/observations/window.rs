use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Relative time range selectable on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    Last24Hours,
    Last7Days,
    LastYear,
    /// No lower bound: the full history
    #[default]
    All,
}

impl TimeWindow {
    /// `"24h"`, `"7d"` and `"1y"` select a window; anything else is unbounded.
    #[must_use]
    pub fn parse(range: &str) -> Self {
        match range.trim() {
            "24h" => Self::Last24Hours,
            "7d" => Self::Last7Days,
            "1y" => Self::LastYear,
            _ => Self::All,
        }
    }

    #[must_use]
    pub fn duration(self) -> Option<Duration> {
        match self {
            Self::Last24Hours => Some(Duration::hours(24)),
            Self::Last7Days => Some(Duration::days(7)),
            Self::LastYear => Some(Duration::days(365)),
            Self::All => None,
        }
    }

    /// Earliest phenomenon time included, relative to `now`.
    #[must_use]
    pub fn lower_bound(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.duration().map(|d| now - d)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Last24Hours => "24h",
            Self::Last7Days => "7d",
            Self::LastYear => "1y",
            Self::All => "all",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bound for a symbolic range, relative to `now`.
#[must_use]
pub fn time_filter(range: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    TimeWindow::parse(range).lower_bound(now)
}
