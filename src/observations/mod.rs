//! Observation retrieval and coercion.

pub mod fetcher;
pub mod window;

pub use fetcher::{fetch_observations, fetch_observations_since, latest_observation};
pub use window::{TimeWindow, time_filter};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sta::RawObservation;

/// A measurement with a canonical timestamp.
///
/// `value` is `None` when the source result was not a finite number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

impl Observation {
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        Self { timestamp, value }
    }

    /// Coerce a raw observation; `None` if it has no parseable time.
    #[must_use]
    pub fn from_raw(raw: &RawObservation) -> Option<Self> {
        let timestamp = parse_phenomenon_time(raw.phenomenon_time.as_deref()?)?;
        Some(Self {
            timestamp,
            value: coerce_value(&raw.result),
        })
    }
}

/// Parse an ISO 8601 instant into UTC. Intervals (`start/end`) resolve to
/// their start, so equal instants written with different offsets compare
/// equal after parsing.
#[must_use]
pub fn parse_phenomenon_time(raw: &str) -> Option<DateTime<Utc>> {
    let instant = raw.split('/').next().unwrap_or(raw).trim();
    DateTime::parse_from_rfc3339(instant)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Numbers pass through, numeric strings are parsed, everything else
/// (including NaN and infinities) is absent.
#[must_use]
pub fn coerce_value(result: &serde_json::Value) -> Option<f64> {
    let value = match result {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn numeric_strings_are_coerced() {
        assert_eq!(coerce_value(&json!(3.75)), Some(3.75));
        assert_eq!(coerce_value(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(coerce_value(&json!(-4)), Some(-4.0));
    }

    #[test]
    fn non_numeric_results_are_absent() {
        assert_eq!(coerce_value(&json!("n/a")), None);
        assert_eq!(coerce_value(&json!("NaN")), None);
        assert_eq!(coerce_value(&json!("inf")), None);
        assert_eq!(coerce_value(&json!(null)), None);
        assert_eq!(coerce_value(&json!({"v": 1})), None);
    }

    #[test]
    fn offsets_canonicalize_to_utc() {
        let a = parse_phenomenon_time("2025-06-01T12:00:00Z").unwrap();
        let b = parse_phenomenon_time("2025-06-01T14:00:00+02:00").unwrap();
        let c = parse_phenomenon_time("2025-06-01T12:00:00.000Z").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn intervals_use_start_instant() {
        assert_eq!(
            parse_phenomenon_time("2025-06-01T12:00:00Z/2025-06-01T12:10:00Z"),
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(parse_phenomenon_time("yesterday"), None);
    }

    #[test]
    fn raw_observation_without_time_is_dropped() {
        let raw = RawObservation {
            phenomenon_time: None,
            result: json!(1.0),
        };
        assert_eq!(Observation::from_raw(&raw), None);
    }
}
