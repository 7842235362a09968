use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::catalog::Station;
use crate::dashboard::chart::ChartSpec;
use crate::observations::TimeWindow;
use crate::sta::EntityId;

/// Chart panels for one station selection, one panel per unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationView {
    pub station_id: EntityId,
    pub title: String,
    pub window: String,
    pub panels: Vec<ChartSpec>,
}

impl StationView {
    #[must_use]
    pub fn new(station: &Station, window: TimeWindow, panels: Vec<ChartSpec>) -> Self {
        Self {
            station_id: station.id.clone(),
            title: station.display_name.clone(),
            window: window.to_string(),
            panels,
        }
    }

    /// Single "no data" panel for a station.
    #[must_use]
    pub fn no_data(station: &Station, window: TimeWindow) -> Self {
        let title = format!("{} (Keine Messdaten)", station.display_name);
        Self::new(station, window, vec![ChartSpec::no_data(&title)])
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.panels.iter().any(|p| !p.no_data)
    }
}

/// One row of the latest-values table / hover preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestValue {
    pub label: String,
    pub unit: String,
    pub value: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl LatestValue {
    /// `"12.5 cm"`, or `"n/a"` without a value.
    #[must_use]
    pub fn value_text(&self) -> String {
        match self.value {
            Some(v) if self.unit.is_empty() => format!("{v}"),
            Some(v) => format!("{v} {}", self.unit),
            None => "n/a".to_string(),
        }
    }

    /// Date and time as `dd.mm.yyyy` / `HH:MM` in `tz`, `-` when unknown.
    #[must_use]
    pub fn date_time_in<Tz: TimeZone>(&self, tz: &Tz) -> (String, String)
    where
        Tz::Offset: std::fmt::Display,
    {
        match self.timestamp {
            Some(ts) => {
                let local = ts.with_timezone(tz);
                (
                    local.format("%d.%m.%Y").to_string(),
                    local.format("%H:%M").to_string(),
                )
            }
            None => ("-".to_string(), "-".to_string()),
        }
    }
}

/// Latest battery voltage of one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryReading {
    pub station: String,
    pub volts: Option<f64>,
    pub low: bool,
}

impl BatteryReading {
    #[must_use]
    pub fn new(station: &str, volts: Option<f64>, low_threshold: f64) -> Self {
        Self {
            station: station.to_string(),
            volts,
            low: volts.is_some_and(|v| v < low_threshold),
        }
    }

    #[must_use]
    pub fn volts_text(&self) -> String {
        self.volts
            .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2} V"))
    }
}

/// Stations that are announced but not yet delivering data: `(name, lat, lon)`
pub const PLANNED_STATIONS: &[(&str, f64, f64)] = &[
    ("Marina Heiligenhafen (Demnächst verfügbar)", 54.3755, 10.9845),
    ("Marina Lübeck \"The Newport\" (Demnächst verfügbar)", 53.8734, 10.6834),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub title: String,
    /// `false` for planned stations (grey marker, no data)
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<EntityId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Markers plus the viewport the map widget should open with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    /// Mean position of the live stations
    pub center: Option<(f64, f64)>,
    /// Covers every marker, planned ones included
    pub bounds: Option<MapBounds>,
    pub markers: Vec<MapMarker>,
}

#[must_use]
pub fn map_view(stations: &[Station]) -> MapView {
    let mut markers: Vec<MapMarker> = stations
        .iter()
        .map(|s| MapMarker {
            lat: s.latitude,
            lon: s.longitude,
            title: s.display_name.clone(),
            available: true,
            station_id: Some(s.id.clone()),
        })
        .collect();

    markers.extend(PLANNED_STATIONS.iter().map(|(name, lat, lon)| MapMarker {
        lat: *lat,
        lon: *lon,
        title: (*name).to_string(),
        available: false,
        station_id: None,
    }));

    let center = (!stations.is_empty()).then(|| {
        let n = stations.len() as f64;
        (
            stations.iter().map(|s| s.latitude).sum::<f64>() / n,
            stations.iter().map(|s| s.longitude).sum::<f64>() / n,
        )
    });

    let bounds = markers.iter().fold(None, |acc: Option<MapBounds>, m| {
        Some(match acc {
            None => MapBounds {
                south: m.lat,
                west: m.lon,
                north: m.lat,
                east: m.lon,
            },
            Some(b) => MapBounds {
                south: b.south.min(m.lat),
                west: b.west.min(m.lon),
                north: b.north.max(m.lat),
                east: b.east.max(m.lon),
            },
        })
    });

    MapView {
        center,
        bounds,
        markers,
    }
}
