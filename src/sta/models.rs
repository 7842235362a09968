use serde::{Deserialize, Serialize};
use std::fmt;

/// SensorThings collection envelope: `{"value": [...], "@iot.nextLink": "..."}`
///
/// `value` is required; a body without it fails to deserialize and surfaces
/// as a malformed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    pub value: Vec<T>,
    /// Absolute URL of the next page, present while more data exists
    #[serde(rename = "@iot.nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

impl<T> Collection<T> {
    #[must_use]
    pub fn single_page(value: Vec<T>) -> Self {
        Self {
            value,
            next_link: None,
        }
    }
}

/// Server-assigned `@iot.id`. FROST uses integers by default but may be
/// configured for string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl EntityId {
    /// Render the id as an OData key segment: `42` or `'abc'`.
    #[must_use]
    pub fn path_segment(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }

    /// Parse user input: integers become numeric ids, anything else text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        raw.parse::<i64>()
            .map_or_else(|_| Self::Text(raw.to_string()), Self::Number)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// A monitoring station as listed by `/Things?$expand=Locations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thing {
    #[serde(rename = "@iot.id")]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "Locations", default)]
    pub locations: Vec<Location>,
}

impl Thing {
    /// Coordinates from the first expanded location, as `(lat, lon)`.
    ///
    /// GeoJSON points are ordered `[lon, lat]`.
    #[must_use]
    pub fn explicit_coordinates(&self) -> Option<(f64, f64)> {
        let coords = self
            .locations
            .first()?
            .location
            .as_ref()?
            .coordinates
            .as_ref()?
            .as_array()?;
        let lon = coords.first()?.as_f64()?;
        let lat = coords.get(1)?.as_f64()?;
        Some((lat, lon))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub location: Option<GeoJson>,
}

/// Only the `coordinates` member is read; non-point geometries yield no
/// coordinates rather than a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoJson {
    #[serde(rename = "type", default)]
    pub geometry_type: Option<String>,
    #[serde(default)]
    pub coordinates: Option<serde_json::Value>,
}

/// A sensor stream, from `/Things(id)/Datastreams`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datastream {
    #[serde(rename = "@iot.id")]
    pub id: EntityId,
    /// e.g. `"tide_measurement * box_gmr_twl-box_0924005"`
    #[serde(default)]
    pub name: String,
}

/// An observation as sent by the server, before coercion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    /// ISO 8601 instant, or `start/end` interval
    #[serde(rename = "phenomenonTime", default)]
    pub phenomenon_time: Option<String>,
    /// Number, numeric string, or anything else the sensor produced
    #[serde(default)]
    pub result: serde_json::Value,
}
