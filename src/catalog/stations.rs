use futures::future::join_all;
use serde::Serialize;

use crate::catalog::categories::{normalize_key, short_name};
use crate::config::Config;
use crate::error::AppResult;
use crate::observations::latest_observation;
use crate::session::Session;
use crate::sta::{Datastream, EntityId, SensorSource, Thing};

/// Listed first in station pickers
pub const FEATURED_STATION: &str = "Im Jaich, Stadthafen Flensburg";

const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("box_gmr_twl-box_0924005", "Im Jaich, Stadthafen Flensburg"),
    ("box_gmr_twl-box_0924002", "Kappeln/Grauhöft, Werfthafen Stapelfeld"),
    ("Badesteg Reventlou", "Badesteg Reventlou"),
    ("box_gmr_twl-box_0924004", "Schilksee"),
];

/// A station that can be placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: EntityId,
    pub raw_name: String,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Human-readable name for a thing, falling back to the raw name.
#[must_use]
pub fn display_name(raw_name: &str) -> String {
    DISPLAY_NAMES
        .iter()
        .find(|(raw, _)| *raw == raw_name)
        .map_or_else(|| raw_name.to_string(), |(_, display)| (*display).to_string())
}

/// List allowlisted things with coordinates, featured station first.
///
/// Things for which no coordinates can be found are left out.
///
/// # Errors
///
/// Returns the source error if the things listing fails. Failures while
/// resolving a single station's position only drop that station.
pub async fn resolve_stations<S: SensorSource>(
    source: &S,
    session: &Session,
    config: &Config,
) -> AppResult<Vec<Station>> {
    let things = source.things().await?;

    let candidates: Vec<&Thing> = things
        .value
        .iter()
        .filter(|t| config.thing_allowlist.iter().any(|name| *name == t.name))
        .filter(|t| session.is_privileged() || !config.privileged_things.contains(&t.name))
        .collect();

    tracing::debug!(
        listed = things.value.len(),
        allowed = candidates.len(),
        "things_filtered"
    );

    let resolved = join_all(candidates.iter().map(|thing| async move {
        let coordinates = resolve_location(source, thing).await;
        (*thing, coordinates)
    }))
    .await;

    let mut stations: Vec<Station> = resolved
        .into_iter()
        .filter_map(|(thing, coordinates)| {
            let Some((latitude, longitude)) = coordinates else {
                tracing::info!(thing = %thing.name, "No coordinates, station not mapped");
                return None;
            };
            Some(Station {
                id: thing.id.clone(),
                raw_name: thing.name.clone(),
                display_name: display_name(&thing.name),
                latitude,
                longitude,
            })
        })
        .collect();

    // Stable: everything else keeps source order
    stations.sort_by_key(|s| s.display_name != FEATURED_STATION);
    Ok(stations)
}

/// Station position as `(lat, lon)`.
///
/// Prefers the thing's expanded location. Without one, the latest values of
/// its latitude and longitude datastreams are used; both must be present.
pub async fn resolve_location<S: SensorSource>(source: &S, thing: &Thing) -> Option<(f64, f64)> {
    if let Some(coordinates) = thing.explicit_coordinates() {
        return Some(coordinates);
    }

    match positional_fallback(source, &thing.id).await {
        Ok(coordinates) => coordinates,
        Err(e) => {
            tracing::warn!(
                error = %e,
                thing = %thing.name,
                "Failed to read position from latitude/longitude datastreams"
            );
            None
        }
    }
}

async fn positional_fallback<S: SensorSource>(
    source: &S,
    thing: &EntityId,
) -> AppResult<Option<(f64, f64)>> {
    let datastreams = source.datastreams(thing).await?.value;

    let (Some(lat_ds), Some(lon_ds)) = (
        find_by_prefix(&datastreams, "latitude"),
        find_by_prefix(&datastreams, "longitude"),
    ) else {
        return Ok(None);
    };

    let (lat, lon) = futures::join!(
        latest_observation(source, &lat_ds.id),
        latest_observation(source, &lon_ds.id)
    );

    Ok(lat?
        .and_then(|o| o.value)
        .zip(lon?.and_then(|o| o.value)))
}

fn find_by_prefix<'a>(datastreams: &'a [Datastream], prefix: &str) -> Option<&'a Datastream> {
    datastreams
        .iter()
        .find(|ds| normalize_key(short_name(&ds.name)).starts_with(prefix))
}

/// Find a station by id, raw name or display name (names case-insensitive).
#[must_use]
pub fn find_station<'a>(stations: &'a [Station], id_or_name: &str) -> Option<&'a Station> {
    let wanted = id_or_name.trim();
    let id = EntityId::parse(wanted);

    stations.iter().find(|s| s.id == id).or_else(|| {
        stations.iter().find(|s| {
            s.raw_name.eq_ignore_ascii_case(wanted)
                || s.display_name.to_lowercase() == wanted.to_lowercase()
        })
    })
}
