use serde::Serialize;

use crate::catalog::access::is_visible_in;
use crate::catalog::categories::{self, CategoryTable};
use crate::error::AppResult;
use crate::session::Session;
use crate::sta::{Datastream, EntityId, SensorSource};

/// A datastream classified by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stream {
    pub id: EntityId,
    pub station_id: EntityId,
    pub raw_name: String,
    /// Short name before the `*` delimiter, as the source wrote it
    pub category: String,
    pub label: String,
    pub unit: String,
}

impl Stream {
    #[must_use]
    pub fn classify(station_id: &EntityId, datastream: &Datastream, table: &CategoryTable) -> Self {
        let category = categories::short_name(&datastream.name).to_string();
        Self {
            id: datastream.id.clone(),
            station_id: station_id.clone(),
            raw_name: datastream.name.clone(),
            label: table.label(&category),
            unit: table.unit(&category).to_string(),
            category,
        }
    }

    #[must_use]
    pub fn is_positional(&self) -> bool {
        categories::is_positional(&self.category)
    }

    /// Normalized category key, e.g. `"battery_voltage"`
    #[must_use]
    pub fn key(&self) -> String {
        categories::normalize_key(&self.category)
    }
}

/// Fetch and classify the datastreams of a station (one request).
///
/// # Errors
///
/// Returns `AppError::SourceUnavailable` or `AppError::MalformedResponse`
/// when the listing cannot be retrieved.
pub async fn resolve_streams<S: SensorSource>(
    source: &S,
    station_id: &EntityId,
) -> AppResult<Vec<Stream>> {
    let table = CategoryTable::standard();
    let datastreams = source.datastreams(station_id).await?;

    let streams: Vec<Stream> = datastreams
        .value
        .iter()
        .map(|ds| Stream::classify(station_id, ds, table))
        .collect();

    tracing::debug!(station = %station_id, count = streams.len(), "streams_resolved");
    Ok(streams)
}

/// Streams the session may chart: positional streams are always removed,
/// then the access policy decides.
#[must_use]
pub fn visible_streams(streams: Vec<Stream>, session: &Session) -> Vec<Stream> {
    let table = CategoryTable::standard();
    streams
        .into_iter()
        .filter(|s| !s.is_positional())
        .filter(|s| is_visible_in(table, &s.category, session.role()))
        .collect()
}
