//! In-memory [`SensorSource`] for offline runs and tests.
//!
//! Honors ordering, the lower time bound and `$top`, and splits listings
//! into pages linked by `memory://` next links, so the paging code sees the
//! same shapes a FROST server produces.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::observations::parse_phenomenon_time;
use crate::sta::models::{Collection, Datastream, EntityId, GeoJson, Location, RawObservation, Thing};
use crate::sta::query::{ObservationQuery, SortOrder};
use crate::sta::source::{PageRequest, SensorSource};

struct Cursor {
    datastream: EntityId,
    query: ObservationQuery,
    skip: usize,
}

pub struct MemorySource {
    things: Vec<Thing>,
    datastreams: HashMap<EntityId, Vec<Datastream>>,
    observations: HashMap<EntityId, Vec<RawObservation>>,
    failing_things: bool,
    failing_catalogs: HashSet<EntityId>,
    failing_datastreams: HashSet<EntityId>,
    page_size: usize,
    latency: Option<Duration>,
    cursors: Mutex<HashMap<String, Cursor>>,
    observation_requests: AtomicUsize,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            things: Vec::new(),
            datastreams: HashMap::new(),
            observations: HashMap::new(),
            failing_things: false,
            failing_catalogs: HashSet::new(),
            failing_datastreams: HashSet::new(),
            page_size: 100,
            latency: None,
            cursors: Mutex::new(HashMap::new()),
            observation_requests: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Delay every observations response, so concurrent requests interleave.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Add a thing; `coordinates` are `(lat, lon)` and become an expanded
    /// GeoJSON point location.
    pub fn add_thing(&mut self, id: impl Into<EntityId>, name: &str, coordinates: Option<(f64, f64)>) {
        let locations = coordinates
            .map(|(lat, lon)| {
                vec![Location {
                    location: Some(GeoJson {
                        geometry_type: Some("Point".to_string()),
                        coordinates: Some(serde_json::json!([lon, lat])),
                    }),
                }]
            })
            .unwrap_or_default();

        self.things.push(Thing {
            id: id.into(),
            name: name.to_string(),
            locations,
        });
    }

    pub fn add_datastream(&mut self, thing: impl Into<EntityId>, id: impl Into<EntityId>, name: &str) {
        self.datastreams
            .entry(thing.into())
            .or_default()
            .push(Datastream {
                id: id.into(),
                name: name.to_string(),
            });
    }

    /// Append `(phenomenonTime, result)` pairs to a datastream.
    pub fn add_observations(&mut self, datastream: impl Into<EntityId>, points: &[(&str, serde_json::Value)]) {
        self.observations
            .entry(datastream.into())
            .or_default()
            .extend(points.iter().map(|(time, result)| RawObservation {
                phenomenon_time: Some((*time).to_string()),
                result: result.clone(),
            }));
    }

    /// Make the things listing fail.
    pub fn fail_things(&mut self) {
        self.failing_things = true;
    }

    /// Make the datastream listing of one thing fail.
    pub fn fail_catalog(&mut self, thing: impl Into<EntityId>) {
        self.failing_catalogs.insert(thing.into());
    }

    /// Make observation requests for one datastream fail.
    pub fn fail_datastream(&mut self, datastream: impl Into<EntityId>) {
        self.failing_datastreams.insert(datastream.into());
    }

    /// Number of observation pages requested so far.
    #[must_use]
    pub fn observation_requests(&self) -> usize {
        self.observation_requests.load(Ordering::Relaxed)
    }

    fn select(&self, datastream: &EntityId, query: &ObservationQuery) -> Vec<RawObservation> {
        let mut rows: Vec<_> = self
            .observations
            .get(datastream)
            .into_iter()
            .flatten()
            .filter_map(|raw| {
                let time = parse_phenomenon_time(raw.phenomenon_time.as_deref()?)?;
                match query.since {
                    Some(since) if time < since => None,
                    _ => Some((time, raw.clone())),
                }
            })
            .collect();

        rows.sort_by_key(|(time, _)| *time);
        if query.order == SortOrder::Descending {
            rows.reverse();
        }
        if let Some(top) = query.top {
            rows.truncate(top as usize);
        }
        rows.into_iter().map(|(_, raw)| raw).collect()
    }

    fn page(&self, datastream: EntityId, query: ObservationQuery, skip: usize) -> Collection<RawObservation> {
        let rows = self.select(&datastream, &query);
        let end = (skip + self.page_size).min(rows.len());
        let value = rows.get(skip..end).map(<[_]>::to_vec).unwrap_or_default();

        let next_link = (end < rows.len()).then(|| {
            let link = listing_url(&datastream, &query, end);
            if let Ok(mut cursors) = self.cursors.lock() {
                cursors.insert(
                    link.clone(),
                    Cursor {
                        datastream,
                        query,
                        skip: end,
                    },
                );
            }
            link
        });

        Collection { value, next_link }
    }
}

impl SensorSource for MemorySource {
    async fn things(&self) -> AppResult<Collection<Thing>> {
        if self.failing_things {
            return Err(AppError::SourceUnavailable("HTTP 503 Service Unavailable".to_string()));
        }
        Ok(Collection::single_page(self.things.clone()))
    }

    async fn datastreams(&self, thing: &EntityId) -> AppResult<Collection<Datastream>> {
        if self.failing_catalogs.contains(thing) {
            return Err(AppError::SourceUnavailable("HTTP 503 Service Unavailable".to_string()));
        }
        Ok(Collection::single_page(
            self.datastreams.get(thing).cloned().unwrap_or_default(),
        ))
    }

    async fn observations(&self, page: &PageRequest) -> AppResult<Collection<RawObservation>> {
        self.observation_requests.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let (datastream, query, skip) = match page {
            PageRequest::First { datastream, query } => (datastream.clone(), query.clone(), 0),
            PageRequest::Next(link) => {
                let cursors = self
                    .cursors
                    .lock()
                    .map_err(|_| AppError::SourceUnavailable("cursor table poisoned".to_string()))?;
                let cursor = cursors
                    .get(link)
                    .ok_or_else(|| AppError::SourceUnavailable(format!("HTTP 404 Not Found: {link}")))?;
                (cursor.datastream.clone(), cursor.query.clone(), cursor.skip)
            }
        };

        if self.failing_datastreams.contains(&datastream) {
            return Err(AppError::SourceUnavailable("HTTP 500 Internal Server Error".to_string()));
        }

        Ok(self.page(datastream, query, skip))
    }

    fn page_url(&self, page: &PageRequest) -> String {
        match page {
            PageRequest::First { datastream, query } => listing_url(datastream, query, 0),
            PageRequest::Next(link) => link.clone(),
        }
    }
}

fn listing_url(datastream: &EntityId, query: &ObservationQuery, skip: usize) -> String {
    format!(
        "memory://Datastreams({})/Observations?$skip={skip}&{}",
        datastream.path_segment(),
        query.to_query_string()
    )
}
