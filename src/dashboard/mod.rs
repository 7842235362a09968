//! Station selection pipeline.
//!
//! A selection resolves the station's streams, drops what the session may
//! not see, fetches every remaining stream concurrently, aligns the series
//! per unit and turns them into chart panels. Acquisition failures degrade
//! to empty data and are logged; every call ends in something renderable.

pub mod chart;
pub mod tokens;
pub mod views;

pub use chart::{ChartPoint, ChartRenderer, ChartSeries, ChartSlot, ChartSpec};
pub use tokens::{Region, RequestToken, RequestTokens};
pub use views::{BatteryReading, LatestValue, MapView, StationView, map_view};

use futures::future::join_all;

use crate::catalog::{Station, Stream, resolve_stations, resolve_streams, visible_streams};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::observations::{Observation, TimeWindow, fetch_observations, latest_observation};
use crate::series::{SeriesInput, align};
use crate::session::Session;
use crate::sta::SensorSource;

pub struct Dashboard<S> {
    source: S,
    config: Config,
    session: Session,
    tokens: RequestTokens,
}

impl<S: SensorSource> Dashboard<S> {
    pub fn new(source: S, config: Config) -> Self {
        Self {
            source,
            config,
            session: Session::anonymous(),
            tokens: RequestTokens::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn login(&mut self, user: &str, password: &str) -> bool {
        self.session.login(&self.config, user, password)
    }

    pub fn logout(&mut self) {
        self.session.logout();
    }

    /// Mapped stations; empty if the station listing cannot be fetched.
    pub async fn stations(&self) -> Vec<Station> {
        match resolve_stations(&self.source, &self.session, &self.config).await {
            Ok(stations) => {
                tracing::info!(count = stations.len(), "Stations loaded");
                stations
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load stations");
                Vec::new()
            }
        }
    }

    /// Chart panels for a station over `window`.
    ///
    /// Returns `None` if a newer chart request was issued while this one was
    /// in flight; the caller must then leave the display alone.
    pub async fn station_view(&self, station: &Station, window: TimeWindow) -> Option<StationView> {
        let token = self.tokens.issue(Region::StationChart);

        let streams = self.visible_streams_of(station).await;
        if streams.is_empty() {
            return self
                .tokens
                .is_current(token)
                .then(|| StationView::no_data(station, window));
        }

        let series = join_all(streams.iter().map(|stream| async move {
            let points = match fetch_observations(&self.source, &stream.id, window).await {
                Ok(points) => points,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        station = %station.display_name,
                        stream = %stream.raw_name,
                        "Observation fetch failed, showing stream as empty"
                    );
                    Vec::new()
                }
            };
            (stream, points)
        }))
        .await;

        if !self.tokens.is_current(token) {
            tracing::debug!(station = %station.display_name, seq = token.seq(), "stale_chart_discarded");
            return None;
        }

        let panels = build_panels(series);
        if panels.iter().all(|p| p.no_data) {
            return Some(StationView::no_data(station, window));
        }

        tracing::debug!(
            station = %station.display_name,
            window = %window,
            panels = panels.len(),
            "station_view_built"
        );
        Some(StationView::new(station, window, panels))
    }

    /// Most recent value of every visible stream of a station.
    ///
    /// `region` is [`Region::LatestValues`] for the table and
    /// [`Region::HoverPreview`] for map popups. `None` if overtaken.
    pub async fn latest_values(&self, station: &Station, region: Region) -> Option<Vec<LatestValue>> {
        let token = self.tokens.issue(region);
        let streams = self.visible_streams_of(station).await;

        let rows = join_all(streams.iter().map(|stream| async move {
            let latest = match latest_observation(&self.source, &stream.id).await {
                Ok(latest) => latest,
                Err(e) => {
                    tracing::warn!(error = %e, stream = %stream.raw_name, "Latest value unavailable");
                    None
                }
            };
            LatestValue {
                label: stream.label.clone(),
                unit: stream.unit.clone(),
                value: latest.and_then(|o| o.value),
                timestamp: latest.map(|o| o.timestamp),
            }
        }))
        .await;

        self.tokens.is_current(token).then_some(rows)
    }

    /// Latest battery voltage per station, for privileged sessions only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for anonymous sessions. Source failures
    /// for a station show as a missing reading.
    pub async fn battery_overview(&self, stations: &[Station]) -> AppResult<Option<Vec<BatteryReading>>> {
        if !self.session.is_privileged() {
            return Err(AppError::Forbidden(
                "battery overview requires login".to_string(),
            ));
        }

        let token = self.tokens.issue(Region::BatteryOverview);
        let readings = join_all(stations.iter().map(|station| async move {
            let volts = match self.battery_volts(station).await {
                Ok(volts) => volts,
                Err(e) => {
                    tracing::warn!(error = %e, station = %station.display_name, "Battery voltage unavailable");
                    None
                }
            };
            BatteryReading::new(&station.display_name, volts, self.config.battery_low_volts)
        }))
        .await;

        Ok(self.tokens.is_current(token).then_some(readings))
    }

    async fn battery_volts(&self, station: &Station) -> AppResult<Option<f64>> {
        let streams = resolve_streams(&self.source, &station.id).await?;
        let Some(battery) = streams.iter().find(|s| s.key().starts_with("battery_voltage")) else {
            return Ok(None);
        };
        Ok(latest_observation(&self.source, &battery.id)
            .await?
            .and_then(|o| o.value))
    }

    async fn visible_streams_of(&self, station: &Station) -> Vec<Stream> {
        match resolve_streams(&self.source, &station.id).await {
            Ok(streams) => visible_streams(streams, &self.session),
            Err(e) => {
                tracing::warn!(error = %e, station = %station.display_name, "Stream catalog unavailable");
                Vec::new()
            }
        }
    }
}

/// Group fetched streams by unit (first-seen order) and chart each group.
fn build_panels(series: Vec<(&Stream, Vec<Observation>)>) -> Vec<ChartSpec> {
    let mut groups: Vec<(String, Vec<SeriesInput>)> = Vec::new();

    for (stream, points) in series {
        let input = SeriesInput::new(stream.label.clone(), points);
        match groups.iter_mut().find(|(unit, _)| *unit == stream.unit) {
            Some((_, inputs)) => inputs.push(input),
            None => groups.push((stream.unit.clone(), vec![input])),
        }
    }

    groups
        .into_iter()
        .map(|(unit, inputs)| {
            let title = inputs
                .iter()
                .map(|i| i.label.as_str())
                .collect::<Vec<_>>()
                .join(" / ");
            ChartSpec::from_aligned(&title, &unit, &align(&inputs))
        })
        .collect()
}
