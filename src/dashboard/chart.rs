use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppResult;
use crate::series::{AlignedSeriesSet, AxisBounds, padded_bounds};

/// Line colors, assigned by series position
pub const COLOR_PALETTE: &[&str] = &[
    "#78D278", "#FF6666", "#053246", "#FFA500", "#8A2BE2", "#00BFFF", "#FFD700", "#FF69B4",
    "#A0522D", "#20B2AA",
];

pub const TIME_AXIS_TITLE: &str = "Zeit";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: DateTime<Utc>,
    /// `null` is a gap, never zero
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub color: String,
    /// Kept in the legend but not drawn (no data in range)
    pub hidden: bool,
    pub points: Vec<ChartPoint>,
}

/// Everything a chart library needs to draw one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub y_bounds: Option<AxisBounds>,
    pub no_data: bool,
    pub series: Vec<ChartSeries>,
}

impl ChartSpec {
    /// Build a panel from aligned series. Falls back to [`ChartSpec::no_data`]
    /// when no series has a value.
    #[must_use]
    pub fn from_aligned(title: &str, unit: &str, aligned: &AlignedSeriesSet) -> Self {
        if aligned.has_no_data() {
            return Self::no_data(&format!("{title} (keine Daten)"));
        }

        let series = aligned
            .series
            .iter()
            .enumerate()
            .map(|(i, s)| ChartSeries {
                label: s.label.clone(),
                color: COLOR_PALETTE[i % COLOR_PALETTE.len()].to_string(),
                hidden: s.is_empty(),
                points: aligned
                    .timestamps
                    .iter()
                    .zip(&s.values)
                    .map(|(x, y)| ChartPoint { x: *x, y: *y })
                    .collect(),
            })
            .collect();

        Self {
            title: title.to_string(),
            x_axis_title: TIME_AXIS_TITLE.to_string(),
            y_axis_title: unit.to_string(),
            y_bounds: padded_bounds(aligned.finite_values()),
            no_data: false,
            series,
        }
    }

    /// Explicit empty state: one empty series titled like the chart.
    #[must_use]
    pub fn no_data(title: &str) -> Self {
        Self {
            title: title.to_string(),
            x_axis_title: TIME_AXIS_TITLE.to_string(),
            y_axis_title: String::new(),
            y_bounds: None,
            no_data: true,
            series: vec![ChartSeries {
                label: title.to_string(),
                color: COLOR_PALETTE[0].to_string(),
                hidden: false,
                points: Vec::new(),
            }],
        }
    }

    /// Series that are actually drawn.
    pub fn visible_series(&self) -> impl Iterator<Item = &ChartSeries> {
        self.series.iter().filter(|s| !s.hidden && !s.points.is_empty())
    }
}

/// A drawing surface that owns live chart instances.
///
/// A chart returned by `render` stays alive until handed back to `dispose`.
pub trait ChartRenderer {
    type Chart;

    /// Draw a chart.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot draw the chart.
    fn render(&mut self, spec: &ChartSpec) -> AppResult<Self::Chart>;

    fn dispose(&mut self, chart: Self::Chart);
}

/// Holds at most one live chart on a renderer.
///
/// The previous chart is disposed before every new render, and on drop.
pub struct ChartSlot<R: ChartRenderer> {
    renderer: R,
    live: Option<R::Chart>,
}

impl<R: ChartRenderer> ChartSlot<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            live: None,
        }
    }

    /// Replace the live chart with one drawn from `spec`.
    ///
    /// # Errors
    ///
    /// Returns the renderer's error; the slot is then empty.
    pub fn show(&mut self, spec: &ChartSpec) -> AppResult<()> {
        self.clear();
        let chart = self.renderer.render(spec)?;
        self.live = Some(chart);
        Ok(())
    }

    pub fn clear(&mut self) {
        if let Some(chart) = self.live.take() {
            self.renderer.dispose(chart);
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: ChartRenderer> Drop for ChartSlot<R> {
    fn drop(&mut self) {
        self.clear();
    }
}
