use chrono::TimeZone;
use serde::Serialize;
use std::io::Write;

use crate::catalog::Station;
use crate::dashboard::{BatteryReading, ChartRenderer, ChartSlot, ChartSpec, LatestValue, StationView};
use crate::error::AppResult;
use crate::observations::Observation;
use crate::series::{SeriesInput, align};
use crate::sta::EntityId;

/// Chart surface that keeps the JSON form of its live chart.
#[derive(Debug, Default)]
pub struct JsonSurface {
    drawn: Option<serde_json::Value>,
    renders: u64,
}

impl JsonSurface {
    /// The chart currently on the surface, if any.
    #[must_use]
    pub fn drawn(&self) -> Option<&serde_json::Value> {
        self.drawn.as_ref()
    }
}

impl ChartRenderer for JsonSurface {
    type Chart = u64;

    fn render(&mut self, spec: &ChartSpec) -> AppResult<u64> {
        self.drawn = Some(serde_json::to_value(spec)?);
        self.renders += 1;
        tracing::debug!(chart = self.renders, title = %spec.title, "chart_rendered");
        Ok(self.renders)
    }

    fn dispose(&mut self, chart: u64) {
        self.drawn = None;
        tracing::debug!(chart, "chart_disposed");
    }
}

#[derive(Serialize)]
struct ViewDocument<'a> {
    station_id: &'a EntityId,
    title: &'a str,
    window: &'a str,
    panels: Vec<&'a serde_json::Value>,
}

/// Draw every panel on its own surface and write the station view as one
/// JSON document.
///
/// # Errors
///
/// Returns `AppError::Output` if a panel cannot be drawn or writing fails.
pub fn write_view_json<W: Write>(mut out: W, view: &StationView) -> AppResult<()> {
    let slots = view
        .panels
        .iter()
        .map(|panel| {
            let mut slot = ChartSlot::new(JsonSurface::default());
            slot.show(panel)?;
            Ok(slot)
        })
        .collect::<AppResult<Vec<_>>>()?;

    let document = ViewDocument {
        station_id: &view.station_id,
        title: &view.title,
        window: &view.window,
        panels: slots.iter().filter_map(|s| s.renderer().drawn()).collect(),
    };
    serde_json::to_writer_pretty(&mut out, &document)?;
    writeln!(out)?;
    Ok(())
}

/// All panels of a station view as one table: one row per timestamp, one
/// `label [unit]` column per series, empty cells for gaps. "No data"
/// panels contribute no columns.
///
/// # Errors
///
/// Returns `AppError::Output` if writing fails.
pub fn write_view_csv<W: Write>(out: W, view: &StationView) -> AppResult<()> {
    let inputs: Vec<SeriesInput> = view
        .panels
        .iter()
        .filter(|panel| !panel.no_data)
        .flat_map(|panel| {
            panel.series.iter().map(|s| {
                let label = if panel.y_axis_title.is_empty() {
                    s.label.clone()
                } else {
                    format!("{} [{}]", s.label, panel.y_axis_title)
                };
                let points = s.points.iter().map(|p| Observation::new(p.x, p.y)).collect();
                SeriesInput::new(label, points)
            })
        })
        .collect();
    let table = align(&inputs);

    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["time".to_string()];
    header.extend(table.series.iter().map(|s| s.label.clone()));
    writer.write_record(&header)?;

    for (i, time) in table.timestamps.iter().enumerate() {
        let mut row = vec![time.to_rfc3339()];
        row.extend(
            table
                .series
                .iter()
                .map(|s| s.values[i].map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// # Errors
///
/// Returns `AppError::Output` if writing fails.
pub fn write_stations<W: Write>(mut out: W, stations: &[Station]) -> AppResult<()> {
    for s in stations {
        writeln!(
            out,
            "{}\t{}\t{:.5}\t{:.5}\t{}",
            s.id, s.display_name, s.latitude, s.longitude, s.raw_name
        )?;
    }
    Ok(())
}

/// Latest-values table with dates rendered in `tz`.
///
/// # Errors
///
/// Returns `AppError::Output` if writing fails.
pub fn write_latest_table<W: Write, Tz: TimeZone>(
    mut out: W,
    title: &str,
    rows: &[LatestValue],
    tz: &Tz,
) -> AppResult<()>
where
    Tz::Offset: std::fmt::Display,
{
    writeln!(out, "Letzte Messwerte: {title}")?;
    if rows.is_empty() {
        writeln!(out, "  (keine Messgrößen)")?;
        return Ok(());
    }

    let label_width = rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0)
        .max("Messgröße".chars().count());

    writeln!(
        out,
        "{:<label_width$}  {:>14}  {:^10}  {:^7}",
        "Messgröße", "Wert", "Datum", "Uhrzeit"
    )?;
    for row in rows {
        let (date, time) = row.date_time_in(tz);
        writeln!(
            out,
            "{:<label_width$}  {:>14}  {:^10}  {:^7}",
            row.label,
            row.value_text(),
            date,
            time
        )?;
    }
    Ok(())
}

/// # Errors
///
/// Returns `AppError::Output` if writing fails.
pub fn write_battery<W: Write>(mut out: W, readings: &[BatteryReading]) -> AppResult<()> {
    writeln!(out, "Spannung aller Geräte")?;
    for r in readings {
        let flag = if r.low { "  LOW" } else { "" };
        writeln!(out, "{}: {}{flag}", r.station, r.volts_text())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    fn view() -> StationView {
        let station = Station {
            id: EntityId::Number(4),
            raw_name: "box_gmr_twl-box_0924004".to_string(),
            display_name: "Schilksee".to_string(),
            latitude: 54.43,
            longitude: 10.17,
        };
        let cm = align(&[
            SeriesInput::new("Wasserstand", vec![Observation::new(t(1), Some(-3.5))]),
            SeriesInput::new("Wellenhöhe", vec![Observation::new(t(2), Some(12.0))]),
        ]);
        let celsius = align(&[SeriesInput::new(
            "Wassertemperatur",
            vec![
                Observation::new(t(2), Some(18.5)),
                Observation::new(t(3), Some(19.0)),
            ],
        )]);
        StationView::new(
            &station,
            crate::observations::TimeWindow::All,
            vec![
                ChartSpec::from_aligned("Wasserstand / Wellenhöhe", "cm", &cm),
                ChartSpec::from_aligned("Wassertemperatur", "°C", &celsius),
                ChartSpec::no_data("Luftdruck (keine Daten)"),
            ],
        )
    }

    #[test]
    fn csv_is_one_table_across_panels() {
        let mut buf = Vec::new();
        write_view_csv(&mut buf, &view()).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(
            header,
            vec![
                "time",
                "Wasserstand [cm]",
                "Wellenhöhe [cm]",
                "Wassertemperatur [°C]"
            ]
        );

        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["2025-06-01T01:00:00+00:00", "-3.5", "", ""],
                vec!["2025-06-01T02:00:00+00:00", "", "12", "18.5"],
                vec!["2025-06-01T03:00:00+00:00", "", "", "19"],
            ]
        );
    }

    #[test]
    fn csv_without_data_is_header_only() {
        let mut view = view();
        view.panels = vec![ChartSpec::no_data("Schilksee (Keine Messdaten)")];
        let mut buf = Vec::new();
        write_view_csv(&mut buf, &view).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "time\n");
    }

    #[test]
    fn json_is_one_document_with_every_panel() {
        let mut buf = Vec::new();
        write_view_json(&mut buf, &view()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["title"], "Schilksee");
        assert_eq!(value["window"], "all");
        assert_eq!(value["panels"].as_array().unwrap().len(), 3);
        assert_eq!(value["panels"][0]["title"], "Wasserstand / Wellenhöhe");
        assert_eq!(value["panels"][0]["series"][0]["points"][1]["y"], serde_json::Value::Null);
        assert_eq!(value["panels"][1]["y_axis_title"], "°C");
        assert_eq!(value["panels"][2]["no_data"], true);
    }

    #[test]
    fn surface_is_cleared_on_dispose() {
        let mut slot = ChartSlot::new(JsonSurface::default());
        slot.show(&ChartSpec::no_data("a")).unwrap();
        assert_eq!(slot.renderer().drawn().unwrap()["title"], "a");
        slot.clear();
        assert!(slot.renderer().drawn().is_none());
    }

    #[test]
    fn latest_table_lists_rows() {
        let rows = vec![LatestValue {
            label: "Wellenhöhe".to_string(),
            unit: "cm".to_string(),
            value: Some(12.0),
            timestamp: Some(t(9)),
        }];
        let mut buf = Vec::new();
        write_latest_table(&mut buf, "Schilksee", &rows, &Utc).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Letzte Messwerte: Schilksee\n"));
        assert!(text.contains("12 cm"));
        assert!(text.contains("01.06.2025"));
        assert!(text.contains("09:00"));
    }

    #[test]
    fn battery_lines_flag_low_voltage() {
        let mut buf = Vec::new();
        write_battery(
            &mut buf,
            &[
                BatteryReading::new("Schilksee", Some(3.2), 3.5),
                BatteryReading::new("Badesteg Reventlou", None, 3.5),
            ],
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Schilksee: 3.20 V  LOW"));
        assert!(text.contains("Badesteg Reventlou: n/a\n"));
    }
}
