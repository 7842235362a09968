use chrono::Local;
use std::io::{self, Write};

use crate::catalog::{Station, find_station};
use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::cli::output::{
    write_battery, write_latest_table, write_stations, write_view_csv, write_view_json,
};
use crate::config::Config;
use crate::dashboard::{Dashboard, Region, map_view};
use crate::error::{AppError, AppResult};
use crate::observations::TimeWindow;
use crate::sta::{SensorSource, StaClient};

/// Run one command against the configured SensorThings endpoint.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the requested station
/// is unknown, or output cannot be written.
pub async fn run(cli: Cli) -> AppResult<()> {
    let config = Config::from_env()?;
    let client = StaClient::new(&config)?;

    tracing::info!(base_url = %client.base_url(), "Using SensorThings endpoint");

    let mut dashboard = Dashboard::new(client, config);

    if let Some(user) = cli.user.as_deref() {
        let password = cli.password.as_deref().unwrap_or_default();
        if !dashboard.login(user, password) {
            eprintln!("Anmeldung fehlgeschlagen, weiter ohne Anmeldung");
        }
    }

    execute(&dashboard, cli.command, io::stdout().lock()).await
}

/// Execute a command on an existing dashboard, writing to `out`.
///
/// # Errors
///
/// See [`run`].
pub async fn execute<S: SensorSource, W: Write>(
    dashboard: &Dashboard<S>,
    command: Commands,
    mut out: W,
) -> AppResult<()> {
    let stations = dashboard.stations().await;

    match command {
        Commands::Stations => write_stations(&mut out, &stations)?,
        Commands::Map => {
            serde_json::to_writer_pretty(&mut out, &map_view(&stations))?;
            writeln!(out)?;
        }
        Commands::Latest { station } => {
            let station = lookup(&stations, &station)?;
            if let Some(rows) = dashboard.latest_values(station, Region::LatestValues).await {
                write_latest_table(&mut out, &station.display_name, &rows, &Local)?;
            }
        }
        Commands::Chart {
            station,
            range,
            format,
        } => {
            let station = lookup(&stations, &station)?;
            let window = TimeWindow::parse(&range);
            let Some(view) = dashboard.station_view(station, window).await else {
                return Ok(());
            };

            match format {
                OutputFormat::Json => write_view_json(&mut out, &view)?,
                OutputFormat::Csv => write_view_csv(&mut out, &view)?,
            }
        }
        Commands::Battery => {
            if let Some(readings) = dashboard.battery_overview(&stations).await? {
                write_battery(&mut out, &readings)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn lookup<'a>(stations: &'a [Station], id_or_name: &str) -> AppResult<&'a Station> {
    if id_or_name.trim().is_empty() {
        return Err(AppError::BadRequest("station must not be empty".to_string()));
    }
    find_station(stations, id_or_name)
        .ok_or_else(|| AppError::NotFound(format!("Station '{id_or_name}' not found")))
}
