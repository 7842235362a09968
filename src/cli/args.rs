use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "soop-dashboard")]
#[command(about = "Station dashboard for SOOP SensorThings data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Dashboard login name")]
    pub user: Option<String>,

    #[arg(long, global = true, help = "Dashboard password", requires = "user")]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List stations that can be shown on the map
    Stations,

    /// Map markers, center and bounds as JSON
    Map,

    /// Latest value of every visible measurement of a station
    Latest {
        #[arg(help = "Station id, raw name or display name")]
        station: String,
    },

    /// Chart panels for a station
    Chart {
        #[arg(help = "Station id, raw name or display name")]
        station: String,

        #[arg(short, long, default_value = "all", help = "Time range: 24h, 7d, 1y or all")]
        range: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Latest battery voltage of every station (login required)
    Battery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_defaults() {
        let cli = Cli::try_parse_from(["soop-dashboard", "chart", "Schilksee"]).unwrap();
        match cli.command {
            Commands::Chart {
                station,
                range,
                format,
            } => {
                assert_eq!(station, "Schilksee");
                assert_eq!(range, "all");
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected chart command"),
        }
    }

    #[test]
    fn password_requires_user() {
        assert!(Cli::try_parse_from(["soop-dashboard", "--password", "x", "stations"]).is_err());
        let cli = Cli::try_parse_from([
            "soop-dashboard",
            "battery",
            "--user",
            "admin",
            "--password",
            "admin123",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("admin"));
    }
}
