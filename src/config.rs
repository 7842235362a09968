use std::env;

/// Things shown on the dashboard when `STA_THING_ALLOWLIST` is unset.
pub const DEFAULT_THING_ALLOWLIST: &[&str] = &[
    "box_gmr_twl-box_0924005",
    "box_gmr_twl-box_0924002",
    "Badesteg Reventlou",
    "box_gmr_twl-box_0924004",
];

#[derive(Debug, Clone)]
pub struct Config {
    // SensorThings API
    pub sta_base_url: String,
    pub sta_request_timeout_seconds: u64,
    pub sta_skip_tls_verify: bool,

    // Station selection
    pub thing_allowlist: Vec<String>,
    pub privileged_things: Vec<String>,

    // Dashboard login
    pub admin_user: String,
    pub admin_password: String,

    // Battery overview
    pub battery_low_volts: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sta_base_url: "https://timeseries.geomar.de/soop/FROST-Server/v1.1".to_string(),
            sta_request_timeout_seconds: 60,
            sta_skip_tls_verify: false,
            thing_allowlist: DEFAULT_THING_ALLOWLIST
                .iter()
                .map(ToString::to_string)
                .collect(),
            privileged_things: Vec::new(),
            admin_user: "admin".to_string(),
            admin_password: "admin123".to_string(),
            battery_low_volts: 3.5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `STA_BASE_URL` is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let sta_base_url = match env::var("STA_BASE_URL") {
            Ok(url) if url.trim().is_empty() => {
                return Err(ConfigError::Invalid("STA_BASE_URL", url));
            }
            Ok(url) => url.trim().trim_end_matches('/').to_string(),
            Err(_) => defaults.sta_base_url,
        };

        Ok(Self {
            sta_base_url,
            sta_request_timeout_seconds: env::var("STA_REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sta_request_timeout_seconds),
            sta_skip_tls_verify: env::var("STA_SKIP_TLS_VERIFY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sta_skip_tls_verify),

            thing_allowlist: env::var("STA_THING_ALLOWLIST")
                .ok()
                .map(|s| split_list(&s))
                .unwrap_or(defaults.thing_allowlist),
            privileged_things: env::var("STA_PRIVILEGED_THINGS")
                .ok()
                .map(|s| split_list(&s))
                .unwrap_or(defaults.privileged_things),

            admin_user: env::var("DASHBOARD_ADMIN_USER").unwrap_or(defaults.admin_user),
            admin_password: env::var("DASHBOARD_ADMIN_PASSWORD")
                .unwrap_or(defaults.admin_password),

            battery_low_volts: env::var("BATTERY_LOW_VOLTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.battery_low_volts),
        })
    }
}

/// Split a comma-separated env value, dropping empty entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
