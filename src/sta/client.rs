use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::sta::models::{Collection, Datastream, EntityId, RawObservation, Thing};
use crate::sta::source::{PageRequest, SensorSource};

pub struct StaClient {
    http_client: Client,
    base_url: String,
}

impl StaClient {
    /// Build a client for the configured FROST endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SourceUnavailable` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(config.sta_skip_tls_verify)
            .timeout(Duration::from_secs(config.sta_request_timeout_seconds))
            .build()
            .map_err(|e| AppError::SourceUnavailable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.sta_base_url.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        tracing::debug!(url = %url, "sta_request");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::SourceUnavailable(format!("Request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::SourceUnavailable("Rate limited (429)".to_string()));
        }

        if !response.status().is_success() {
            return Err(AppError::SourceUnavailable(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::SourceUnavailable(format!("Failed to get response text: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Failed to parse SensorThings response"
            );
            AppError::MalformedResponse(format!("Failed to parse response: {e}"))
        })
    }
}

impl SensorSource for StaClient {
    async fn things(&self) -> AppResult<Collection<Thing>> {
        let url = format!("{}/Things?$expand=Locations", self.base_url);
        self.get_json(&url).await
    }

    async fn datastreams(&self, thing: &EntityId) -> AppResult<Collection<Datastream>> {
        let url = format!(
            "{}/Things({})/Datastreams",
            self.base_url,
            thing.path_segment()
        );
        self.get_json(&url).await
    }

    async fn observations(&self, page: &PageRequest) -> AppResult<Collection<RawObservation>> {
        self.get_json(&self.page_url(page)).await
    }

    fn page_url(&self, page: &PageRequest) -> String {
        match page {
            PageRequest::First { datastream, query } => format!(
                "{}/Datastreams({})/Observations?{}",
                self.base_url,
                datastream.path_segment(),
                query.to_query_string()
            ),
            PageRequest::Next(link) => link.clone(),
        }
    }
}
