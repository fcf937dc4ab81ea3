//! Fail-soft client for the community forecast feed.

use std::time::Duration;

use async_trait::async_trait;
use tempo_core::{ForecastSource, classify, parse_forecast_payload};
use tempo_types::{ForecastConfig, ForecastDay, TempoError};

use crate::transport_error;

/// `ForecastSource` backed by an HTTP JSON feed (Open DPE by default).
///
/// No credentials are needed. Every failure is logged and reported as an
/// empty forecast.
#[derive(Debug, Clone)]
pub struct OpenDpeForecast {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl OpenDpeForecast {
    /// Client for the feed described by `config`.
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration is inconsistent or the URL does not parse.
    pub fn new(http: reqwest::Client, config: &ForecastConfig) -> Result<Self, TempoError> {
        config.validate()?;
        url::Url::parse(&config.url)
            .map_err(|e| TempoError::invalid_config(format!("invalid forecast url: {e}")))?;
        Ok(Self {
            http,
            url: config.url.clone(),
            timeout: config.request_timeout,
        })
    }

    /// Client for `config` with its own HTTP client.
    ///
    /// # Errors
    /// As [`OpenDpeForecast::new`], or `InvalidConfig` if the HTTP client cannot be built.
    pub fn from_config(config: &ForecastConfig) -> Result<Self, TempoError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TempoError::invalid_config(format!("http client: {e}")))?;
        Self::new(http, config)
    }

    /// Fetch and decode the feed, reporting what went wrong.
    ///
    /// # Errors
    /// `Network` on transport failure or timeout, `Http` for any non-200
    /// answer, `Parse` if the body is not a JSON array.
    pub async fn try_fetch(&self) -> Result<Vec<ForecastDay>, TempoError> {
        let resp = self
            .http
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(transport_error)?;
        classify(status, &body)?;
        parse_forecast_payload(&body)
    }
}

#[async_trait]
impl ForecastSource for OpenDpeForecast {
    fn name(&self) -> &'static str {
        "open-dpe"
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(target = "tempo::forecast", skip(self), fields(url = %self.url)))]
    async fn fetch_forecast(&self) -> Vec<ForecastDay> {
        match self.try_fetch().await {
            Ok(days) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "tempo::forecast", days = days.len(), "forecast fetched");
                days
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(target: "tempo::forecast", reason = _e.reason_key(), error = %_e, "forecast unavailable");
                Vec::new()
            }
        }
    }
}
