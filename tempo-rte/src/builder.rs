use std::time::Duration;

use tempo_types::{RteConfig, TempoError};
use tokio::sync::Mutex;

use crate::RteConnector;

/// Builder for [`RteConnector`].
#[derive(Debug, Clone)]
pub struct RteConnectorBuilder {
    client_id: String,
    client_secret: String,
    config: RteConfig,
    http: Option<reqwest::Client>,
}

impl RteConnectorBuilder {
    pub(crate) fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            config: RteConfig::default(),
            http: None,
        }
    }

    /// Replace the whole endpoint configuration.
    #[must_use]
    pub fn config(mut self, config: RteConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the token endpoint.
    #[must_use]
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.config.token_url = url.into();
        self
    }

    /// Override the calendar endpoint.
    #[must_use]
    pub fn calendar_url(mut self, url: impl Into<String>) -> Self {
        self.config.calendar_url = url.into();
        self
    }

    /// Timeout applied to every request.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Share an existing HTTP client instead of building one.
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the connector.
    ///
    /// # Errors
    /// `InvalidConfig` if an endpoint is not an absolute URL, credentials are
    /// empty, or the HTTP client cannot be created.
    pub fn build(self) -> Result<RteConnector, TempoError> {
        if self.client_id.trim().is_empty() || self.client_secret.trim().is_empty() {
            return Err(TempoError::invalid_config("client id and secret are required"));
        }
        for (name, raw) in [
            ("token_url", &self.config.token_url),
            ("calendar_url", &self.config.calendar_url),
        ] {
            url::Url::parse(raw)
                .map_err(|e| TempoError::invalid_config(format!("{name} '{raw}': {e}")))?;
        }
        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .timeout(self.config.request_timeout)
                .build()
                .map_err(|e| TempoError::invalid_config(format!("http client: {e}")))?,
        };
        Ok(RteConnector {
            http,
            config: self.config,
            client_id: self.client_id,
            client_secret: self.client_secret,
            fetcher: Mutex::new(None),
        })
    }
}
