//! tempo-rte
//!
//! Connector for the RTE Tempo calendar API. Implements `CalendarSource` on
//! top of a client-credentials session and an authenticated fetcher, and
//! exposes the stateless credential check used at configuration time.
//! Also hosts the credential-free client of the community forecast feed.
#![warn(missing_docs)]

/// Connector builder.
pub mod builder;
/// Authenticated calendar requests.
pub mod fetcher;
/// Community forecast feed.
pub mod forecast;
/// Client-credentials token session.
pub mod session;
/// Configuration-time credential check.
pub mod tester;

use async_trait::async_trait;
use tempo_core::{CalendarSource, FetchWindow, RawTempoEntry};
use tempo_types::{RteConfig, TempoError};
use tokio::sync::Mutex;

pub use builder::RteConnectorBuilder;
pub use fetcher::TempoDataFetcher;
pub use forecast::OpenDpeForecast;
pub use session::CredentialSession;
pub use tester::{test_credentials, test_credentials_with};

pub(crate) fn transport_error(e: reqwest::Error) -> TempoError {
    if e.is_decode() {
        TempoError::parse(e.to_string())
    } else {
        TempoError::network(e.to_string())
    }
}

/// `CalendarSource` backed by the RTE Tempo calendar endpoint.
///
/// The token session is opened lazily on the first fetch and reused after
/// that; a failed opening is retried on the next fetch.
pub struct RteConnector {
    http: reqwest::Client,
    config: RteConfig,
    client_id: String,
    client_secret: String,
    fetcher: Mutex<Option<TempoDataFetcher>>,
}

impl std::fmt::Debug for RteConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RteConnector")
            .field("config", &self.config)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl RteConnector {
    /// Start building a connector for the given application credentials.
    #[must_use]
    pub fn builder(client_id: impl Into<String>, client_secret: impl Into<String>) -> RteConnectorBuilder {
        RteConnectorBuilder::new(client_id.into(), client_secret.into())
    }

    /// Endpoints and timeouts in use.
    #[must_use]
    pub const fn config(&self) -> &RteConfig {
        &self.config
    }

    /// Check the connector's own credentials with one token exchange and one request.
    ///
    /// # Errors
    /// See [`test_credentials_with`].
    pub async fn test_credentials(&self) -> Result<(), TempoError> {
        test_credentials_with(
            self.http.clone(),
            &self.config,
            &self.client_id,
            &self.client_secret,
        )
        .await
    }
}

#[async_trait]
impl CalendarSource for RteConnector {
    fn name(&self) -> &'static str {
        "tempo-rte"
    }

    async fn fetch_calendar(&self, window: &FetchWindow) -> Result<Vec<RawTempoEntry>, TempoError> {
        let mut guard = self.fetcher.lock().await;
        let fetcher = match guard.take() {
            Some(f) => f,
            None => {
                let session = CredentialSession::authenticate(
                    self.http.clone(),
                    &self.config,
                    self.client_id.clone(),
                    self.client_secret.clone(),
                )
                .await?;
                TempoDataFetcher::new(self.http.clone(), &self.config, session)
            }
        };
        let fetcher = guard.insert(fetcher);
        fetcher.fetch(window).await
    }
}
