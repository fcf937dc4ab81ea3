use tempo_types::{RteConfig, TempoError};

use crate::fetcher::TempoDataFetcher;
use crate::session::CredentialSession;

/// Check a pair of application credentials against the default endpoints.
///
/// Performs exactly one token exchange and one unwindowed calendar request,
/// with no retry. The error's `reason_key()` is suitable for display.
///
/// # Errors
/// `Auth` for rejected credentials, `Network` for transport failures and
/// `Http` for a classified non-200 calendar answer.
pub async fn test_credentials(client_id: &str, client_secret: &str) -> Result<(), TempoError> {
    let config = RteConfig::default();
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| TempoError::network(e.to_string()))?;
    test_credentials_with(http, &config, client_id, client_secret).await
}

/// [`test_credentials`] against explicit endpoints and client.
///
/// # Errors
/// See [`test_credentials`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(target = "tempo::rte", skip(http, config, client_secret))
)]
pub async fn test_credentials_with(
    http: reqwest::Client,
    config: &RteConfig,
    client_id: &str,
    client_secret: &str,
) -> Result<(), TempoError> {
    let session = CredentialSession::authenticate(http.clone(), config, client_id, client_secret).await?;
    let fetcher = TempoDataFetcher::new(http, config, session);
    let result = fetcher.fetch_once(None).await.map(drop);
    #[cfg(feature = "tracing")]
    match &result {
        Ok(()) => tracing::info!(target: "tempo::rte", "credentials accepted"),
        Err(e) => tracing::warn!(target: "tempo::rte", reason = e.reason_key(), error = %e, "credential check failed"),
    }
    result
}
