//! Client-credentials session against the token endpoint.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tempo_core::error_detail;
use tempo_types::{RteConfig, TempoError};
use tokio::time::Instant;

use crate::transport_error;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// A bearer token obtained through the OAuth2 client-credentials grant.
///
/// The session never retries on its own: a rejected exchange or a transport
/// failure is returned to the caller, which owns the retry policy.
#[derive(Clone)]
pub struct CredentialSession {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    leeway: Duration,
    access_token: String,
    expires_at: Option<Instant>,
}

impl fmt::Debug for CredentialSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSession")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl CredentialSession {
    /// Exchange `client_id`/`client_secret` for a bearer token.
    ///
    /// # Errors
    /// `Auth` if the token endpoint rejects the credentials or answers with an
    /// unusable body, `Network` on transport failure.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "tempo::rte", skip_all, fields(token_url = %config.token_url))
    )]
    pub async fn authenticate(
        http: reqwest::Client,
        config: &RteConfig,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, TempoError> {
        let mut session = Self {
            http,
            token_url: config.token_url.clone(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            leeway: config.expiry_leeway,
            access_token: String::new(),
            expires_at: None,
        };
        session.refresh().await?;
        Ok(session)
    }

    /// Re-run the token exchange, replacing the current token on success.
    ///
    /// On failure the previous token is kept untouched.
    ///
    /// # Errors
    /// Same as [`CredentialSession::authenticate`].
    pub async fn refresh(&mut self) -> Result<(), TempoError> {
        let resp = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(transport_error)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport_error)?;
        if !status.is_success() {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "tempo::rte", status = status.as_u16(), "token exchange rejected");
            return Err(TempoError::auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                error_detail(&body)
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| TempoError::auth(format!("invalid token response: {e}")))?;
        if token.access_token.is_empty() {
            return Err(TempoError::auth("token endpoint returned an empty access token"));
        }
        self.access_token = token.access_token;
        self.expires_at = token
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        #[cfg(feature = "tracing")]
        tracing::debug!(target: "tempo::rte", expires_in = ?token.expires_in, "access token acquired");
        Ok(())
    }

    /// Returns true if the token is past (or within the leeway of) its expiry.
    ///
    /// Tokens issued without `expires_in` never expire locally; the remote
    /// side reports them expired with a 401 instead.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| Instant::now() + self.leeway >= at)
    }

    /// Current bearer token.
    #[must_use]
    pub fn bearer(&self) -> &str {
        &self.access_token
    }

    /// Client id the session was opened with.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}
