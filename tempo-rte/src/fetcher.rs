//! Authenticated calendar requests with a single refresh-and-retry on token expiry.

use std::time::Duration;

use tempo_core::{FetchWindow, RawTempoEntry, classify, parse_calendar_payload};
use tempo_types::{RteConfig, TempoError};

use crate::session::CredentialSession;
use crate::transport_error;

const UNAUTHORIZED: u16 = 401;

/// Issues GET requests against the calendar endpoint with a bearer token.
#[derive(Debug, Clone)]
pub struct TempoDataFetcher {
    http: reqwest::Client,
    calendar_url: String,
    timeout: Duration,
    session: CredentialSession,
}

impl TempoDataFetcher {
    /// Wrap an authenticated session.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &RteConfig, session: CredentialSession) -> Self {
        Self {
            http,
            calendar_url: config.calendar_url.clone(),
            timeout: config.request_timeout,
            session,
        }
    }

    /// Session used for the bearer token.
    #[must_use]
    pub const fn session(&self) -> &CredentialSession {
        &self.session
    }

    /// Fetch and decode the calendar entries covering `window`.
    ///
    /// If the token is expired (locally, or reported by a 401) it is refreshed
    /// once and the request retried once; a second failure is returned as is.
    ///
    /// # Errors
    /// `Auth` if the refresh is rejected, `Network` on transport failure,
    /// `Http` for any non-200 answer, `Parse` for an undecodable 200 body.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "tempo::rte",
            skip(self),
            fields(start = %window.start_date(), end = %window.end_date()),
        )
    )]
    pub async fn fetch(&mut self, window: &FetchWindow) -> Result<Vec<RawTempoEntry>, TempoError> {
        let body = self.fetch_body(Some(window)).await?;
        let entries = parse_calendar_payload(&body)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "tempo::rte", entries = entries.len(), "calendar fetched");
        Ok(entries)
    }

    /// Fetch the raw calendar body, applying the refresh-and-retry-once rule.
    ///
    /// Without a window the endpoint answers with its default range.
    ///
    /// # Errors
    /// See [`TempoDataFetcher::fetch`].
    pub async fn fetch_body(&mut self, window: Option<&FetchWindow>) -> Result<String, TempoError> {
        if !self.session.is_expired() {
            let (status, body) = self.send(window).await?;
            if status != UNAUTHORIZED {
                return accept(status, body);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(target: "tempo::rte", "token expired, refreshing once");
        self.session.refresh().await?;
        let (status, body) = self.send(window).await?;
        accept(status, body)
    }

    /// Send one request without any refresh or retry and classify its answer.
    ///
    /// # Errors
    /// See [`TempoDataFetcher::fetch`].
    pub async fn fetch_once(&self, window: Option<&FetchWindow>) -> Result<String, TempoError> {
        let (status, body) = self.send(window).await?;
        accept(status, body)
    }

    async fn send(&self, window: Option<&FetchWindow>) -> Result<(u16, String), TempoError> {
        let mut req = self
            .http
            .get(&self.calendar_url)
            .bearer_auth(self.session.bearer())
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout);
        if let Some(w) = window {
            req = req.query(&w.query_params());
        }
        let resp = req.send().await.map_err(transport_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(transport_error)?;
        Ok((status, body))
    }
}

fn accept(status: u16, body: String) -> Result<String, TempoError> {
    match classify(status, &body) {
        Ok(()) => Ok(body),
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "tempo::rte", status, error = %e, "calendar request failed");
            Err(e.into())
        }
    }
}
