//! Configuration types shared across the worker and connectors.

use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::TempoError;

/// Production token endpoint of the RTE data portal.
pub const RTE_TOKEN_URL: &str = "https://digital.iservices.rte-france.com/token/oauth/";

/// Production Tempo calendar endpoint of the RTE data portal.
pub const RTE_CALENDAR_URL: &str =
    "https://digital.iservices.rte-france.com/open_api/tempo_like_supply_contract/v1/tempo_like_calendars";

/// Default forecast feed (Open DPE community forecast).
pub const OPEN_DPE_FORECAST_URL: &str = "https://open-dpe.fr/assets/tempo_days_lite.json";

/// Timing rules used to decide how long the worker sleeps between fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePolicy {
    /// Hour of day at which the tariff day changes (local time).
    pub change_hour: u32,
    /// Hour by which tomorrow's color is expected to be published.
    pub confirm_hour: u32,
    /// Minute paired with `confirm_hour`.
    pub confirm_minute: u32,
    /// Wait used while no data has ever been fetched.
    pub bootstrap_wait: Duration,
    /// Wait used once publication of tomorrow's color may happen at any moment.
    pub retry_wait: Duration,
    /// Wait used when the known horizon is not one of the expected shapes.
    pub fallback_wait: Duration,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            change_hour: 6,
            confirm_hour: 11,
            confirm_minute: 30,
            bootstrap_wait: Duration::from_secs(10 * 60),
            retry_wait: Duration::from_secs(30 * 60),
            fallback_wait: Duration::from_secs(60 * 60),
        }
    }
}

/// Shape of the window requested on each fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindowConfig {
    /// Days before today included in the window.
    pub days_before: u32,
    /// Days after today included in the window (1 covers tomorrow).
    pub days_after: u32,
    /// Cover the whole current season on the first fetch of a worker.
    pub bootstrap_from_season_start: bool,
}

impl Default for FetchWindowConfig {
    fn default() -> Self {
        Self {
            days_before: 1,
            days_after: 1,
            bootstrap_from_season_start: true,
        }
    }
}

/// Global configuration of a Tempo worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoConfig {
    /// Timezone in which civil dates and the change-hour are evaluated.
    pub timezone: Tz,
    /// Sleep scheduling rules.
    pub schedule: SchedulePolicy,
    /// Fetch window shape.
    pub window: FetchWindowConfig,
    /// Random extension of each sleep, in percent of the computed wait [0, 100].
    pub poll_jitter_percent: u8,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Paris,
            schedule: SchedulePolicy::default(),
            window: FetchWindowConfig::default(),
            poll_jitter_percent: 0,
        }
    }
}

impl TempoConfig {
    /// Check hours, minutes and waits for consistency.
    ///
    /// # Errors
    /// Returns `InvalidConfig` describing the first rejected field.
    pub fn validate(&self) -> Result<(), TempoError> {
        let s = &self.schedule;
        if s.change_hour >= 24 {
            return Err(TempoError::invalid_config(format!(
                "change_hour must be < 24, got {}",
                s.change_hour
            )));
        }
        if s.confirm_hour >= 24 || s.confirm_minute >= 60 {
            return Err(TempoError::invalid_config(format!(
                "invalid confirmation time {:02}:{:02}",
                s.confirm_hour, s.confirm_minute
            )));
        }
        if s.confirm_hour < s.change_hour {
            return Err(TempoError::invalid_config(
                "confirmation time must not precede the change-hour",
            ));
        }
        if s.bootstrap_wait.is_zero() || s.retry_wait.is_zero() || s.fallback_wait.is_zero() {
            return Err(TempoError::invalid_config("waits must be strictly positive"));
        }
        if self.poll_jitter_percent > 100 {
            return Err(TempoError::invalid_config(
                "poll_jitter_percent must be within [0, 100]",
            ));
        }
        Ok(())
    }
}

/// Endpoints and HTTP behavior of the RTE connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RteConfig {
    /// Client-credentials token endpoint.
    pub token_url: String,
    /// Tempo calendar endpoint.
    pub calendar_url: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
    /// A token is treated as expired this long before its advertised expiry.
    pub expiry_leeway: Duration,
}

impl Default for RteConfig {
    fn default() -> Self {
        Self {
            token_url: RTE_TOKEN_URL.to_string(),
            calendar_url: RTE_CALENDAR_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            expiry_leeway: Duration::from_secs(30),
        }
    }
}

/// Optional polling of a community forecast for the coming days.
///
/// Disabled unless `enabled` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Opt-in switch.
    pub enabled: bool,
    /// Forecast feed returning a JSON array of days.
    pub url: String,
    /// Delay between two polls.
    pub refresh_interval: Duration,
    /// Timeout applied to each request.
    pub request_timeout: Duration,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: OPEN_DPE_FORECAST_URL.to_string(),
            refresh_interval: Duration::from_secs(6 * 60 * 60),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ForecastConfig {
    /// Check the URL and intervals.
    ///
    /// # Errors
    /// Returns `InvalidConfig` describing the first rejected field.
    pub fn validate(&self) -> Result<(), TempoError> {
        if self.url.trim().is_empty() {
            return Err(TempoError::invalid_config("forecast url must not be empty"));
        }
        if self.refresh_interval.is_zero() || self.request_timeout.is_zero() {
            return Err(TempoError::invalid_config(
                "forecast refresh_interval and request_timeout must be strictly positive",
            ));
        }
        Ok(())
    }
}
