use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, NaiveDate, Utc};
use tempo_core::{ForecastConfig, ForecastDay, ForecastSource, TempoError};
use tokio_util::sync::CancellationToken;

use crate::worker::{Clock, Lifecycle};

struct Published {
    days: Arc<[ForecastDay]>,
    refreshed_at: DateTime<Utc>,
}

struct Shared {
    source: Arc<dyn ForecastSource>,
    config: ForecastConfig,
    latest: RwLock<Option<Arc<Published>>>,
    cancel: CancellationToken,
    clock: Clock,
}

impl Shared {
    fn latest(&self) -> Option<Arc<Published>> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Polls a [`ForecastSource`] on a fixed interval (six hours by default).
///
/// The feature is opt-in: unless [`ForecastConfig::enabled`] is set,
/// [`ForecastPoller::start`] does nothing and the forecast stays empty.
/// An empty answer never replaces a forecast already published.
pub struct ForecastPoller {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

impl std::fmt::Debug for ForecastPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastPoller")
            .field("source", &self.shared.source.name())
            .field("config", &self.shared.config)
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ForecastPoller`].
#[derive(Default)]
pub struct ForecastPollerBuilder {
    source: Option<Arc<dyn ForecastSource>>,
    config: ForecastConfig,
    clock: Option<Clock>,
}

impl ForecastPollerBuilder {
    /// Forecast feed to poll. Required.
    #[must_use]
    pub fn source(mut self, source: Arc<dyn ForecastSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Opt-in flag and refresh interval.
    #[must_use]
    pub fn config(mut self, config: ForecastConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the wall clock used to stamp refreshes.
    #[must_use]
    pub fn clock<F>(mut self, now: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Some(Arc::new(now));
        self
    }

    /// Build the poller. Nothing runs until [`ForecastPoller::start`].
    ///
    /// # Errors
    /// `InvalidConfig` if no source was set or the configuration is inconsistent.
    pub fn build(self) -> Result<ForecastPoller, TempoError> {
        let source = self
            .source
            .ok_or_else(|| TempoError::invalid_config("a forecast source is required"))?;
        self.config.validate()?;
        let clock: Clock = match self.clock {
            Some(clock) => clock,
            None => Arc::new(Utc::now),
        };
        Ok(ForecastPoller {
            shared: Arc::new(Shared {
                source,
                config: self.config,
                latest: RwLock::new(None),
                cancel: CancellationToken::new(),
                clock,
            }),
            lifecycle: Mutex::new(Lifecycle::default()),
        })
    }
}

impl ForecastPoller {
    /// Start configuring a poller.
    #[must_use]
    pub fn builder() -> ForecastPollerBuilder {
        ForecastPollerBuilder::default()
    }

    /// Spawn the polling task on the current tokio runtime.
    ///
    /// Returns `true` only if this call spawned it. Does nothing when the
    /// forecast is disabled, already started, stopped, or outside a runtime.
    pub fn start(&self) -> bool {
        if !self.shared.config.enabled {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "tempo::forecast", "forecast disabled, not polling");
            return false;
        }
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        if self.shared.cancel.is_cancelled() || lifecycle.started {
            return false;
        }
        let Ok(rt) = tokio::runtime::Handle::try_current() else {
            #[cfg(feature = "tracing")]
            tracing::error!(target: "tempo::forecast", "start ignored: no tokio runtime");
            return false;
        };
        lifecycle.started = true;
        lifecycle.handle = Some(rt.spawn(run(Arc::clone(&self.shared))));
        #[cfg(feature = "tracing")]
        tracing::info!(
            target: "tempo::forecast",
            source = self.shared.source.name(),
            interval_secs = self.shared.config.refresh_interval.as_secs(),
            "forecast poller started"
        );
        true
    }

    /// Ask the polling task to stop and return immediately.
    pub fn signalstop(&self, _reason: &str) {
        #[cfg(feature = "tracing")]
        if !self.shared.cancel.is_cancelled() {
            tracing::info!(target: "tempo::forecast", reason = _reason, "forecast stop requested");
        }
        self.shared.cancel.cancel();
    }

    /// Latest published forecast, empty until the first non-empty answer.
    #[must_use]
    pub fn forecasts(&self) -> Arc<[ForecastDay]> {
        self.shared
            .latest()
            .map_or_else(|| Arc::from(Vec::new()), |p| Arc::clone(&p.days))
    }

    /// Forecast for one civil date, if published.
    #[must_use]
    pub fn forecast_for(&self, date: NaiveDate) -> Option<ForecastDay> {
        self.forecasts().iter().find(|d| d.date == date).cloned()
    }

    /// When the published forecast was fetched.
    #[must_use]
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.shared.latest().map(|p| p.refreshed_at)
    }

    /// Returns true if the configuration opts in to polling.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.shared.config.enabled
    }

    /// Returns true once `signalstop` has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Returns true while the polling task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Wait for the polling task to exit. Returns at once if it never started.
    pub async fn join(&self) {
        let handle = self
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle
            .take();
        if let Some(handle) = handle
            && let Err(_e) = handle.await
        {
            #[cfg(feature = "tracing")]
            tracing::error!(target: "tempo::forecast", error = %_e, "forecast task failed");
        }
    }
}

impl Drop for ForecastPoller {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

async fn run(shared: Arc<Shared>) {
    let cancel = shared.cancel.clone();

    loop {
        let days = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            days = shared.source.fetch_forecast() => days,
        };
        if days.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "tempo::forecast", "empty forecast, keeping previous one");
        } else {
            #[cfg(feature = "tracing")]
            tracing::info!(target: "tempo::forecast", days = days.len(), "forecast refreshed");
            let published = Published {
                days: Arc::from(days),
                refreshed_at: (shared.clock)(),
            };
            *shared.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(published));
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(shared.config.refresh_interval) => {}
        }
    }

    #[cfg(feature = "tracing")]
    tracing::info!(target: "tempo::forecast", "forecast poller stopped");
}
