use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tempo_core::{
    CalendarDays, CalendarSource, DateTempoDay, DayRecordStore, FetchWindow, TempoConfig,
    TempoError, TimeTempoDay, plan_next_wait,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backoff::jittered;

/// Source of the current instant.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct Shared {
    source: Arc<dyn CalendarSource>,
    config: TempoConfig,
    store: DayRecordStore,
    adjusted: AtomicBool,
    cancel: CancellationToken,
    stop_reason: Mutex<Option<String>>,
    clock: Clock,
}

impl Shared {
    fn now(&self) -> DateTime<Tz> {
        (self.clock)().with_timezone(&self.config.timezone)
    }

    fn stop_reason(&self) -> Option<String> {
        self.stop_reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Default)]
pub(crate) struct Lifecycle {
    pub(crate) started: bool,
    pub(crate) handle: Option<JoinHandle<()>>,
}

/// Keeps a local copy of the Tempo calendar in sync with a remote source.
///
/// One background task per worker is the only writer of the day store; the
/// `get_*` accessors can be called from anywhere and always see a complete
/// snapshot. Workers are one-shot: once stopped they cannot be restarted.
pub struct TempoWorker {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

impl std::fmt::Debug for TempoWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempoWorker")
            .field("source", &self.shared.source.name())
            .field("config", &self.shared.config)
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

/// Builder for [`TempoWorker`].
pub struct TempoWorkerBuilder {
    source: Option<Arc<dyn CalendarSource>>,
    config: TempoConfig,
    adjusted_days: bool,
    clock: Option<Clock>,
}

impl Default for TempoWorkerBuilder {
    fn default() -> Self {
        Self {
            source: None,
            config: TempoConfig::default(),
            adjusted_days: true,
            clock: None,
        }
    }
}

impl TempoWorkerBuilder {
    /// Remote calendar to poll. Required.
    #[must_use]
    pub fn source(mut self, source: Arc<dyn CalendarSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Timezone, schedule and window settings.
    #[must_use]
    pub fn config(mut self, config: TempoConfig) -> Self {
        self.config = config;
        self
    }

    /// Initial choice of collection returned by `get_calendar_days` (default: adjusted).
    #[must_use]
    pub const fn adjusted_days(mut self, adjusted: bool) -> Self {
        self.adjusted_days = adjusted;
        self
    }

    /// Replace the wall clock, e.g. to drive the scheduler from paused test time.
    #[must_use]
    pub fn clock<F>(mut self, now: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Some(Arc::new(now));
        self
    }

    /// Build the worker. Nothing runs until [`TempoWorker::start`].
    ///
    /// # Errors
    /// `InvalidConfig` if no source was set or the configuration is inconsistent.
    pub fn build(self) -> Result<TempoWorker, TempoError> {
        let source = self
            .source
            .ok_or_else(|| TempoError::invalid_config("a calendar source is required"))?;
        self.config.validate()?;
        let store = DayRecordStore::new(self.config.timezone, self.config.schedule.change_hour);
        let clock: Clock = match self.clock {
            Some(clock) => clock,
            None => Arc::new(Utc::now),
        };
        Ok(TempoWorker {
            shared: Arc::new(Shared {
                source,
                config: self.config,
                store,
                adjusted: AtomicBool::new(self.adjusted_days),
                cancel: CancellationToken::new(),
                stop_reason: Mutex::new(None),
                clock,
            }),
            lifecycle: Mutex::new(Lifecycle::default()),
        })
    }
}

impl TempoWorker {
    /// Start configuring a worker.
    #[must_use]
    pub fn builder() -> TempoWorkerBuilder {
        TempoWorkerBuilder::default()
    }

    /// Spawn the background task on the current tokio runtime.
    ///
    /// Returns `true` only if this call spawned it. Calling it again while
    /// running, after a stop, or outside a runtime does nothing.
    pub fn start(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        if self.shared.cancel.is_cancelled() {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "tempo::worker", source = self.shared.source.name(), "start ignored: worker was stopped");
            return false;
        }
        if lifecycle.started {
            return false;
        }
        let Ok(rt) = tokio::runtime::Handle::try_current() else {
            #[cfg(feature = "tracing")]
            tracing::error!(target: "tempo::worker", "start ignored: no tokio runtime");
            return false;
        };
        lifecycle.started = true;
        lifecycle.handle = Some(rt.spawn(run(Arc::clone(&self.shared))));
        #[cfg(feature = "tracing")]
        tracing::info!(target: "tempo::worker", source = self.shared.source.name(), "worker started");
        true
    }

    /// Ask the background task to stop and return immediately.
    ///
    /// A pending sleep or fetch is abandoned as soon as the task observes the
    /// request; no further request is sent. The first reason given is kept.
    pub fn signalstop(&self, reason: &str) {
        {
            let mut slot = self
                .shared
                .stop_reason
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if slot.is_none() {
                *slot = Some(reason.to_string());
            }
        }
        #[cfg(feature = "tracing")]
        if !self.shared.cancel.is_cancelled() {
            tracing::info!(target: "tempo::worker", reason, "stop requested");
        }
        self.shared.cancel.cancel();
    }

    /// Choose which collection `get_calendar_days` returns. No refetch happens.
    pub fn update_options(&self, adjusted_days: bool) {
        self.shared.adjusted.store(adjusted_days, Ordering::Release);
    }

    /// Days aligned on the change-hour.
    #[must_use]
    pub fn get_adjusted_days(&self) -> Arc<[TimeTempoDay]> {
        self.shared.store.get_adjusted()
    }

    /// Days aligned on midnight.
    #[must_use]
    pub fn get_regular_days(&self) -> Arc<[DateTempoDay]> {
        self.shared.store.get_regular()
    }

    /// The collection selected by the `adjusted_days` option.
    #[must_use]
    pub fn get_calendar_days(&self) -> CalendarDays {
        self.shared
            .store
            .get_selected(self.shared.adjusted.load(Ordering::Acquire))
    }

    /// Furthest change-hour aligned day end currently known.
    #[must_use]
    pub fn known_data_end(&self) -> Option<DateTime<Tz>> {
        self.shared.store.known_data_end()
    }

    /// When the store last accepted data.
    #[must_use]
    pub fn last_ingest(&self) -> Option<DateTime<Tz>> {
        self.shared.store.last_ingest()
    }

    /// Configuration the worker was built with.
    #[must_use]
    pub fn config(&self) -> &TempoConfig {
        &self.shared.config
    }

    /// Reason passed to the first `signalstop` call.
    #[must_use]
    pub fn stop_reason(&self) -> Option<String> {
        self.shared.stop_reason()
    }

    /// Returns true once `signalstop` has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Returns true while the background task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Wait for the background task to exit. Returns at once if it never started.
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
            tracing::error!(target: "tempo::worker", error = %_e, "worker task failed");
        }
    }
}

impl Drop for TempoWorker {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

fn window_for(shared: &Shared, now: &DateTime<Tz>, bootstrap: bool) -> FetchWindow {
    let w = &shared.config.window;
    if bootstrap && w.bootstrap_from_season_start {
        FetchWindow::season_to_date(now, w.days_after)
    } else {
        FetchWindow::around(now, w.days_before, w.days_after)
    }
}

async fn run(shared: Arc<Shared>) {
    let cancel = shared.cancel.clone();
    let mut bootstrap = true;

    loop {
        let now = shared.now();
        let window = window_for(&shared, &now, bootstrap);

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            res = shared.source.fetch_calendar(&window) => res,
        };
        match outcome {
            Ok(entries) => match shared.store.ingest(&entries, &window, shared.now()) {
                Some(_end) => {
                    bootstrap = false;
                    #[cfg(feature = "tracing")]
                    tracing::info!(
                        target: "tempo::worker",
                        entries = entries.len(),
                        known_data_end = %_end,
                        "calendar refreshed"
                    );
                }
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        target: "tempo::worker",
                        source = shared.source.name(),
                        entries = entries.len(),
                        "no usable calendar entry, keeping previous data"
                    );
                }
            },
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    target: "tempo::worker",
                    source = shared.source.name(),
                    reason = _e.reason_key(),
                    error = %_e,
                    "fetch failed, keeping previous data"
                );
            }
        }

        let now = shared.now();
        let decision = plan_next_wait(
            &now,
            shared.store.known_data_end().as_ref(),
            &shared.config.schedule,
        );
        let wait = jittered(decision.wait, shared.config.poll_jitter_percent);
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "tempo::worker", branch = ?decision.branch, wait_secs = wait.as_secs(), "sleeping");

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(wait) => {}
        }
    }

    #[cfg(feature = "tracing")]
    tracing::info!(target: "tempo::worker", reason = ?shared.stop_reason(), "worker stopped");
}
