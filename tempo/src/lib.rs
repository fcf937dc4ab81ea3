//! Keeps the French Tempo electricity tariff calendar in sync in the background.
//!
//! Overview
//! - A [`TempoWorker`] polls a [`CalendarSource`] (normally the RTE connector)
//!   from one background task and keeps the days in a snapshot store that any
//!   thread can read.
//! - Days are exposed twice: aligned on midnight (`get_regular_days`) and
//!   aligned on the tariff change-hour (`get_adjusted_days`).
//! - The sleep between fetches adapts to what is already known: long once
//!   tomorrow's color is confirmed, short while its publication is pending.
//! - Fetch failures never end the loop; only [`TempoWorker::signalstop`] does,
//!   and it interrupts a pending sleep or fetch at once.
//! - An opt-in [`ForecastPoller`] polls a community forecast of the coming
//!   days every six hours; it is off unless `ForecastConfig::enabled` is set.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use tempo::{RteConnector, TempoWorker, WorkerRegistry};
//!
//! let source = Arc::new(RteConnector::builder(client_id, client_secret).build()?);
//! let worker = Arc::new(TempoWorker::builder().source(source).build()?);
//! worker.start();
//!
//! let mut registry = WorkerRegistry::new();
//! registry.insert("home", Arc::clone(&worker));
//! // ...
//! let today = worker.get_calendar_days().color_at(&now);
//! registry.shutdown("unload").await;
//! ```
#![warn(missing_docs)]

mod backoff;
mod forecast;
mod registry;
mod worker;

pub use forecast::{ForecastPoller, ForecastPollerBuilder};
pub use registry::WorkerRegistry;
pub use worker::{Clock, TempoWorker, TempoWorkerBuilder};

pub use tempo_core::{
    CalendarSource, DayRecordStore, FetchWindow, ForecastSource, RawTempoEntry, WaitBranch,
    WaitDecision, adjust_tempo_time, classify, compute_next_wait, parse_forecast_payload,
    plan_next_wait,
};
pub use tempo_rte::{
    CredentialSession, OpenDpeForecast, RteConnector, RteConnectorBuilder, TempoDataFetcher,
    test_credentials, test_credentials_with,
};
pub use tempo_types::{
    CalendarDays, DateTempoDay, FetchWindowConfig, ForecastConfig, ForecastDay, HttpError,
    RteConfig, SchedulePolicy, TempoColor, TempoConfig, TempoDay, TempoError, TimeTempoDay,
};
