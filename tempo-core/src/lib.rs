//! tempo-core
//!
//! Core logic shared across the tempo workspace.
//!
//! - `classify`: maps non-200 HTTP responses to typed failures.
//! - `store`: the day record store and its two day-boundary projections.
//! - `scheduler`: the adaptive wait computation between fetches.
//! - `time`: change-hour shifting, timestamp parsing and fetch windows.
//! - `source`: the `CalendarSource` and `ForecastSource` traits implemented by connectors.
//! - `forecast`: decoding of the community forecast feed.
//!
//! Nothing in this crate performs I/O; connectors live in `tempo-rte` and the
//! background worker in `tempo`.
#![warn(missing_docs)]

/// HTTP status classification.
pub mod classify;
/// Forecast feed decoding.
pub mod forecast;
/// Adaptive wait computation.
pub mod scheduler;
/// Calendar source trait implemented by connectors.
pub mod source;
/// Day record store.
pub mod store;
/// Calendar arithmetic helpers.
pub mod time;

pub use classify::{classify, error_detail};
pub use scheduler::{WaitBranch, WaitDecision, compute_next_wait, plan_next_wait};
pub use forecast::parse_forecast_payload;
pub use source::{CalendarSource, ForecastSource};
pub use store::{DayRecordStore, MISSING_COLOR_REPAIR_DATE, RawTempoEntry, parse_calendar_payload};
pub use time::{
    FetchWindow, MAX_WINDOW_DAYS, adjust_tempo_time, local_at, local_midnight, parse_api_date,
    parse_api_datetime, season_start,
};

pub use tempo_types::*;
