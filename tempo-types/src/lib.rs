//! Tempo calendar data transfer objects, configuration and the error taxonomy.
#![warn(missing_docs)]

mod config;
mod day;
mod error;
mod forecast;

pub use config::{
    FetchWindowConfig, ForecastConfig, OPEN_DPE_FORECAST_URL, RTE_CALENDAR_URL, RTE_TOKEN_URL,
    RteConfig, SchedulePolicy, TempoConfig,
};
pub use day::{CalendarDays, DateTempoDay, TempoColor, TempoDay, TimeTempoDay};
pub use error::{HttpError, TempoError};
pub use forecast::{ForecastDay, normalize_forecast_color};
