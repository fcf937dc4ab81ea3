use std::sync::Arc;

use async_trait::async_trait;
use tempo_types::{ForecastDay, TempoError};

use crate::store::RawTempoEntry;
use crate::time::FetchWindow;

/// A remote Tempo calendar the worker can poll.
///
/// Implementations must be fail-soft: every transport, authentication, HTTP
/// or decoding problem is returned as a `TempoError`, never as a panic.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the raw calendar entries covering `window`.
    async fn fetch_calendar(&self, window: &FetchWindow)
    -> Result<Vec<RawTempoEntry>, TempoError>;
}

impl dyn CalendarSource {
    /// Build a `CalendarSource` from a closure.
    pub fn from_fn<F>(f: F) -> Arc<dyn CalendarSource>
    where
        F: Send + Sync + 'static + Fn(&FetchWindow) -> Result<Vec<RawTempoEntry>, TempoError>,
    {
        struct FnSource<F>(F);

        #[async_trait]
        impl<F> CalendarSource for FnSource<F>
        where
            F: Send + Sync + 'static + Fn(&FetchWindow) -> Result<Vec<RawTempoEntry>, TempoError>,
        {
            fn name(&self) -> &'static str {
                "fn-source"
            }

            async fn fetch_calendar(
                &self,
                window: &FetchWindow,
            ) -> Result<Vec<RawTempoEntry>, TempoError> {
                (self.0)(window)
            }
        }

        Arc::new(FnSource(f))
    }
}

/// A forecast feed for the coming days.
///
/// Unlike [`CalendarSource`] it never reports failures: any problem yields
/// an empty list, which callers treat as "no new forecast".
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the current forecast.
    async fn fetch_forecast(&self) -> Vec<ForecastDay>;
}

impl dyn ForecastSource {
    /// Build a `ForecastSource` from a closure.
    pub fn from_fn<F>(f: F) -> Arc<dyn ForecastSource>
    where
        F: Send + Sync + 'static + Fn() -> Vec<ForecastDay>,
    {
        struct FnForecast<F>(F);

        #[async_trait]
        impl<F> ForecastSource for FnForecast<F>
        where
            F: Send + Sync + 'static + Fn() -> Vec<ForecastDay>,
        {
            fn name(&self) -> &'static str {
                "fn-forecast"
            }

            async fn fetch_forecast(&self) -> Vec<ForecastDay> {
                (self.0)()
            }
        }

        Arc::new(FnForecast(f))
    }
}
