//! Keep a worker running and print the calendar it holds.
//!
//! With `RTE_CLIENT_ID`/`RTE_CLIENT_SECRET` set, the RTE API is polled;
//! otherwise a scripted offline source stands in. With `TEMPO_FORECAST=1`
//! the community forecast is polled as well. Stop with Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Utc};
use tempo::{
    CalendarDays, CalendarSource, ForecastConfig, ForecastPoller, OpenDpeForecast, RteConnector,
    TempoColor, TempoWorker, WorkerRegistry,
};
use tempo_demos::{credentials_from_env, init_tracing};
use tempo_mock::MockCalendarSource;

fn offline_source() -> Arc<dyn CalendarSource> {
    let today = Utc::now().with_timezone(&chrono_tz::Europe::Paris).date_naive();
    let start = today.checked_sub_days(Days::new(30)).unwrap_or(today);
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    let days = start
        .iter_days()
        .take_while(|d| *d <= tomorrow)
        .enumerate()
        .map(|(i, d)| {
            let color = match i % 7 {
                0 => TempoColor::Red,
                3 | 4 => TempoColor::White,
                _ => TempoColor::Blue,
            };
            (d, color)
        });
    Arc::new(MockCalendarSource::serving(days).with_name("offline"))
}

fn print_days(days: &CalendarDays) {
    match days {
        CalendarDays::Adjusted(days) => {
            for d in days.iter().rev().take(3) {
                println!("{} -> {}: {}", d.start, d.end, d.value);
            }
        }
        CalendarDays::Regular(days) => {
            for d in days.iter().rev().take(3) {
                println!("{}: {}", d.start, d.value);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let source: Arc<dyn CalendarSource> = match credentials_from_env() {
        Some((id, secret)) => Arc::new(RteConnector::builder(id, secret).build()?),
        None => {
            tracing::info!("no RTE credentials in the environment, using the offline source");
            offline_source()
        }
    };

    let worker = Arc::new(TempoWorker::builder().source(source).build()?);
    let mut registry = WorkerRegistry::new();
    registry.insert("demo", Arc::clone(&worker));
    worker.start();

    let forecast_config = ForecastConfig {
        enabled: std::env::var("TEMPO_FORECAST").is_ok_and(|v| v == "1"),
        ..ForecastConfig::default()
    };
    let forecast = ForecastPoller::builder()
        .source(Arc::new(OpenDpeForecast::from_config(&forecast_config)?))
        .config(forecast_config)
        .build()?;
    forecast.start();

    let mut ticker = tokio::time::interval(Duration::from_secs(30));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let days = worker.get_calendar_days();
                let now = Utc::now().with_timezone(&worker.config().timezone);
                println!(
                    "{} days stored, current color: {:?}",
                    days.len(),
                    days.color_at(&now)
                );
                print_days(&days);
                for f in forecast.forecasts().iter().take(3) {
                    println!("forecast {}: {} ({:?})", f.date, f.color, f.probability);
                }
            }
        }
    }

    forecast.signalstop("interrupted");
    registry.shutdown("interrupted").await;
    forecast.join().await;
    Ok(())
}
