#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Europe::Paris;
use tempo::{TempoColor, TempoWorker};
use tempo_mock::{MockBehavior, MockCalendarSource};

/// Clock that follows tokio's (paused) time from `start`.
pub fn paused_clock(start: DateTime<Utc>) -> impl Fn() -> DateTime<Utc> + Send + Sync + 'static {
    let origin = tokio::time::Instant::now();
    move || start + chrono::Duration::from_std(origin.elapsed()).unwrap()
}

pub fn paris(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Paris.with_ymd_and_hms(y, m, d, h, min, 0).unwrap().with_timezone(&Utc)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Blue days from 2024-09-01 through `last`, with `last` red.
pub fn season_through(last: NaiveDate) -> Vec<(NaiveDate, TempoColor)> {
    date(2024, 9, 1)
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|d| (d, if d == last { TempoColor::Red } else { TempoColor::Blue }))
        .collect()
}

pub fn serving_season(last: NaiveDate) -> Arc<MockCalendarSource> {
    Arc::new(MockCalendarSource::new([MockBehavior::Calendar(
        season_through(last).into_iter().collect(),
    )]))
}

pub fn worker_at(source: Arc<MockCalendarSource>, start: DateTime<Utc>) -> TempoWorker {
    TempoWorker::builder()
        .source(source)
        .clock(paused_clock(start))
        .build()
        .expect("valid worker")
}

/// Let the runtime run every task that is ready.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
}
