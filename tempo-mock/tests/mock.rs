use std::time::Duration;

use chrono::{NaiveDate, TimeZone};
use chrono_tz::Europe::Paris;
use tempo_core::{CalendarSource, FetchWindow, TempoColor, TempoError};
use tempo_mock::{MockBehavior, MockCalendarSource, fixtures};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn window(d: u32) -> FetchWindow {
    FetchWindow::around(&Paris.with_ymd_and_hms(2025, 1, d, 12, 0, 0).unwrap(), 1, 1)
}

#[tokio::test]
async fn script_plays_in_order_and_repeats_last() {
    let source = MockCalendarSource::new([
        MockBehavior::Fail(TempoError::network("down")),
        MockBehavior::Return(vec![fixtures::entry(&Paris, date(15), TempoColor::Red)]),
    ]);

    assert!(source.fetch_calendar(&window(15)).await.is_err());
    assert_eq!(source.fetch_calendar(&window(15)).await.unwrap().len(), 1);
    assert_eq!(source.fetch_calendar(&window(16)).await.unwrap().len(), 1);
    assert_eq!(source.calls(), 3);
    assert_eq!(source.windows()[2], window(16));
}

#[tokio::test]
async fn calendar_behavior_filters_by_window() {
    let source = MockCalendarSource::serving((10..=20).map(|d| (date(d), TempoColor::Blue)));
    let entries = source.fetch_calendar(&window(15)).await.unwrap();
    let starts: Vec<_> = entries.iter().map(|e| e.start_date.as_str()).collect();
    assert_eq!(
        starts,
        [
            "2025-01-14T00:00:00+01:00",
            "2025-01-15T00:00:00+01:00",
            "2025-01-16T00:00:00+01:00",
        ]
    );
    assert_eq!(entries[0].updated_date.as_deref(), Some("2025-01-13T10:20:00+01:00"));
}

#[tokio::test(start_paused = true)]
async fn hang_never_completes() {
    let source = MockCalendarSource::new([MockBehavior::Hang]);
    let res = tokio::time::timeout(Duration::from_secs(3600), source.fetch_calendar(&window(15))).await;
    assert!(res.is_err());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn empty_script_fails() {
    let source = MockCalendarSource::new([]).with_name("empty");
    assert_eq!(source.name(), "empty");
    assert!(matches!(source.fetch_calendar(&window(15)).await, Err(TempoError::Network(_))));
}

#[test]
fn window_entries_cover_every_day() {
    let entries = fixtures::window_entries(&window(15), TempoColor::White);
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.value.as_deref() == Some("WHITE")));
    assert_eq!(fixtures::missing_color(&Paris, date(15)).value, None);
}
