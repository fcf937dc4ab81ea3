use chrono::TimeZone;
use chrono_tz::Europe::Paris;
use tempo_core::{CalendarSource, FetchWindow, RawTempoEntry, TempoError};

#[tokio::test]
async fn closure_source_sees_the_requested_window() {
    let source = <dyn CalendarSource>::from_fn(|window: &FetchWindow| {
        if window.start_date().format("%m-%d").to_string() == "09-01" {
            return Err(TempoError::network("season not available"));
        }
        Ok(vec![RawTempoEntry {
            start_date: window.start.to_rfc3339(),
            end_date: window.end.to_rfc3339(),
            value: Some("BLUE".into()),
            updated_date: None,
        }])
    });
    assert_eq!(source.name(), "fn-source");

    let now = Paris.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
    let entries = source
        .fetch_calendar(&FetchWindow::around(&now, 1, 1))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].start_date, "2025-01-14T00:00:00+01:00");

    let err = source
        .fetch_calendar(&FetchWindow::season_to_date(&now, 1))
        .await
        .unwrap_err();
    assert_eq!(err.reason_key(), "network_error");
}
