use std::time::Duration;

use chrono::{DateTime, TimeZone};
use chrono_tz::{Europe::Paris, Tz};
use proptest::prelude::*;
use tempo_core::{SchedulePolicy, WaitBranch, compute_next_wait, plan_next_wait};

fn paris(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
    Paris.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn policy() -> SchedulePolicy {
    SchedulePolicy::default()
}

#[test]
fn no_data_waits_ten_minutes() {
    let now = paris(2025, 1, 15, 10, 0);
    let d = plan_next_wait(&now, None, &policy());
    assert_eq!(d.branch, WaitBranch::Bootstrap);
    assert_eq!(d.wait, Duration::from_secs(600));
}

#[test]
fn tomorrow_known_after_confirmation_sleeps_until_next_change_hour() {
    let now = paris(2025, 1, 15, 11, 30);
    let end = paris(2025, 1, 17, 6, 0);
    let d = plan_next_wait(&now, Some(&end), &policy());
    assert_eq!(d.branch, WaitBranch::NextChange);
    assert_eq!(d.wait, Duration::from_secs(18 * 3600 + 30 * 60));
}

#[test]
fn tomorrow_known_before_confirmation_sleeps_until_confirmation() {
    let now = paris(2025, 1, 15, 9, 0);
    let end = paris(2025, 1, 17, 0, 0);
    let d = plan_next_wait(&now, Some(&end), &policy());
    assert_eq!(d.branch, WaitBranch::UntilConfirmation);
    assert_eq!(d.wait, Duration::from_secs(2 * 3600 + 30 * 60));

    let now = paris(2025, 1, 15, 11, 0);
    let d = plan_next_wait(&now, Some(&end), &policy());
    assert_eq!(d.branch, WaitBranch::UntilConfirmation);
    assert!(d.wait < Duration::from_secs(3600));
}

#[test]
fn tomorrow_unknown_before_change_hour_sleeps_until_change_hour() {
    let now = paris(2025, 1, 15, 5, 0);
    let end = paris(2025, 1, 16, 0, 0);
    let d = plan_next_wait(&now, Some(&end), &policy());
    assert_eq!(d.branch, WaitBranch::UntilChangeHour);
    assert_eq!(d.wait, Duration::from_secs(3600));
    assert!(d.wait < Duration::from_secs(2 * 3600));
}

#[test]
fn tomorrow_unknown_after_change_hour_retries_soon() {
    let now = paris(2025, 1, 15, 10, 0);
    let end = paris(2025, 1, 16, 0, 0);
    let d = plan_next_wait(&now, Some(&end), &policy());
    assert_eq!(d.branch, WaitBranch::Retry);
    assert_eq!(d.wait, Duration::from_secs(30 * 60));
    assert!(d.wait < Duration::from_secs(3600));
}

#[test]
fn unexpected_horizon_falls_back() {
    let end = paris(2025, 1, 18, 0, 0);
    for hour in [0, 5, 10, 12, 23] {
        let now = paris(2025, 1, 15, hour, 0);
        let d = plan_next_wait(&now, Some(&end), &policy());
        assert_eq!(d.branch, WaitBranch::Fallback);
        assert!(d.wait > Duration::ZERO && d.wait < Duration::from_secs(2 * 3600));
    }
    let stale = paris(2025, 1, 10, 6, 0);
    let d = plan_next_wait(&paris(2025, 1, 15, 12, 0), Some(&stale), &policy());
    assert_eq!(d.branch, WaitBranch::Fallback);
}

#[test]
fn horizon_in_another_offset_is_compared_by_local_date() {
    let now = paris(2025, 1, 15, 12, 0);
    let end_utc = chrono::Utc.with_ymd_and_hms(2025, 1, 16, 23, 0, 0).unwrap();
    let end = end_utc.with_timezone(&Paris);
    assert_eq!(
        plan_next_wait(&now, Some(&end), &policy()).branch,
        WaitBranch::NextChange
    );
}

#[test]
fn next_change_respects_daylight_saving() {
    // Clocks go forward in Paris on 2025-03-30, so the night is an hour short.
    let now = paris(2025, 3, 29, 12, 0);
    let end = paris(2025, 3, 31, 6, 0);
    let wait = compute_next_wait(&now, Some(&end), &policy());
    assert_eq!(wait, Duration::from_secs(17 * 3600));
}

fn arb_now() -> impl Strategy<Value = DateTime<Tz>> {
    (1_577_836_800i64..=1_924_991_999i64)
        .prop_map(|s| DateTime::from_timestamp(s, 0).unwrap().with_timezone(&Paris))
}

proptest! {
    #[test]
    fn wait_is_total_and_positive(
        now in arb_now(),
        offset_hours in proptest::option::of(-24 * 10i64..24 * 10),
    ) {
        let end = offset_hours.map(|h| now + chrono::TimeDelta::hours(h));
        let d = plan_next_wait(&now, end.as_ref(), &policy());
        prop_assert!(d.wait > Duration::ZERO);
        let p = policy();
        match d.branch {
            WaitBranch::Bootstrap => prop_assert_eq!(d.wait, p.bootstrap_wait),
            WaitBranch::Retry => prop_assert_eq!(d.wait, p.retry_wait),
            WaitBranch::Fallback => prop_assert_eq!(d.wait, p.fallback_wait),
            WaitBranch::NextChange => prop_assert!(d.wait <= Duration::from_secs(25 * 3600)),
            WaitBranch::UntilConfirmation => prop_assert!(d.wait <= Duration::from_secs(12 * 3600)),
            WaitBranch::UntilChangeHour => prop_assert!(d.wait <= Duration::from_secs(7 * 3600)),
        }
        prop_assert_eq!(end.is_none(), d.branch == WaitBranch::Bootstrap);
    }
}
