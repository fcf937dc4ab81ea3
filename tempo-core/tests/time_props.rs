use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, TimeZone, Utc};
use chrono_tz::Europe::Paris;
use proptest::prelude::*;
use tempo_core::{adjust_tempo_time, parse_api_date, parse_api_datetime};

fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    // 2020-01-01T00:00:00Z ..= 2030-12-31T23:59:59Z
    (1_577_836_800i64..=1_924_991_999i64)
        .prop_map(|s| DateTime::from_timestamp(s, 0).expect("in range"))
}

proptest! {
    #[test]
    fn shift_is_exact_for_fixed_offsets(utc in arb_instant(), change_hour in 0u32..24) {
        let cet = FixedOffset::east_opt(3600).expect("valid offset");
        let dt = utc.with_timezone(&cet);
        prop_assert_eq!(
            adjust_tempo_time(&dt, change_hour),
            dt + TimeDelta::hours(i64::from(change_hour))
        );
        prop_assert_eq!(
            adjust_tempo_time(&utc, change_hour),
            utc + TimeDelta::hours(i64::from(change_hour))
        );
    }

    #[test]
    fn paris_midnights_map_to_local_change_hour(day in 0u64..4000) {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date")
            .checked_add_days(chrono::Days::new(day)).expect("in range");
        let midnight = Paris.from_local_datetime(&date.and_hms_opt(0, 0, 0).expect("valid")).single()
            .expect("midnight exists in Paris");
        let shifted = adjust_tempo_time(&midnight, 6);
        prop_assert_eq!(shifted.date_naive(), date);
        prop_assert_eq!(shifted.time(), chrono::NaiveTime::from_hms_opt(6, 0, 0).expect("valid"));
    }
}

#[test]
fn parses_winter_and_summer_timestamps() {
    let winter = parse_api_datetime("2025-01-15T00:00:00+01:00").expect("valid");
    assert_eq!(winter.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    let summer = parse_api_datetime("2025-07-15T00:00:00+02:00").expect("valid");
    assert_eq!(summer.date_naive(), NaiveDate::from_ymd_opt(2025, 7, 15).unwrap());
    assert_eq!(
        parse_api_date("2025-01-15T00:00:00+01:00").expect("valid"),
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    );
}

#[test]
fn rejects_malformed_timestamps() {
    assert!(parse_api_datetime("2025-01-15").is_err());
    assert!(parse_api_date("yesterday").is_err());
}
