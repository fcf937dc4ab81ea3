//! Calendar arithmetic: change-hour shifting, API timestamps and fetch windows.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, LocalResult, NaiveDate, NaiveTime, SecondsFormat,
    TimeDelta, TimeZone,
};
use chrono_tz::Tz;
use tempo_types::TempoError;

/// Longest window the remote calendar endpoint accepts, in days.
pub const MAX_WINDOW_DAYS: u64 = 366;

/// Shift `dt` forward by `change_hour` hours of wall-clock time.
///
/// For fixed-offset zones this is exactly `dt + change_hour` hours. In zones
/// with daylight saving the shift keeps the local hour, so local midnight
/// always maps to the local change-hour; if that local time does not exist
/// the absolute shift is used instead.
#[must_use]
pub fn adjust_tempo_time<Z: TimeZone>(dt: &DateTime<Z>, change_hour: u32) -> DateTime<Z> {
    let shift = TimeDelta::hours(i64::from(change_hour));
    let tz = dt.timezone();
    match tz.from_local_datetime(&(dt.naive_local() + shift)) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => dt.clone() + shift,
    }
}

/// The instant at `hour:minute` local time on `date`.
///
/// Out-of-range hours or minutes fall back to midnight; a local time skipped
/// by a daylight-saving jump resolves as if it were UTC wall-clock.
#[must_use]
pub fn local_at<Z: TimeZone>(tz: &Z, date: NaiveDate, hour: u32, minute: u32) -> DateTime<Z> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Local midnight of `date`.
#[must_use]
pub fn local_midnight<Z: TimeZone>(tz: &Z, date: NaiveDate) -> DateTime<Z> {
    local_at(tz, date, 0, 0)
}

/// Parse an API timestamp (RFC3339 with explicit offset).
///
/// # Errors
/// Returns `Parse` if the string is not a valid RFC3339 timestamp.
pub fn parse_api_datetime(s: &str) -> Result<DateTime<FixedOffset>, TempoError> {
    DateTime::parse_from_rfc3339(s)
        .map_err(|e| TempoError::parse(format!("invalid timestamp {s:?}: {e}")))
}

/// Parse the civil date of an API timestamp, as written (offset ignored).
///
/// # Errors
/// Returns `Parse` if the string is not a valid RFC3339 timestamp.
pub fn parse_api_date(s: &str) -> Result<NaiveDate, TempoError> {
    parse_api_datetime(s).map(|dt| dt.date_naive())
}

/// First day (1 September) of the Tempo season containing `date`.
#[must_use]
pub fn season_start(date: NaiveDate) -> NaiveDate {
    let year = if date.month() >= 9 {
        date.year()
    } else {
        date.year() - 1
    };
    NaiveDate::from_ymd_opt(year, 9, 1).unwrap_or(date)
}

/// Closed-open range of whole local days requested from the remote calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchWindow {
    /// Local midnight of the first day.
    pub start: DateTime<Tz>,
    /// Local midnight after the last day.
    pub end: DateTime<Tz>,
}

impl FetchWindow {
    /// Window from `days_before` days before today through `days_after` days after.
    ///
    /// `days_after = 1` makes the window end at the midnight following tomorrow.
    #[must_use]
    pub fn around(now: &DateTime<Tz>, days_before: u32, days_after: u32) -> Self {
        let today = now.date_naive();
        let start = today
            .checked_sub_days(Days::new(u64::from(days_before)))
            .unwrap_or(today);
        Self::from_dates(&now.timezone(), start, Self::end_date_for(today, days_after))
    }

    /// Window from the start of the current season through `days_after` days after today.
    #[must_use]
    pub fn season_to_date(now: &DateTime<Tz>, days_after: u32) -> Self {
        let today = now.date_naive();
        Self::from_dates(
            &now.timezone(),
            season_start(today),
            Self::end_date_for(today, days_after),
        )
    }

    /// Window over `[start, end)` civil dates in `tz`, capped to `MAX_WINDOW_DAYS`.
    #[must_use]
    pub fn from_dates(tz: &Tz, start: NaiveDate, end: NaiveDate) -> Self {
        let earliest = end
            .checked_sub_days(Days::new(MAX_WINDOW_DAYS))
            .unwrap_or(start);
        let start = start.max(earliest).min(end);
        Self {
            start: local_midnight(tz, start),
            end: local_midnight(tz, end),
        }
    }

    fn end_date_for(today: NaiveDate, days_after: u32) -> NaiveDate {
        today
            .checked_add_days(Days::new(u64::from(days_after) + 1))
            .unwrap_or(today)
    }

    /// Civil date of the first day.
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Civil date following the last day.
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Returns true if `date` is one of the window's days.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date() <= date && date < self.end_date()
    }

    /// Query parameters expected by the calendar endpoint.
    #[must_use]
    pub fn query_params(&self) -> [(&'static str, String); 2] {
        [
            (
                "start_date",
                self.start.to_rfc3339_opts(SecondsFormat::Secs, false),
            ),
            ("end_date", self.end.to_rfc3339_opts(SecondsFormat::Secs, false)),
        ]
    }
}
