use chrono::{Days, NaiveDate, SecondsFormat, TimeZone};
use chrono_tz::Tz;
use tempo_core::{FetchWindow, RawTempoEntry, TempoColor, local_midnight};

fn midnight_rfc3339(tz: &Tz, date: NaiveDate) -> String {
    local_midnight(tz, date).to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// One well-formed entry for `date`, confirmed at 10:20 the day before.
#[must_use]
pub fn entry(tz: &Tz, date: NaiveDate, color: TempoColor) -> RawTempoEntry {
    let mut e = missing_color(tz, date);
    e.value = Some(color.as_api_code().to_string());
    e
}

/// An entry for `date` without a color value.
#[must_use]
pub fn missing_color(tz: &Tz, date: NaiveDate) -> RawTempoEntry {
    let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
    let prev = date.checked_sub_days(Days::new(1)).unwrap_or(date);
    let updated = tz
        .from_local_datetime(&prev.and_hms_opt(10, 20, 0).unwrap_or_default())
        .earliest()
        .map_or_else(|| midnight_rfc3339(tz, prev), |t| t.to_rfc3339_opts(SecondsFormat::Secs, false));
    RawTempoEntry {
        start_date: midnight_rfc3339(tz, date),
        end_date: midnight_rfc3339(tz, next),
        value: None,
        updated_date: Some(updated),
    }
}

/// One entry per day of `window`, all of the same color.
#[must_use]
pub fn window_entries(window: &FetchWindow, color: TempoColor) -> Vec<RawTempoEntry> {
    let tz = window.start.timezone();
    window
        .start_date()
        .iter_days()
        .take_while(|d| *d < window.end_date())
        .map(|d| entry(&tz, d, color))
        .collect()
}
