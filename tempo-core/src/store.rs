//! Day record store: one canonical list of tariff days, published as two
//! immutable projections (midnight boundaries and change-hour boundaries).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Days, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tempo_types::{CalendarDays, DateTempoDay, TempoColor, TempoError, TimeTempoDay};

use crate::time::{FetchWindow, adjust_tempo_time, local_midnight, parse_api_datetime};

/// The one start date whose missing color is repaired to blue instead of dropped.
///
/// The remote calendar returned this day without a color; it is known to
/// have been billed as a blue day.
pub const MISSING_COLOR_REPAIR_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2022, 12, 28) {
    Some(d) => d,
    None => panic!("invalid repair date"),
};

/// One entry of the calendar endpoint, as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTempoEntry {
    /// RFC3339 start of the day.
    pub start_date: String,
    /// RFC3339 end of the day.
    pub end_date: String,
    /// Color code (`BLUE`, `WHITE`, `RED`); missing on some historical entries.
    #[serde(default)]
    pub value: Option<String>,
    /// RFC3339 timestamp of the last confirmation by the source.
    #[serde(default)]
    pub updated_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CalendarPayload {
    tempo_like_calendars: TempoLikeCalendars,
}

#[derive(Debug, Deserialize)]
struct TempoLikeCalendars {
    #[serde(default)]
    values: Vec<RawTempoEntry>,
}

/// Decode the calendar endpoint body into its raw entries.
///
/// # Errors
/// Returns `Parse` if the body is not JSON or does not have the calendar shape.
pub fn parse_calendar_payload(body: &str) -> Result<Vec<RawTempoEntry>, TempoError> {
    let payload: CalendarPayload = serde_json::from_str(body)?;
    Ok(payload.tempo_like_calendars.values)
}

/// Canonical representation of one stored day.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DayInterval {
    date: NaiveDate,
    color: TempoColor,
    updated: DateTime<Tz>,
}

/// Immutable view published after every successful ingest.
#[derive(Debug, Clone)]
struct Snapshot {
    adjusted: Arc<[TimeTempoDay]>,
    regular: Arc<[DateTempoDay]>,
    known_data_end: Option<DateTime<Tz>>,
    last_ingest: Option<DateTime<Tz>>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            adjusted: Arc::from(Vec::new()),
            regular: Arc::from(Vec::new()),
            known_data_end: None,
            last_ingest: None,
        }
    }
}

/// Store of Tempo days maintained by a single writer and read from anywhere.
///
/// Readers always receive a complete snapshot: each ingest builds both
/// projections first and swaps them in under one lock.
#[derive(Debug)]
pub struct DayRecordStore {
    tz: Tz,
    change_hour: u32,
    days: Mutex<BTreeMap<NaiveDate, DayInterval>>,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl DayRecordStore {
    /// Create an empty store evaluating dates in `tz` with the given change-hour.
    #[must_use]
    pub fn new(tz: Tz, change_hour: u32) -> Self {
        Self {
            tz,
            change_hour,
            days: Mutex::new(BTreeMap::new()),
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    fn current(&self) -> Arc<Snapshot> {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the days of `window` with the parsed `entries`.
    ///
    /// Days outside the window are retained from earlier ingests. Entries with
    /// an unknown color, a missing color (outside the repair date) or
    /// malformed timestamps are dropped. Returns the furthest change-hour
    /// aligned end now stored, or `None` if no entry was usable, in which case
    /// the store is left untouched.
    ///
    /// `received_at` becomes the store's `last_ingest` when the ingest applies.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "tempo::store",
            skip(self, entries),
            fields(entries = entries.len(), window_start = %window.start_date(), window_end = %window.end_date()),
        )
    )]
    pub fn ingest(
        &self,
        entries: &[RawTempoEntry],
        window: &FetchWindow,
        received_at: DateTime<Tz>,
    ) -> Option<DateTime<Tz>> {
        let parsed: Vec<DayInterval> = entries.iter().filter_map(|e| self.parse_entry(e)).collect();
        if parsed.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!("no usable entry in payload, store unchanged");
            return None;
        }

        let mut days = self.days.lock().unwrap_or_else(PoisonError::into_inner);
        days.retain(|date, _| !window.contains_date(*date));
        for day in parsed {
            days.insert(day.date, day);
        }

        let snapshot = self.project(&days, received_at);
        let end = snapshot.known_data_end;
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);

        #[cfg(feature = "tracing")]
        tracing::debug!(stored = days.len(), known_data_end = ?end, "store updated");
        end
    }

    fn project(&self, days: &BTreeMap<NaiveDate, DayInterval>, received_at: DateTime<Tz>) -> Snapshot {
        let regular: Vec<DateTempoDay> = days
            .values()
            .filter_map(|d| {
                Some(DateTempoDay {
                    start: d.date,
                    end: d.date.checked_add_days(Days::new(1))?,
                    value: d.color,
                    updated: d.updated,
                })
            })
            .collect();
        let adjusted: Vec<TimeTempoDay> = regular
            .iter()
            .map(|d| TimeTempoDay {
                start: adjust_tempo_time(&local_midnight(&self.tz, d.start), self.change_hour),
                end: adjust_tempo_time(&local_midnight(&self.tz, d.end), self.change_hour),
                value: d.value,
                updated: d.updated,
            })
            .collect();
        let known_data_end = adjusted.iter().map(|d| d.end).max();
        Snapshot {
            adjusted: Arc::from(adjusted),
            regular: Arc::from(regular),
            known_data_end,
            last_ingest: Some(received_at.with_timezone(&self.tz)),
        }
    }

    fn parse_entry(&self, entry: &RawTempoEntry) -> Option<DayInterval> {
        let start = match parse_api_datetime(&entry.start_date) {
            Ok(t) => t,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_e, "dropping entry with invalid start date");
                return None;
            }
        };
        let date = start.date_naive();

        let end_ok = parse_api_datetime(&entry.end_date)
            .ok()
            .is_some_and(|end| Some(end.date_naive()) == date.checked_add_days(Days::new(1)));
        if !end_ok {
            #[cfg(feature = "tracing")]
            tracing::warn!(start = %entry.start_date, end = %entry.end_date, "dropping entry not spanning one day");
            return None;
        }

        let Some(updated) = entry
            .updated_date
            .as_deref()
            .and_then(|s| parse_api_datetime(s).ok())
        else {
            #[cfg(feature = "tracing")]
            tracing::warn!(start = %entry.start_date, "dropping entry without a valid updated date");
            return None;
        };

        let color = match entry.value.as_deref() {
            Some(code) => match code.parse::<TempoColor>() {
                Ok(c) => c,
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(start = %entry.start_date, error = %_e, "dropping entry with unknown color");
                    return None;
                }
            },
            None if date == MISSING_COLOR_REPAIR_DATE => {
                #[cfg(feature = "tracing")]
                tracing::info!(start = %entry.start_date, "repairing missing color to blue");
                TempoColor::Blue
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(start = %entry.start_date, "dropping entry without color");
                return None;
            }
        };

        Some(DayInterval {
            date,
            color,
            updated: updated.with_timezone(&self.tz),
        })
    }

    /// Snapshot of the change-hour aligned days, oldest first.
    #[must_use]
    pub fn get_adjusted(&self) -> Arc<[TimeTempoDay]> {
        Arc::clone(&self.current().adjusted)
    }

    /// Snapshot of the midnight aligned days, oldest first.
    #[must_use]
    pub fn get_regular(&self) -> Arc<[DateTempoDay]> {
        Arc::clone(&self.current().regular)
    }

    /// `get_adjusted()` if `use_adjusted`, else `get_regular()`.
    #[must_use]
    pub fn get_selected(&self, use_adjusted: bool) -> CalendarDays {
        if use_adjusted {
            CalendarDays::Adjusted(self.get_adjusted())
        } else {
            CalendarDays::Regular(self.get_regular())
        }
    }

    /// Furthest change-hour aligned end stored, if any.
    #[must_use]
    pub fn known_data_end(&self) -> Option<DateTime<Tz>> {
        self.current().known_data_end
    }

    /// When the last successful ingest happened.
    #[must_use]
    pub fn last_ingest(&self) -> Option<DateTime<Tz>> {
        self.current().last_ingest
    }
}
