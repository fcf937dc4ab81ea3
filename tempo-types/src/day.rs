use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::TempoError;

/// One of the three Tempo tariff colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TempoColor {
    /// Cheapest day (most of the year).
    Blue,
    /// Intermediate day.
    White,
    /// Peak-price day.
    Red,
}

impl TempoColor {
    /// All colors in tariff order.
    pub const ALL: [Self; 3] = [Self::Blue, Self::White, Self::Red];

    /// The code used by the remote calendar API.
    #[must_use]
    pub const fn as_api_code(self) -> &'static str {
        match self {
            Self::Blue => "BLUE",
            Self::White => "WHITE",
            Self::Red => "RED",
        }
    }
}

impl fmt::Display for TempoColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_code())
    }
}

impl FromStr for TempoColor {
    type Err = TempoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BLUE" => Ok(Self::Blue),
            "WHITE" => Ok(Self::White),
            "RED" => Ok(Self::Red),
            other => Err(TempoError::parse(format!("unknown tempo color: {other}"))),
        }
    }
}

/// One calendar-day tariff record.
///
/// `start` and `end` are either both civil dates or both zoned instants, and
/// `end` is always one day after `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TempoDay<T> {
    /// Inclusive start of the day.
    pub start: T,
    /// Exclusive end of the day.
    pub end: T,
    /// Tariff color of the day.
    pub value: TempoColor,
    /// When the source last confirmed this record.
    pub updated: DateTime<Tz>,
}

impl<T: PartialOrd> TempoDay<T> {
    /// Returns true if `point` falls within `[start, end)`.
    pub fn contains(&self, point: &T) -> bool {
        self.start <= *point && *point < self.end
    }
}

/// A day with midnight boundaries.
pub type DateTempoDay = TempoDay<NaiveDate>;

/// A day with boundaries shifted to the change-hour.
pub type TimeTempoDay = TempoDay<DateTime<Tz>>;

/// The collection selected by the `adjusted_days` option.
///
/// Both variants are cheap-to-clone snapshots; they never change once handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarDays {
    /// Time-aligned days (change-hour boundaries).
    Adjusted(Arc<[TimeTempoDay]>),
    /// Date-aligned days (midnight boundaries).
    Regular(Arc<[DateTempoDay]>),
}

impl CalendarDays {
    /// Number of stored days.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Adjusted(days) => days.len(),
            Self::Regular(days) => days.len(),
        }
    }

    /// Returns true if no day is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Color in effect at `at`, if a stored day covers it.
    ///
    /// Regular days are matched on the civil date of `at` in its own timezone.
    #[must_use]
    pub fn color_at(&self, at: &DateTime<Tz>) -> Option<TempoColor> {
        match self {
            Self::Adjusted(days) => days.iter().find(|d| d.contains(at)).map(|d| d.value),
            Self::Regular(days) => {
                let date = at.date_naive();
                days.iter().find(|d| d.contains(&date)).map(|d| d.value)
            }
        }
    }
}
