//! Decoding of the community forecast feed.

use chrono::NaiveDate;
use serde::Deserialize;
use tempo_types::{ForecastDay, TempoError, normalize_forecast_color};

#[derive(Debug, Deserialize)]
struct RawForecastEntry {
    date: String,
    #[serde(default)]
    couleur: Option<String>,
    #[serde(default)]
    probability: Option<f64>,
}

/// Decode a forecast feed body: a JSON array of `{date, couleur, probability}`.
///
/// Entries that are not objects, lack a `YYYY-MM-DD` date or carry a
/// non-numeric probability are skipped. A missing color becomes the empty
/// label and a missing or null probability becomes `None`.
///
/// # Errors
/// Returns `Parse` if the body is not a JSON array.
pub fn parse_forecast_payload(body: &str) -> Result<Vec<ForecastDay>, TempoError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(body)?;
    Ok(values.into_iter().filter_map(parse_forecast_entry).collect())
}

fn parse_forecast_entry(value: serde_json::Value) -> Option<ForecastDay> {
    let raw: RawForecastEntry = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "tempo::forecast", error = %_e, "skipping malformed forecast entry");
            return None;
        }
    };
    let Ok(date) = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d") else {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "tempo::forecast", date = %raw.date, "skipping forecast entry with invalid date");
        return None;
    };
    Some(ForecastDay {
        date,
        color: normalize_forecast_color(raw.couleur.as_deref().unwrap_or_default()),
        probability: raw.probability,
    })
}
