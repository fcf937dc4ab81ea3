//! Community forecast of upcoming Tempo colors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::TempoColor;

/// One forecast day, as published by the forecast service.
///
/// Unlike confirmed calendar days, the color is kept as the service's
/// lowercase French label (`bleu`, `blanc`, `rouge`) and may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Civil date the forecast is for.
    pub date: NaiveDate,
    /// Normalized color label, see [`normalize_forecast_color`].
    pub color: String,
    /// Confidence in `[0, 1]` when the service provides one.
    pub probability: Option<f64>,
}

impl ForecastDay {
    /// The color as a [`TempoColor`], if the label is a known one.
    #[must_use]
    pub fn tempo_color(&self) -> Option<TempoColor> {
        match self.color.as_str() {
            "bleu" | "blue" => Some(TempoColor::Blue),
            "blanc" | "white" => Some(TempoColor::White),
            "rouge" | "red" => Some(TempoColor::Red),
            _ => None,
        }
    }
}

/// Trim and lowercase a forecast color label. An empty label stays empty.
#[must_use]
pub fn normalize_forecast_color(raw: &str) -> String {
    raw.trim().to_lowercase()
}
