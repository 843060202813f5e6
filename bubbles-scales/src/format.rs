use chrono::DateTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString, VariantNames};

use crate::error::BubblesScaleError;

pub const DATE_FORMAT: &str = "%d %b %Y";

/// Unit that axis tick labels are divided by before display
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DisplayUnits {
    #[default]
    Auto,
    None,
    Thousands,
    Millions,
    Billions,
    Trillions,
}

impl DisplayUnits {
    /// Pick a concrete unit for values whose largest magnitude is `magnitude`.
    /// Anything other than `Auto` is returned unchanged.
    pub fn resolve(self, magnitude: f64) -> Self {
        if self != DisplayUnits::Auto {
            return self;
        }
        let magnitude = magnitude.abs();
        if magnitude >= 1e12 {
            DisplayUnits::Trillions
        } else if magnitude >= 1e9 {
            DisplayUnits::Billions
        } else if magnitude >= 1e6 {
            DisplayUnits::Millions
        } else if magnitude >= 1e4 {
            DisplayUnits::Thousands
        } else {
            DisplayUnits::None
        }
    }

    pub fn divisor(&self) -> f64 {
        match self {
            DisplayUnits::Auto | DisplayUnits::None => 1.0,
            DisplayUnits::Thousands => 1e3,
            DisplayUnits::Millions => 1e6,
            DisplayUnits::Billions => 1e9,
            DisplayUnits::Trillions => 1e12,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            DisplayUnits::Auto | DisplayUnits::None => "",
            DisplayUnits::Thousands => "K",
            DisplayUnits::Millions => "M",
            DisplayUnits::Billions => "bn",
            DisplayUnits::Trillions => "T",
        }
    }
}

/// Formats tick values for one axis
#[derive(Debug, Clone, PartialEq)]
pub enum TickFormatter {
    Numeric { units: DisplayUnits, decimals: usize },
    /// Values are milliseconds since the Unix epoch
    Date,
}

impl TickFormatter {
    /// Formatter for ticks spaced `step` apart across `domain`
    pub fn numeric(domain: (f64, f64), step: f64, units: DisplayUnits) -> Self {
        let magnitude = domain.0.abs().max(domain.1.abs());
        let units = units.resolve(magnitude);
        let scaled = (step / units.divisor()).abs();
        let decimals = if scaled > 0.0 && scaled.is_finite() {
            (-scaled.log10().floor()).clamp(0.0, 10.0) as usize
        } else {
            0
        };
        TickFormatter::Numeric { units, decimals }
    }

    pub fn format(&self, value: f64) -> Result<String, BubblesScaleError> {
        match self {
            TickFormatter::Numeric { units, decimals } => {
                // adding zero turns -0.0 into 0.0
                let v = value / units.divisor() + 0.0;
                Ok(format!("{v:.decimals$}{}", units.suffix()))
            }
            TickFormatter::Date => {
                let date = DateTime::from_timestamp_millis(value.round() as i64)
                    .ok_or(BubblesScaleError::InvalidTimestamp(value))?;
                Ok(date.format(DATE_FORMAT).to_string())
            }
        }
    }

    pub fn format_all(&self, values: &[f64]) -> Result<Vec<String>, BubblesScaleError> {
        values.iter().map(|v| self.format(*v)).collect()
    }
}
