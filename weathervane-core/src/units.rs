//! Temperature unit conversion and display formatting.
//!
//! Temperatures are stored canonically in Celsius everywhere else in the
//! crate; this module is the only place display units exist.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn letter(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Convert a canonical Celsius value into the requested display unit.
/// Celsius is an identity conversion.
pub fn convert(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
    }
}

/// Render an already-converted value as e.g. `"22°C"` or `"-10°C"`.
///
/// Rounds to the nearest integer, halves away from zero (`f64::round`
/// semantics), so 22.5 renders as 23 and -22.5 as -23.
pub fn format(value: f64, unit: TemperatureUnit) -> String {
    format!("{}°{}", value.round() as i64, unit.letter())
}

/// Placeholder shown when no record is available.
pub const NOT_AVAILABLE: &str = "N/A";

/// Like [`format`], but renders [`NOT_AVAILABLE`] when there is no value.
pub fn format_opt(value: Option<f64>, unit: TemperatureUnit) -> String {
    match value {
        Some(v) => format(v, unit),
        None => NOT_AVAILABLE.to_string(),
    }
}
