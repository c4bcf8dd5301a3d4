use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalize a lookup key for storage and comparison: trim surrounding
/// whitespace and case-fold. Every component that stores or compares keys
/// goes through this.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// A single observation for one lookup key, in canonical units
/// (temperatures in Celsius, wind in m/s, pressure in hPa).
///
/// Immutable once constructed; a newer fetch for the same key produces a
/// fresh record rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Normalized lookup key this record was fetched for.
    pub key: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: u32,
    pub fetched_at: DateTime<Utc>,
}
