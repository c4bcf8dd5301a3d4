//! Parsing of the OpenWeather current-conditions payload into a
//! [`WeatherRecord`]. Format-specific structure stays confined here.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{WeatherRecord, normalize_key};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed weather payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwResponse {
    #[allow(dead_code)]
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

/// Decode a raw response body into a record for `key`, stamped `fetched_at`.
///
/// A payload missing any required numeric field, or with `weather` as
/// anything other than an array, is rejected as [`DecodeError::Malformed`]
/// rather than patched up with defaults. The one tolerated gap is an empty
/// `weather` array, which falls back to the description `"Unknown"`.
pub fn decode(
    bytes: &[u8],
    key: &str,
    fetched_at: DateTime<Utc>,
) -> Result<WeatherRecord, DecodeError> {
    let parsed: OwResponse =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let description = parsed
        .weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(WeatherRecord {
        key: normalize_key(key),
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        description,
        humidity_pct: parsed.main.humidity,
        wind_speed_mps: parsed.wind.speed,
        pressure_hpa: parsed.main.pressure,
        fetched_at,
    })
}
