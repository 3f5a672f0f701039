//! Degrees-minutes-seconds conversion
//!
//! Detail pages publish coordinates as text like `33°15′21″N`. The numeric
//! components are read as the integer runs in the text, in order, and the
//! hemisphere is the trailing letter.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::Coordinate;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("invalid regex: number"));

/// Errors that can occur when converting coordinate text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// The text contains no numeric component
    #[error("Invalid coordinate format: '{0}'")]
    InvalidFormat(String),

    /// The text does not end with N, S, E or W
    #[error("Missing hemisphere letter in coordinate: '{0}'")]
    MissingHemisphere(String),
}

/// Which axis a decimal value belongs to, for choosing its hemisphere letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Converts DMS text to signed decimal degrees rounded to 4 places
///
/// One number is read as degrees, two as degrees and minutes, three or more
/// as degrees, minutes and seconds (further numbers are ignored). South and
/// west are negative.
///
/// # Examples
/// ```
/// use parkscout::data::dms_to_decimal;
///
/// let decimal = dms_to_decimal("34° 5′ 12″ S").unwrap();
/// assert!((decimal - -34.0867).abs() < 1e-9);
/// ```
pub fn dms_to_decimal(text: &str) -> Result<f64, CoordinateError> {
    let trimmed = text.trim();

    let numbers: Vec<f64> = NUMBER
        .find_iter(trimmed)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();

    let (degrees, minutes, seconds) = match numbers.as_slice() {
        [] => return Err(CoordinateError::InvalidFormat(text.to_string())),
        [d] => (*d, 0.0, 0.0),
        [d, m] => (*d, *m, 0.0),
        [d, m, s, ..] => (*d, *m, *s),
    };

    let sign = match trimmed.chars().last().map(|c| c.to_ascii_uppercase()) {
        Some('N') | Some('E') => 1.0,
        Some('S') | Some('W') => -1.0,
        _ => return Err(CoordinateError::MissingHemisphere(text.to_string())),
    };

    Ok(sign * round4(degrees + minutes / 60.0 + seconds / 3600.0))
}

/// Converts a latitude/longitude text pair into a known coordinate
pub fn convert_coordinates(latitude: &str, longitude: &str) -> Result<Coordinate, CoordinateError> {
    Ok(Coordinate::Known {
        latitude: dms_to_decimal(latitude)?,
        longitude: dms_to_decimal(longitude)?,
    })
}

/// Renders decimal degrees as `D° M′ S″ H` with whole seconds
pub fn decimal_to_dms(value: f64, axis: Axis) -> String {
    let hemisphere = match (axis, value < 0.0) {
        (Axis::Latitude, false) => 'N',
        (Axis::Latitude, true) => 'S',
        (Axis::Longitude, false) => 'E',
        (Axis::Longitude, true) => 'W',
    };

    let total_seconds = (value.abs() * 3600.0).round() as u64;
    let degrees = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}° {}′ {}″ {}", degrees, minutes, seconds, hemisphere)
}
