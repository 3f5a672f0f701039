//! Core data models for parkscout
//!
//! This module contains the records produced by both pipelines: daily sun
//! times per location, and state park metadata joined with coordinates.

pub mod assemble;
pub mod coordinates;
pub mod listing;
pub mod park_coordinates;
pub mod sun_table;
pub mod sun_times;

pub use assemble::{assemble, AssemblyError};
pub use coordinates::{convert_coordinates, decimal_to_dms, dms_to_decimal, Axis, CoordinateError};
pub use listing::{parse_links, parse_metadata, ListingClient, ListingError, ListingSnapshot};
pub use park_coordinates::{parse_detail_page, resolve_link, CoordinateClient};
pub use sun_table::parse_month_page;
pub use sun_times::{SunTimesClient, SunTimesError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Leading column naming the location in both output tables
pub const LOCATION_COLUMN: &str = "State Park";

/// Text used for unknown coordinates in tabular output
pub const UNKNOWN_COORDINATE: &str = "NaN";

/// Sun times for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAstroRecord {
    /// Calendar day
    pub date: NaiveDate,
    /// Sunrise clock time as published, e.g. "6:45 am"
    pub sunrise_time: String,
    /// Sunrise azimuth in whole degrees
    pub sunrise_angle: u32,
    /// Sunset clock time as published
    pub sunset_time: String,
    /// Sunset azimuth in whole degrees
    pub sunset_angle: u32,
    /// Solar noon clock time as published
    pub solar_noon_time: String,
    /// Sun altitude at solar noon in degrees
    pub solar_noon_angle: f64,
    /// Extra column values (day length, twilight, distance) in schema order
    pub extra: Vec<String>,
}

/// Names of the extra columns a month page carries
///
/// The solar noon columns sit between the two groups in tabular output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraColumns {
    /// Columns placed before the solar noon columns
    pub before_noon: Vec<String>,
    /// Columns placed after the solar noon columns
    pub after_noon: Vec<String>,
}

impl ExtraColumns {
    /// Total number of extra columns
    pub fn len(&self) -> usize {
        self.before_noon.len() + self.after_noon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One month page parsed into records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTable {
    pub columns: ExtraColumns,
    pub records: Vec<DailyAstroRecord>,
}

/// A year of daily sun times for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAstroTable {
    /// Location name as given by the caller
    pub location: String,
    /// Extra-column schema shared by every record
    pub columns: ExtraColumns,
    /// Records in month order, one per day
    pub records: Vec<DailyAstroRecord>,
}

impl LocationAstroTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names of the tabular view
    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = [
            LOCATION_COLUMN,
            "Date",
            "Sunrise (Time)",
            "Sunrise (Angle)",
            "Sunset (Time)",
            "Sunset (Angle)",
        ]
        .iter()
        .map(|name| name.to_string())
        .collect();
        header.extend(self.columns.before_noon.iter().cloned());
        header.push("Solar Noon (Time)".to_string());
        header.push("Solar Noon (Angle)".to_string());
        header.extend(self.columns.after_noon.iter().cloned());
        header
    }

    /// Records rendered as text rows matching [`header`](Self::header)
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let split = self.columns.before_noon.len();

        self.records
            .iter()
            .map(|record| {
                let (before, after) = record.extra.split_at(split.min(record.extra.len()));
                let mut row = vec![
                    self.location.clone(),
                    record.date.format("%Y-%m-%d").to_string(),
                    record.sunrise_time.clone(),
                    record.sunrise_angle.to_string(),
                    record.sunset_time.clone(),
                    record.sunset_angle.to_string(),
                ];
                row.extend(before.iter().cloned());
                row.push(record.solar_noon_time.clone());
                row.push(record.solar_noon_angle.to_string());
                row.extend(after.iter().cloned());
                row
            })
            .collect()
    }
}

/// One row of the park listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMetadata {
    /// Park name, footnotes removed
    pub name: String,
    pub county: Option<String>,
    pub size_acres: Option<f64>,
    pub size_hectares: Option<f64>,
    pub year_established: Option<i32>,
    /// Remaining listing columns as (column, value) pairs in source order
    pub other: Vec<(String, String)>,
}

/// Link from a listing row to the park's detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationLink {
    /// Zero-based data row in the listing table
    pub row: usize,
    /// Park name from the row, normalised like [`LocationMetadata::name`]
    pub name: String,
    /// Relative href of the row's first link, `None` when the row has none
    pub href: Option<String>,
}

/// Geographic position of a location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Coordinate {
    /// Decimal degrees, negative for south and west
    Known { latitude: f64, longitude: f64 },
    /// No usable coordinate was found
    Unknown,
}

impl Coordinate {
    pub fn is_known(&self) -> bool {
        matches!(self, Coordinate::Known { .. })
    }

    pub fn latitude(&self) -> Option<f64> {
        match self {
            Coordinate::Known { latitude, .. } => Some(*latitude),
            Coordinate::Unknown => None,
        }
    }

    pub fn longitude(&self) -> Option<f64> {
        match self {
            Coordinate::Known { longitude, .. } => Some(*longitude),
            Coordinate::Unknown => None,
        }
    }
}

/// Coordinate found for one listing link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCoordinate {
    /// Park name carried over from the link
    pub name: String,
    pub coordinate: Coordinate,
}

/// Park metadata joined with its coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub metadata: LocationMetadata,
    pub coordinate: Coordinate,
}

/// The assembled park table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalLocationTable {
    /// Names of the listing columns kept in [`LocationMetadata::other`]
    pub other_columns: Vec<String>,
    /// Rows in listing order
    pub records: Vec<LocationRecord>,
}

impl FinalLocationTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names of the tabular view
    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = [
            LOCATION_COLUMN,
            "County",
            "Size (acres)",
            "Size (ha)",
            "Year established",
        ]
        .iter()
        .map(|name| name.to_string())
        .collect();
        header.extend(self.other_columns.iter().cloned());
        header.push("Latitude".to_string());
        header.push("Longitude".to_string());
        header
    }

    /// Records rendered as text rows matching [`header`](Self::header)
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        fn optional<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        fn degrees(value: Option<f64>) -> String {
            value
                .map(|v| v.to_string())
                .unwrap_or_else(|| UNKNOWN_COORDINATE.to_string())
        }

        self.records
            .iter()
            .map(|record| {
                let meta = &record.metadata;
                let mut row = vec![
                    meta.name.clone(),
                    optional(&meta.county),
                    optional(&meta.size_acres),
                    optional(&meta.size_hectares),
                    optional(&meta.year_established),
                ];
                row.extend(meta.other.iter().map(|(_, value)| value.clone()));
                row.push(degrees(record.coordinate.latitude()));
                row.push(degrees(record.coordinate.longitude()));
                row
            })
            .collect()
    }
}
