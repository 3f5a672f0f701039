//! Joining listing metadata with coordinates

use thiserror::Error;

use super::{FinalLocationTable, LocationCoordinate, LocationMetadata, LocationRecord};

/// Errors that can occur when joining metadata and coordinates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// The two sides have a different number of rows
    #[error("Cannot join {metadata} listing rows with {coordinates} coordinate rows")]
    CountMismatch { metadata: usize, coordinates: usize },

    /// A row pairs two different parks
    #[error("Row {row} is '{metadata}' in the listing but '{coordinate}' in the coordinates")]
    KeyMismatch {
        row: usize,
        metadata: String,
        coordinate: String,
    },
}

/// Joins metadata rows with coordinates keyed by park name
///
/// Both sides must describe the same parks in the same order; any difference
/// in length or name is an error rather than a silently shifted row.
pub fn assemble(
    metadata: Vec<LocationMetadata>,
    coordinates: Vec<LocationCoordinate>,
) -> Result<FinalLocationTable, AssemblyError> {
    if metadata.len() != coordinates.len() {
        return Err(AssemblyError::CountMismatch {
            metadata: metadata.len(),
            coordinates: coordinates.len(),
        });
    }

    let other_columns = metadata
        .first()
        .map(|first| first.other.iter().map(|(name, _)| name.clone()).collect())
        .unwrap_or_default();

    let records = metadata
        .into_iter()
        .zip(coordinates)
        .enumerate()
        .map(|(row, (metadata, found))| {
            if metadata.name != found.name {
                return Err(AssemblyError::KeyMismatch {
                    row,
                    metadata: metadata.name,
                    coordinate: found.name,
                });
            }
            Ok(LocationRecord {
                metadata,
                coordinate: found.coordinate,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FinalLocationTable {
        other_columns,
        records,
    })
}
