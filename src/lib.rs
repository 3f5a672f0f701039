//! parkscout library
//!
//! Scrapes two public sources into typed tables:
//!
//! - daily sunrise, sunset and solar noon for a named location, one calendar
//!   year at a time ([`SunTimesClient`])
//! - the list of California state parks with county, size, founding year and
//!   coordinates ([`ListingClient`], [`CoordinateClient`], [`assemble`])
//!
//! The two pipelines are independent. Every client takes a [`ScraperConfig`]
//! and fetches through a [`PageSource`], so the same code runs against the
//! live sites ([`HttpSource`]) or canned HTML ([`FixtureSource`]).
//!
//! # Failure policy
//!
//! | Operation | On failure | Surface |
//! |---|---|---|
//! | Listing page fetch / parse | fatal | `Err(ListingError)` |
//! | Search resolution | location absent | `Err(SunTimesError::Unresolved)` + warn |
//! | Month page fetch | skip month | warn |
//! | Month page parse | skip month | debug |
//! | All months failed | location absent | `Err(SunTimesError::NoData)` + warn |
//! | Detail page fetch | sentinel row | `Coordinate::Unknown` + warn |
//! | Missing coordinate markup | sentinel row | `Coordinate::Unknown` + info |
//! | Malformed coordinate text | sentinel row | `Coordinate::Unknown` + warn |
//! | Row without link | sentinel row | `Coordinate::Unknown` + warn |
//! | Metadata/coordinate misalignment | fatal | `Err(AssemblyError)` |
//!
//! Nothing is retried. Diagnostics go through `tracing`; installing a
//! subscriber is up to the caller.
//!
//! # Example
//!
//! ```no_run
//! use parkscout::{CoordinateClient, ListingClient, ScraperConfig, SunTimesClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScraperConfig::default().with_year(2024);
//!
//! let sun = SunTimesClient::new(config.clone())?;
//! let table = sun.fetch_default_year("Crystal Cove State Park").await?;
//! println!("{} days", table.len());
//!
//! let listing = ListingClient::new(config.clone())?;
//! let coordinates = CoordinateClient::new(config)?;
//! let parks = listing.fetch_park_table(&coordinates).await?;
//! println!("{} parks", parks.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod http;
pub mod table;

pub use config::ScraperConfig;
pub use data::{
    assemble, AssemblyError, Coordinate, CoordinateClient, CoordinateError, DailyAstroRecord,
    ExtraColumns, FinalLocationTable, ListingClient, ListingError, ListingSnapshot,
    LocationAstroTable, LocationCoordinate, LocationLink, LocationMetadata, LocationRecord,
    SunTimesClient, SunTimesError,
};
pub use http::{FetchError, FixtureSource, HttpSource, Page, PageSource};
