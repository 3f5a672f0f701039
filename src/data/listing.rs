//! State park listing client
//!
//! The listing page holds one large table with a two-level header
//! (`Size` spans `acres` and `ha`). Metadata is read from the first table on
//! the page and detail links from the first `wikitable`; both are taken from a
//! single [`ListingSnapshot`] so their rows stay aligned.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{info, warn};

use super::assemble::{assemble, AssemblyError};
use super::park_coordinates::CoordinateClient;
use super::{FinalLocationTable, LocationLink, LocationMetadata, LOCATION_COLUMN};
use crate::config::ScraperConfig;
use crate::http::{FetchError, HttpSource, PageSource};
use crate::table::{expand_rows, strip_footnotes, table_rows};

/// Rows forming the two-level header
const HEADER_ROWS: usize = 2;

static FIRST_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("invalid selector: table"));

static WIKITABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.wikitable").expect("invalid selector: wikitable"));

static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("invalid selector: link"));

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("invalid regex: number"));

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}\b").expect("invalid regex: year"));

/// Errors that can occur when reading the listing page
#[derive(Debug, Error)]
pub enum ListingError {
    /// The listing page could not be fetched
    #[error("Failed to retrieve the listing page: {0}")]
    Fetch(#[from] FetchError),

    /// No table with a two-level header was found
    #[error("No park table found on the listing page")]
    NoTable,

    /// A column required to identify rows is missing
    #[error("Listing table has no '{0}' column")]
    MissingColumn(String),

    /// Metadata and link selection disagree on the number of rows
    #[error("Listing has {metadata} metadata rows but {links} link rows")]
    Misaligned { metadata: usize, links: usize },

    /// Metadata and coordinates could not be joined
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// Maps a lower-level header cell to its output column name
fn canonical_column(raw: &str) -> String {
    let cleaned = strip_footnotes(raw);
    match cleaned.as_str() {
        "Park name" => LOCATION_COLUMN.to_string(),
        "acres" => "Size (acres)".to_string(),
        "ha" => "Size (ha)".to_string(),
        // "County or<br>counties" loses its line break in text form
        county if county.starts_with("County") => "County".to_string(),
        _ => cleaned,
    }
}

/// First number in a cell, thousands separators removed
fn parse_number(text: &str) -> Option<f64> {
    let found = NUMBER.find(text)?;
    found.as_str().replace(',', "").parse().ok()
}

fn parse_year(text: &str) -> Option<i32> {
    YEAR.find(text)?.as_str().parse().ok()
}

/// Canonical header of an expanded table, `None` without two header rows
fn lower_header(grid: &[Vec<String>]) -> Option<Vec<String>> {
    if grid.len() < HEADER_ROWS {
        return None;
    }
    Some(grid[HEADER_ROWS - 1].iter().map(|h| canonical_column(h)).collect())
}

fn cell_text(cells: &[String], col: Option<usize>) -> Option<String> {
    col.and_then(|i| cells.get(i)).map(|value| strip_footnotes(value))
}

/// Parses the first table of the listing page into metadata rows
pub fn parse_metadata(html: &str) -> Result<Vec<LocationMetadata>, ListingError> {
    let document = Html::parse_document(html);
    let table = document.select(&FIRST_TABLE).next().ok_or(ListingError::NoTable)?;

    let grid = expand_rows(&table_rows(table));
    let header = lower_header(&grid).ok_or(ListingError::NoTable)?;

    let column = |name: &str| header.iter().position(|h| h == name);
    let name_col = column(LOCATION_COLUMN)
        .ok_or_else(|| ListingError::MissingColumn(LOCATION_COLUMN.to_string()))?;
    let county_col = column("County");
    let acres_col = column("Size (acres)");
    let hectares_col = column("Size (ha)");
    let year_col = column("Year established");

    let named = [Some(name_col), county_col, acres_col, hectares_col, year_col];

    let records = grid[HEADER_ROWS..]
        .iter()
        .map(|cells| LocationMetadata {
            name: cell_text(cells, Some(name_col)).unwrap_or_default(),
            county: cell_text(cells, county_col).filter(|county| !county.is_empty()),
            size_acres: cell_text(cells, acres_col).and_then(|v| parse_number(&v)),
            size_hectares: cell_text(cells, hectares_col).and_then(|v| parse_number(&v)),
            year_established: cell_text(cells, year_col).and_then(|v| parse_year(&v)),
            other: header
                .iter()
                .enumerate()
                .filter(|(col, _)| !named.contains(&Some(*col)))
                .map(|(col, name)| (name.clone(), cell_text(cells, Some(col)).unwrap_or_default()))
                .collect(),
        })
        .collect();

    Ok(records)
}

/// First link in a row that leaves the page, skipping footnote anchors
fn row_link(row: ElementRef) -> Option<String> {
    row.select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| !href.starts_with('#'))
        .map(str::to_string)
}

/// Parses the detail links of the `wikitable` on the listing page
///
/// Every data row yields a link, with `href = None` when the row has no
/// anchor, so the result lines up with [`parse_metadata`].
pub fn parse_links(html: &str) -> Result<Vec<LocationLink>, ListingError> {
    let document = Html::parse_document(html);
    let table = document.select(&WIKITABLE).next().ok_or(ListingError::NoTable)?;

    let rows = table_rows(table);
    let grid = expand_rows(&rows);
    let header = lower_header(&grid).ok_or(ListingError::NoTable)?;
    let name_col = header.iter().position(|h| h == LOCATION_COLUMN).unwrap_or(0);

    let links = rows
        .iter()
        .zip(grid.iter())
        .skip(HEADER_ROWS)
        .enumerate()
        .map(|(row, (element, cells))| LocationLink {
            row,
            name: cell_text(cells, Some(name_col)).unwrap_or_default(),
            href: row_link(*element),
        })
        .collect();

    Ok(links)
}

/// One fetched copy of the listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSnapshot {
    html: String,
}

impl ListingSnapshot {
    /// Wraps listing HTML obtained elsewhere
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Metadata rows of this snapshot
    pub fn metadata(&self) -> Result<Vec<LocationMetadata>, ListingError> {
        parse_metadata(&self.html)
    }

    /// Detail links of this snapshot
    pub fn links(&self) -> Result<Vec<LocationLink>, ListingError> {
        parse_links(&self.html)
    }

    /// Metadata and links together, failing when their row counts differ
    pub fn parse_both(&self) -> Result<(Vec<LocationMetadata>, Vec<LocationLink>), ListingError> {
        let metadata = self.metadata()?;
        let links = self.links()?;

        if metadata.len() != links.len() {
            return Err(ListingError::Misaligned {
                metadata: metadata.len(),
                links: links.len(),
            });
        }

        Ok((metadata, links))
    }
}

/// Client for the state park listing page
#[derive(Debug, Clone)]
pub struct ListingClient<S = HttpSource> {
    source: S,
    config: ScraperConfig,
}

impl ListingClient<HttpSource> {
    /// Creates a client that fetches over HTTP
    pub fn new(config: ScraperConfig) -> Result<Self, FetchError> {
        let source = HttpSource::new(&config)?;
        Ok(Self { source, config })
    }
}

impl<S: PageSource> ListingClient<S> {
    /// Creates a client around any page source
    pub fn with_source(source: S, config: ScraperConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetches the listing page once
    pub async fn fetch_snapshot(&self) -> Result<ListingSnapshot, ListingError> {
        match self.source.fetch(&self.config.listing_url).await {
            Ok(page) => Ok(ListingSnapshot::new(page.body)),
            Err(e) => {
                warn!("Failed to retrieve the listing page {}: {}", self.config.listing_url, e);
                Err(e.into())
            }
        }
    }

    /// Fetches the listing page and returns its metadata rows
    pub async fn fetch_metadata(&self) -> Result<Vec<LocationMetadata>, ListingError> {
        self.fetch_snapshot().await?.metadata()
    }

    /// Fetches the listing page and returns its detail links
    pub async fn fetch_links(&self) -> Result<Vec<LocationLink>, ListingError> {
        self.fetch_snapshot().await?.links()
    }

    /// Builds the complete park table: metadata joined with coordinates
    ///
    /// The listing is fetched once; metadata and links come from that
    /// snapshot, coordinates are fetched per link, and the join verifies
    /// every row by park name.
    pub async fn fetch_park_table<T: PageSource>(
        &self,
        coordinates: &CoordinateClient<T>,
    ) -> Result<FinalLocationTable, ListingError> {
        let snapshot = self.fetch_snapshot().await?;
        let (metadata, links) = snapshot.parse_both()?;

        let found = coordinates.fetch_coordinates(&links).await;
        let table = assemble(metadata, found)?;

        info!("Assembled park table with {} rows", table.len());
        Ok(table)
    }
}
