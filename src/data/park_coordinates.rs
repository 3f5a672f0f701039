//! Park detail page coordinates

use std::sync::LazyLock;

use futures::stream::{self, StreamExt};
use reqwest::Url;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use super::coordinates::{convert_coordinates, CoordinateError};
use super::{Coordinate, LocationCoordinate, LocationLink};
use crate::config::ScraperConfig;
use crate::http::{FetchError, HttpSource, PageSource};
use crate::table::element_text;

static LATITUDE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.latitude").expect("invalid selector: latitude"));

static LONGITUDE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.longitude").expect("invalid selector: longitude"));

/// Reads the first latitude/longitude pair of a detail page
///
/// Returns `Ok(Coordinate::Unknown)` when the page has no coordinate markup
/// and an error when the markup holds text that is not a DMS coordinate.
pub fn parse_detail_page(html: &str) -> Result<Coordinate, CoordinateError> {
    let document = Html::parse_document(html);

    let latitude = document.select(&LATITUDE).next().map(element_text);
    let longitude = document.select(&LONGITUDE).next().map(element_text);

    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => convert_coordinates(&latitude, &longitude),
        _ => Ok(Coordinate::Unknown),
    }
}

/// Resolves a listing href against the site base URL
pub fn resolve_link(base_url: &str, href: &str) -> Result<String, FetchError> {
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .map_err(|e| FetchError::InvalidUrl(format!("{} + {}: {}", base_url, href, e)))
}

/// Client for fetching park coordinates from detail pages
#[derive(Debug, Clone)]
pub struct CoordinateClient<S = HttpSource> {
    source: S,
    config: ScraperConfig,
}

impl CoordinateClient<HttpSource> {
    /// Creates a client that fetches over HTTP
    pub fn new(config: ScraperConfig) -> Result<Self, FetchError> {
        let source = HttpSource::new(&config)?;
        Ok(Self { source, config })
    }
}

impl<S: PageSource> CoordinateClient<S> {
    /// Creates a client around any page source
    pub fn with_source(source: S, config: ScraperConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetches the coordinate for one link
    ///
    /// Every failure (no href, unreachable page, missing or malformed
    /// markup) is logged and yields [`Coordinate::Unknown`].
    pub async fn fetch_coordinate(&self, link: &LocationLink) -> Coordinate {
        let Some(href) = link.href.as_deref() else {
            warn!("No detail link for {}", link.name);
            return Coordinate::Unknown;
        };

        let url = match resolve_link(&self.config.wiki_base_url, href) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping {}: {}", link.name, e);
                return Coordinate::Unknown;
            }
        };

        let page = match self.source.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to retrieve the page {}: {}", url, e);
                return Coordinate::Unknown;
            }
        };

        match parse_detail_page(&page.body) {
            Ok(Coordinate::Unknown) => {
                info!("Coordinates not found on {}", url);
                Coordinate::Unknown
            }
            Ok(coordinate) => {
                debug!("Successfully retrieved data from {}", url);
                coordinate
            }
            Err(e) => {
                warn!("Unreadable coordinates on {}: {}", url, e);
                Coordinate::Unknown
            }
        }
    }

    /// Fetches coordinates for every link, one result per link in link order
    pub async fn fetch_coordinates(&self, links: &[LocationLink]) -> Vec<LocationCoordinate> {
        let found: Vec<LocationCoordinate> = stream::iter(links)
            .map(|link| async move {
                LocationCoordinate {
                    name: link.name.clone(),
                    coordinate: self.fetch_coordinate(link).await,
                }
            })
            .buffered(self.config.effective_concurrency())
            .collect()
            .await;

        let known = found.iter().filter(|c| c.coordinate.is_known()).count();
        info!("Found coordinates for {} of {} parks", known, found.len());

        found
    }
}
