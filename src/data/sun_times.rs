//! Sun times client
//!
//! Resolves a location name through the site's search endpoint, then fetches
//! the twelve month pages of the target year and concatenates the parsed
//! tables into one year of daily records.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::sun_table::parse_month_page;
use super::{ExtraColumns, LocationAstroTable};
use crate::config::ScraperConfig;
use crate::http::{FetchError, HttpSource, Page, PageSource};

/// Errors that signal a location has no sun table
#[derive(Debug, Error)]
pub enum SunTimesError {
    /// The search request for the location failed
    #[error("Could not resolve location '{location}': {source}")]
    Unresolved {
        location: String,
        #[source]
        source: FetchError,
    },

    /// No month page produced any data
    #[error("Can't find data for '{location}'")]
    NoData { location: String },
}

/// Builds the search URL for a location name
pub fn search_url(base_url: &str, location: &str) -> Result<String, FetchError> {
    Url::parse_with_params(base_url, &[("query", location)])
        .map(|url| url.to_string())
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))
}

/// Builds the URL of one month page from a location's canonical page
///
/// Any query or fragment on the canonical page is replaced.
pub fn month_url(page_url: &str, month: u32, year: i32) -> Result<String, FetchError> {
    let mut url =
        Url::parse(page_url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", page_url, e)))?;
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("month", &month.to_string())
        .append_pair("year", &year.to_string());
    Ok(url.to_string())
}

/// Client for fetching a year of sun times per location
#[derive(Debug, Clone)]
pub struct SunTimesClient<S = HttpSource> {
    source: S,
    config: ScraperConfig,
}

impl SunTimesClient<HttpSource> {
    /// Creates a client that fetches over HTTP
    pub fn new(config: ScraperConfig) -> Result<Self, FetchError> {
        let source = HttpSource::new(&config)?;
        Ok(Self { source, config })
    }
}

impl<S: PageSource> SunTimesClient<S> {
    /// Creates a client around any page source
    pub fn with_source(source: S, config: ScraperConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Resolves a location name to the URL of its sun page
    pub async fn resolve(&self, location: &str) -> Result<String, SunTimesError> {
        let unresolved = |source: FetchError| SunTimesError::Unresolved {
            location: location.to_string(),
            source,
        };

        let url = search_url(&self.config.sun_base_url, location).map_err(unresolved)?;

        match self.source.fetch(&url).await {
            Ok(page) => {
                debug!("Resolved {} to {}", location, page.url);
                Ok(page.url)
            }
            Err(e) => {
                warn!("Error in the search request for {}: {}", location, e);
                Err(unresolved(e))
            }
        }
    }

    /// Fetches the configured year for a location
    pub async fn fetch_default_year(&self, location: &str) -> Result<LocationAstroTable, SunTimesError> {
        self.fetch_year(location, self.config.year).await
    }

    /// Fetches one year of daily sun times for a location
    ///
    /// # Arguments
    /// * `location` - Free-text location name used as the search query
    /// * `year` - Calendar year to fetch
    ///
    /// # Returns
    /// * `Ok(LocationAstroTable)` - Days of every month that parsed, in month order
    /// * `Err(SunTimesError::Unresolved)` - The search request failed
    /// * `Err(SunTimesError::NoData)` - No month page could be fetched and parsed
    ///
    /// # Behavior
    /// - Month pages are fetched with bounded concurrency, results kept in month order
    /// - A month that fails to fetch or parse is skipped
    /// - A month whose columns differ from the first parsed month is skipped
    /// - Days already seen are dropped so each date appears once
    pub async fn fetch_year(&self, location: &str, year: i32) -> Result<LocationAstroTable, SunTimesError> {
        let page_url = self.resolve(location).await?;
        let pages = self.fetch_months(&page_url, year).await;

        let mut columns: Option<ExtraColumns> = None;
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for (month, page) in pages {
            let Some(page) = page else { continue };

            let Some(table) = parse_month_page(&page.body) else {
                debug!("No sun table for {} in {}-{}", location, year, month);
                continue;
            };

            let schema_matches = columns
                .as_ref()
                .map_or(true, |existing| *existing == table.columns);
            if !schema_matches {
                warn!(
                    "Skipping {}-{} for {}: columns differ from earlier months",
                    year, month, location
                );
                continue;
            }
            if columns.is_none() {
                columns = Some(table.columns.clone());
            }

            for record in table.records {
                if seen.insert(record.date) {
                    records.push(record);
                } else {
                    debug!("Dropping repeated day {} for {}", record.date, location);
                }
            }
        }

        let Some(columns) = columns else {
            warn!("Can't find data for {}", location);
            return Err(SunTimesError::NoData {
                location: location.to_string(),
            });
        };

        info!(
            "Successfully retrieved data for {} ({} days)",
            location,
            records.len()
        );

        Ok(LocationAstroTable {
            location: location.to_string(),
            columns,
            records,
        })
    }

    /// Fetches the twelve month pages, `None` for months that failed
    async fn fetch_months(&self, page_url: &str, year: i32) -> Vec<(u32, Option<Page>)> {
        stream::iter(1..=12u32)
            .map(|month| {
                let url = month_url(page_url, month, year);
                async move {
                    let result = match url {
                        Ok(url) => self.source.fetch(&url).await,
                        Err(e) => Err(e),
                    };
                    match result {
                        Ok(page) => (month, Some(page)),
                        Err(e) => {
                            warn!("Error in the request for {}-{}: {}", year, month, e);
                            (month, None)
                        }
                    }
                }
            })
            .buffered(self.config.effective_concurrency())
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sun_table::fixture::month_page;
    use crate::http::fixture::DelayedSource;
    use crate::http::FixtureSource;
    use chrono::{Datelike, NaiveDate};
    use std::time::Duration;

    const SUN_BASE: &str = "http://sun.test/sun/";
    const PARK: &str = "Anza-Borrego Desert State Park";
    const PARK_PAGE: &str = "http://sun.test/sun/usa/borrego-springs";

    fn config() -> ScraperConfig {
        ScraperConfig::default().with_sun_base_url(SUN_BASE)
    }

    fn source_with_months(months: impl IntoIterator<Item = u32>) -> FixtureSource {
        let mut source = FixtureSource::new()
            .with_redirect(search_url(SUN_BASE, PARK).unwrap(), PARK_PAGE)
            .with_page(PARK_PAGE, "<html><body>Borrego Springs</body></html>");
        for month in months {
            source = source.with_page(
                month_url(PARK_PAGE, month, 2024).unwrap(),
                month_page(2024, month, 1..=2),
            );
        }
        source
    }

    #[test]
    fn test_search_url_encodes_query() {
        assert_eq!(
            search_url(SUN_BASE, PARK).unwrap(),
            "http://sun.test/sun/?query=Anza-Borrego+Desert+State+Park"
        );
        assert!(search_url("not a url", PARK).is_err());
    }

    #[test]
    fn test_month_url_replaces_query() {
        assert_eq!(
            month_url(PARK_PAGE, 3, 2024).unwrap(),
            "http://sun.test/sun/usa/borrego-springs?month=3&year=2024"
        );
        assert_eq!(
            month_url("http://sun.test/sun/?query=x#top", 12, 2025).unwrap(),
            "http://sun.test/sun/?month=12&year=2025"
        );
    }

    #[tokio::test]
    async fn test_fetch_year_concatenates_months_in_order() {
        let client = SunTimesClient::with_source(source_with_months(1..=12), config());

        let table = client.fetch_year(PARK, 2024).await.unwrap();

        assert_eq!(table.location, PARK);
        assert_eq!(table.len(), 24);
        let months: Vec<u32> = table.records.iter().map(|r| r.date.month()).collect();
        let mut sorted = months.clone();
        sorted.sort();
        assert_eq!(months, sorted);
        assert_eq!(table.records[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(table.records[23].date, NaiveDate::from_ymd_opt(2024, 12, 2).unwrap());
    }

    /// Earlier months answer later: January waits longest, December not at all
    fn later_months_first(url: &str) -> Duration {
        let month = Url::parse(url)
            .ok()
            .and_then(|url| {
                url.query_pairs()
                    .find(|(key, _)| key == "month")
                    .and_then(|(_, value)| value.parse::<u64>().ok())
            })
            .unwrap_or(12);
        Duration::from_millis((12 - month) * 15)
    }

    #[tokio::test]
    async fn test_month_order_survives_out_of_order_answers() {
        let source = DelayedSource {
            inner: source_with_months(1..=12),
            delay: later_months_first,
        };
        let client = SunTimesClient::with_source(source, config().with_concurrency(8));

        let table = client.fetch_year(PARK, 2024).await.unwrap();

        let months: Vec<u32> = table.records.iter().map(|r| r.date.month()).collect();
        let expected: Vec<u32> = (1..=12).flat_map(|m| [m, m]).collect();
        assert_eq!(months, expected);
    }

    #[tokio::test]
    async fn test_failed_month_is_skipped() {
        let client = SunTimesClient::with_source(
            source_with_months((1..=12).filter(|m| *m != 3)),
            config(),
        );

        let table = client.fetch_year(PARK, 2024).await.unwrap();

        assert_eq!(table.len(), 22);
        assert!(table.records.iter().all(|r| r.date.month() != 3));
    }

    #[tokio::test]
    async fn test_unresolved_location() {
        let client = SunTimesClient::with_source(FixtureSource::new(), config());

        let err = client.fetch_year("Atlantis", 2024).await.unwrap_err();
        match err {
            SunTimesError::Unresolved { location, source } => {
                assert_eq!(location, "Atlantis");
                assert!(matches!(source, FetchError::Status { status: 404, .. }));
            }
            other => panic!("Expected Unresolved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_months_is_no_data() {
        let client = SunTimesClient::with_source(source_with_months([]), config());

        let err = client.fetch_year(PARK, 2024).await.unwrap_err();
        assert!(matches!(err, SunTimesError::NoData { ref location } if location == PARK));
        assert_eq!(err.to_string(), format!("Can't find data for '{}'", PARK));
    }

    #[tokio::test]
    async fn test_repeated_pages_do_not_duplicate_days() {
        // A site that ignores the month parameter serves January every time
        let mut source = source_with_months([]);
        for month in 1..=12 {
            source = source.with_page(month_url(PARK_PAGE, month, 2024).unwrap(), month_page(2024, 1, 1..=2));
        }
        let client = SunTimesClient::with_source(source, config());

        let table = client.fetch_year(PARK, 2024).await.unwrap();
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_month_with_different_columns_is_skipped() {
        let odd_page = month_page(2024, 2, 1..=2).replace("<th>Mil. km</th>", "<th>Distance</th>");
        let source = source_with_months([1]).with_page(month_url(PARK_PAGE, 2, 2024).unwrap(), odd_page);
        let client = SunTimesClient::with_source(source, config());

        let table = client.fetch_year(PARK, 2024).await.unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.records.iter().all(|r| r.date.month() == 1));
    }

    #[tokio::test]
    async fn test_fetch_default_year_uses_config() {
        let client = SunTimesClient::with_source(source_with_months(1..=12), config().with_year(2024));

        let table = client.fetch_default_year(PARK).await.unwrap();
        assert_eq!(table.records[0].date.year(), 2024);
    }

    #[tokio::test]
    async fn test_requests_search_then_every_month() {
        let source = source_with_months(1..=12);
        let client = SunTimesClient::with_source(source, config().with_concurrency(1));

        client.fetch_year(PARK, 2024).await.unwrap();

        let requests = client.source.requests();
        assert_eq!(requests.len(), 13);
        assert_eq!(requests[0], search_url(SUN_BASE, PARK).unwrap());
        for month in 1..=12u32 {
            assert_eq!(requests[month as usize], month_url(PARK_PAGE, month, 2024).unwrap());
        }
    }
}
