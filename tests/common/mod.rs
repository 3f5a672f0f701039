//! Shared fixture pages for the integration tests
#![allow(dead_code)]

use parkscout::FixtureSource;

pub const SUN_BASE: &str = "http://sun.test/sun/";
pub const WIKI: &str = "http://wiki.test";
pub const LISTING_URL: &str = "http://wiki.test/wiki/List_of_California_state_parks#List_of_parks";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Same templates as the crate's own parser tests
const MONTH_PAGE: &str = include_str!("../fixtures/month_page.html");
const MONTH_DAY_ROW: &str = include_str!("../fixtures/month_day_row.html");

/// Routes log output through the test harness
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A month page with one row per day, matching the live site's table layout
pub fn month_page(year: i32, month: u32, days: impl IntoIterator<Item = u32>) -> String {
    let rows: String = days
        .into_iter()
        .map(|day| MONTH_DAY_ROW.trim().replace("{day}", &day.to_string()))
        .collect();

    MONTH_PAGE
        .replace("{year}", &year.to_string())
        .replace("{month}", MONTHS[(month - 1) as usize])
        .replace("{rows}", &rows)
}

/// A sun site serving `location` with the given months of `year`
pub fn sun_site(location: &str, page: &str, year: i32, months: impl IntoIterator<Item = u32>) -> FixtureSource {
    let search = parkscout::data::sun_times::search_url(SUN_BASE, location).expect("search url");
    let mut source = FixtureSource::new()
        .with_redirect(search, page)
        .with_page(page, "<html><body>Sun</body></html>");
    for month in months {
        let url = parkscout::data::sun_times::month_url(page, month, year).expect("month url");
        source = source.with_page(url, month_page(year, month, 1..=3));
    }
    source
}

/// The listing page: a two-level header and one row per park
pub fn listing_page() -> String {
    "<html><body>\
     <div class=\"hatnote\">For federal parks, see elsewhere.</div>\
     <table class=\"wikitable sortable\"><tbody>\
     <tr><th rowspan=\"2\">Park name</th><th rowspan=\"2\">County or<br>counties</th>\
     <th colspan=\"2\">Size</th><th rowspan=\"2\">Year established<sup>[1]</sup></th>\
     <th rowspan=\"2\">Remarks</th></tr>\
     <tr><th>acres</th><th>ha</th></tr>\
     <tr><th scope=\"row\"><a href=\"/wiki/Crystal_Cove_State_Park\">Crystal Cove State Park</a></th>\
     <td>Orange</td><td>3,936</td><td>1,593</td><td>1979</td><td>Historic cottages</td></tr>\
     <tr><th scope=\"row\"><a href=\"/wiki/Ahjumawi_Lava_Springs_State_Park\">Ahjumawi Lava Springs State Park</a>\
     <sup><a href=\"#cite_note-1\">[a]</a></sup></th>\
     <td>Shasta</td><td>6,000</td><td>2,400</td><td>1975</td><td>Boat access only</td></tr>\
     <tr><th scope=\"row\">Unlinked Beach</th><td>Marin</td><td>12</td><td>4.9</td><td>—</td><td></td></tr>\
     <tr><th scope=\"row\"><a href=\"/wiki/Quiet_Park\">Quiet Park</a></th>\
     <td>Inyo</td><td>100</td><td>40</td><td>2001</td><td>No map</td></tr>\
     </tbody></table>\
     <table class=\"navbox\"><tr><td>State parks of California</td></tr></table>\
     </body></html>"
        .to_string()
}

/// A detail page carrying the geo microformat
pub fn detail_page(latitude: &str, longitude: &str) -> String {
    format!(
        "<html><body><table class=\"infobox\"><tr><td>\
         <span class=\"geo-dms\"><span class=\"latitude\">{}</span> \
         <span class=\"longitude\">{}</span></span>\
         </td></tr></table></body></html>",
        latitude, longitude
    )
}

/// The encyclopedia: listing page plus detail pages
pub fn wiki_site() -> FixtureSource {
    FixtureSource::new()
        .with_page(LISTING_URL, listing_page())
        .with_page(
            format!("{}/wiki/Crystal_Cove_State_Park", WIKI),
            detail_page("33°34′32″N", "117°50′25″W"),
        )
        .with_page(
            format!("{}/wiki/Ahjumawi_Lava_Springs_State_Park", WIKI),
            detail_page("41°7′N", "121°26′W"),
        )
        .with_page(
            format!("{}/wiki/Quiet_Park", WIKI),
            "<html><body><p>No coordinates here.</p></body></html>",
        )
}
