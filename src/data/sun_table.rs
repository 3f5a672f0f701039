//! Month page parser for the sun/solar-time site
//!
//! A month page carries one `table#as-monthsun` with two header rows: the
//! first names column groups (year, sunrise/sunset, day length, the three
//! twilight phases, solar noon) and the second names the columns inside each
//! group, starting with the month abbreviation. Sunrise, sunset and solar noon
//! cells are compound (`6:45 am ↑ (64°)`) and are split into time and angle.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::{DailyAstroRecord, ExtraColumns, MonthTable};
use crate::table::{expand_rows, row_texts, table_rows};

/// Header rows plus the spacer row preceding the first day
const FIRST_DATA_ROW: usize = 3;

static MONTH_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table#as-monthsun").expect("invalid selector: month table"));

static RISE_SET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+:\d+ [apm]+) ↑ \((\d+)°\)").expect("invalid regex: sunrise/sunset")
});

static SOLAR_NOON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+:\d+ [apm]+) \(([\d.]+)°\)").expect("invalid regex: solar noon")
});

/// Where each required column sits and how the extras are named
#[derive(Debug)]
struct Layout {
    year: String,
    month: String,
    sunrise: usize,
    sunset: usize,
    noon: usize,
    /// (column index, merged name) for every other column except the date
    extras: Vec<(usize, String)>,
    width: usize,
}

impl Layout {
    fn from_headers(groups: &[String], subs: &[String]) -> Option<Self> {
        if groups.len() != subs.len() || subs.is_empty() {
            return None;
        }

        let position = |label: &str| subs.iter().position(|sub| sub == label);
        let sunrise = position("Sunrise")?;
        let sunset = position("Sunset")?;
        let noon = position("Time")?;

        let extras = (1..subs.len())
            .filter(|col| ![sunrise, sunset, noon].contains(col))
            .map(|col| (col, merge_header(&groups[col], &subs[col])))
            .collect();

        Some(Self {
            year: groups[0].clone(),
            month: subs[0].clone(),
            sunrise,
            sunset,
            noon,
            extras,
            width: subs.len(),
        })
    }

    fn columns(&self) -> ExtraColumns {
        let (before, after): (Vec<_>, Vec<_>) =
            self.extras.iter().partition(|(col, _)| *col < self.noon);
        ExtraColumns {
            before_noon: before.into_iter().map(|(_, name)| name.clone()).collect(),
            after_noon: after.into_iter().map(|(_, name)| name.clone()).collect(),
        }
    }

    fn parse_row(&self, cells: &[String]) -> Option<DailyAstroRecord> {
        if cells.len() != self.width {
            return None;
        }

        let date = NaiveDate::parse_from_str(
            &format!("{} {} {}", self.year, self.month, cells[0]),
            "%Y %b %d",
        )
        .ok()?;

        let (sunrise_time, sunrise_angle) = split_rise_set(&cells[self.sunrise])?;
        let (sunset_time, sunset_angle) = split_rise_set(&cells[self.sunset])?;
        let (solar_noon_time, solar_noon_angle) = split_solar_noon(&cells[self.noon])?;

        // Extras are ordered by column, which already puts pre-noon columns first
        let extra = self.extras.iter().map(|(col, _)| cells[*col].clone()).collect();

        Some(DailyAstroRecord {
            date,
            sunrise_time,
            sunrise_angle,
            sunset_time,
            sunset_angle,
            solar_noon_time,
            solar_noon_angle,
            extra,
        })
    }
}

/// `"<group> (<sub>)"`, or the sub-header alone when the group adds nothing
fn merge_header(group: &str, sub: &str) -> String {
    if group.is_empty() || group == sub {
        sub.to_string()
    } else {
        format!("{} ({})", group, sub)
    }
}

/// Splits `"6:45 am ↑ (64°)"` into `("6:45 am", 64)`
fn split_rise_set(cell: &str) -> Option<(String, u32)> {
    let caps = RISE_SET.captures(cell)?;
    let angle = caps[2].parse().ok()?;
    Some((caps[1].to_string(), angle))
}

/// Splits `"12:08 pm (88.8°)"` into `("12:08 pm", 88.8)`
fn split_solar_noon(cell: &str) -> Option<(String, f64)> {
    let caps = SOLAR_NOON.captures(cell)?;
    let angle = caps[2].parse().ok()?;
    Some((caps[1].to_string(), angle))
}

/// Parses one month page into a table of daily records
///
/// Returns `None` when the page does not have the expected structure: the
/// table is missing, its headers cannot be matched, or no day row survives.
/// Day rows that fail to parse are dropped.
pub fn parse_month_page(html: &str) -> Option<MonthTable> {
    let document = Html::parse_document(html);

    let Some(table) = document.select(&MONTH_TABLE).next() else {
        debug!("month table not found");
        return None;
    };

    let rows = table_rows(table);
    if rows.len() < 2 {
        debug!(rows = rows.len(), "month table has no header rows");
        return None;
    }

    let headers = expand_rows(&rows[..2]);
    let Some(layout) = Layout::from_headers(&headers[0], &headers[1]) else {
        debug!(groups = ?headers[0], subs = ?headers[1], "month table headers not recognised");
        return None;
    };

    // The last row is the table's footnote
    let data_rows = if rows.len() > FIRST_DATA_ROW {
        &rows[FIRST_DATA_ROW..rows.len() - 1]
    } else {
        &rows[..0]
    };

    let mut records = Vec::with_capacity(data_rows.len());
    for row in data_rows {
        let cells = row_texts(*row);
        match layout.parse_row(&cells) {
            Some(record) => records.push(record),
            None => debug!(?cells, "dropping unparsable day row"),
        }
    }

    if records.is_empty() {
        debug!(year = %layout.year, month = %layout.month, "month table has no day rows");
        return None;
    }

    Some(MonthTable {
        columns: layout.columns(),
        records,
    })
}

#[cfg(test)]
pub(crate) mod fixture {
    //! Month pages shaped like the live site, for tests
    //!
    //! The templates are shared with the integration tests under `tests/fixtures`.

    const PAGE: &str = include_str!("../../tests/fixtures/month_page.html");
    const DAY_ROW: &str = include_str!("../../tests/fixtures/month_day_row.html");

    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    pub fn day_row(day: u32) -> String {
        DAY_ROW.trim().replace("{day}", &day.to_string())
    }

    pub fn page(year: i32, month: u32, body_rows: &str) -> String {
        PAGE.replace("{year}", &year.to_string())
            .replace("{month}", MONTHS[(month - 1) as usize])
            .replace("{rows}", body_rows)
    }

    pub fn month_page(year: i32, month: u32, days: impl IntoIterator<Item = u32>) -> String {
        let rows: String = days.into_iter().map(day_row).collect();
        page(year, month, &rows)
    }
}
