//! HTML table helpers shared by the page parsers
//!
//! Both sites publish their data in `<table>` elements with multi-row headers.
//! These helpers collect a table's own rows, coerce cells to normalised text
//! and expand `colspan`/`rowspan` so every row lines up column for column.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

/// Upper bound for span attributes; larger values are treated as malformed
const MAX_SPAN: usize = 1000;

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));

static FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("invalid regex: footnote"));

/// Collapses runs of whitespace (including non-breaking spaces) into single spaces
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text of an element, whitespace-normalised
pub fn element_text(element: ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Removes bracketed footnote markers such as `[1]` or `[a]`
pub fn strip_footnotes(text: &str) -> String {
    normalize_whitespace(&FOOTNOTE.replace_all(text, ""))
}

/// Rows that belong to `table` itself, skipping rows of nested tables
pub fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    table
        .select(&ROW_SELECTOR)
        .filter(|row| {
            row.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "table")
                .map(|owner| owner.id())
                == Some(table.id())
        })
        .collect()
}

/// Direct `th`/`td` children of a row
pub fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "th" | "td"))
        .collect()
}

/// Text of each direct cell of a row, without span expansion
pub fn row_texts(row: ElementRef) -> Vec<String> {
    row_cells(row).into_iter().map(element_text).collect()
}

fn span_attr(cell: ElementRef, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|span| (1..=MAX_SPAN).contains(span))
        .unwrap_or(1)
}

/// Takes the text a rowspan carries into `col`, if any
fn take_carried(carried: &mut [Option<(String, usize)>], col: usize) -> Option<String> {
    let slot = carried.get_mut(col)?;
    let (text, remaining) = slot.as_mut()?;
    let text = text.clone();
    *remaining -= 1;
    if *remaining == 0 {
        *slot = None;
    }
    Some(text)
}

/// Expands rows into a text grid, repeating spanned cells in every column
/// and row they cover
pub fn expand_rows(rows: &[ElementRef]) -> Vec<Vec<String>> {
    let mut carried: Vec<Option<(String, usize)>> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut out = Vec::new();
        let mut col = 0;

        for cell in row_cells(*row) {
            while let Some(text) = take_carried(&mut carried, col) {
                out.push(text);
                col += 1;
            }

            let text = element_text(cell);
            let colspan = span_attr(cell, "colspan");
            let rowspan = span_attr(cell, "rowspan");

            for _ in 0..colspan {
                if carried.len() <= col {
                    carried.resize(col + 1, None);
                }
                // A wide cell overlapping an earlier rowspan takes its place in this row
                take_carried(&mut carried, col);
                if rowspan > 1 {
                    carried[col] = Some((text.clone(), rowspan - 1));
                }
                out.push(text.clone());
                col += 1;
            }
        }

        // Spans from earlier rows that reach past this row's last cell
        if let Some(last) = carried.iter().rposition(Option::is_some) {
            while col <= last {
                out.push(take_carried(&mut carried, col).unwrap_or_default());
                col += 1;
            }
        }

        grid.push(out);
    }

    grid
}
