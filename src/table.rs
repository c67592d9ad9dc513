//! Tabular metric lookup for statistics tables whose header and data rows do
//! not line up cell for cell.

use crate::dom::{child_elements, closest, element_text, selector};
use crate::model::Speed;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::{debug, warn};

pub static SPEED_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:velocity|top speed)\b").expect("speed header regex must compile")
});
pub static DRIVETRAIN_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdrivetrain\b").expect("drivetrain header regex must compile"));

/// Resolves the value of the metric whose header cell matches `header`.
///
/// The first matching `<th>` in document order owns the metric. Its column is
/// its position among the header cells of its row. The value is read from the
/// first later row of the same table that has a `<td>`; rows made only of
/// `<th>` (unit labels and the like) are skipped. When that data row opens
/// with a `<th>` label, the `<td>` index is one less than the header column.
/// Only a single leading label column is accounted for.
pub fn locate_metric(doc: &Html, metric: &str, header: &Regex) -> Option<String> {
    let Some(header_cell) = doc
        .select(&selector("th"))
        .find(|th| header.is_match(&element_text(*th)))
    else {
        debug!(metric, "metric header not found");
        return None;
    };

    let header_row = closest(header_cell, "tr")?;
    let column = child_elements(header_row, "th")
        .iter()
        .position(|th| th.id() == header_cell.id())?;

    let Some(data_row) = closest(header_row, "table").and_then(|table| {
        rows_after(table, header_row).find(|row| !child_elements(*row, "td").is_empty())
    }) else {
        warn!(metric, "metric header has no data row beneath it");
        return None;
    };

    let index = if child_elements(data_row, "th").is_empty() {
        Some(column)
    } else {
        column.checked_sub(1)
    };

    let value = index.and_then(|i| child_elements(data_row, "td").get(i).copied());
    match value {
        Some(cell) => Some(element_text(cell)),
        None => {
            warn!(metric, column, "metric column has no matching data cell");
            None
        }
    }
}

fn rows_after<'a>(
    table: ElementRef<'a>,
    header_row: ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> {
    let header_id = header_row.id();
    table
        .select(&selector("tr"))
        .collect::<Vec<_>>()
        .into_iter()
        .skip_while(move |row| row.id() != header_id)
        .skip(1)
}

/// `"100 / 62"` -> km/h `"100"`, mph `"62"`. Both halves are required.
pub fn parse_speed(text: &str) -> Option<Speed> {
    let mut parts = text.split('/');
    let kmh = strip_whitespace(parts.next()?);
    let mph = strip_whitespace(parts.next()?);
    if kmh.is_empty() || mph.is_empty() {
        return None;
    }
    Some(Speed { kmh, mph })
}

pub fn locate_speed(doc: &Html) -> Option<Speed> {
    let text = locate_metric(doc, "speed", &SPEED_HEADER)?;
    let speed = parse_speed(&text);
    if speed.is_none() {
        warn!(value = %text, "speed cell is not a km/h / mph pair");
    }
    speed
}

pub fn locate_drivetrain(doc: &Html) -> Option<String> {
    locate_metric(doc, "drivetrain", &DRIVETRAIN_HEADER)
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
