//! Landing-page parsing: turns a wiki list page into ordered item stubs.

use crate::dom::{absolutize_url, child_elements, element_text, selector};
use crate::error::LayoutError;
use crate::model::ItemStub;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::debug;

pub const LIST_TABLE_CLASS: &str = "wikitable";
pub const MISSING_PAGE_SUFFIX: &str = " (page does not exist)";
pub const UNTITLED_ITEM: &str = "No title attribute";

static APARTMENT_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)apartment").expect("apartment section regex must compile"));

/// One row of the apartments list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApartmentListing {
    pub stub: ItemStub,
    pub category: String,
    pub price: String,
    pub notes: String,
}

/// The *last* `table.wikitable` is the authoritative vehicle list; each of its
/// `<li>` elements is one vehicle.
pub fn extract_vehicle_stubs(doc: &Html, origin: &str) -> Result<Vec<ItemStub>, LayoutError> {
    let table = doc
        .select(&selector("table.wikitable"))
        .last()
        .ok_or(LayoutError::MissingListTable {
            dataset: "vehicles",
            marker: LIST_TABLE_CLASS,
        })?;

    let stubs: Vec<ItemStub> = table
        .select(&selector("li"))
        .map(|item| stub_from_list_item(item, origin))
        .collect();

    debug!(items = stubs.len(), "vehicle list extracted");
    Ok(stubs)
}

fn stub_from_list_item(item: ElementRef<'_>, origin: &str) -> ItemStub {
    if let Some(span) = item.select(&selector("span")).next()
        && span.value().attr("data-uncrawlable-url").is_some()
    {
        let title = span.value().attr("title").unwrap_or_default();
        return ItemStub::new(title.replace(MISSING_PAGE_SUFFIX, "").trim(), None);
    }

    let Some(anchor) = item.select(&selector("a")).next() else {
        let name = element_text(item);
        debug!(item = %name, "list item without a link");
        return ItemStub::new(name, None);
    };

    let title = anchor.value().attr("title").unwrap_or(UNTITLED_ITEM);
    if let Some(name) = title.strip_suffix(MISSING_PAGE_SUFFIX) {
        return ItemStub::new(name.trim(), None);
    }

    let detail_url = anchor
        .value()
        .attr("href")
        .map(|href| absolutize_url(origin, href));
    ItemStub::new(title, detail_url)
}

/// Every `table.wikitable` is one apartment category. The first two rows of
/// each table are its title and column headers; data cells are address,
/// price and notes.
pub fn extract_apartment_listings(
    doc: &Html,
    origin: &str,
) -> Result<Vec<ApartmentListing>, LayoutError> {
    let tables: Vec<ElementRef<'_>> = doc.select(&selector("table.wikitable")).collect();
    if tables.is_empty() {
        return Err(LayoutError::MissingListTable {
            dataset: "apartments",
            marker: LIST_TABLE_CLASS,
        });
    }

    let mut listings = Vec::new();
    for table in tables {
        let category = section_category(table);
        for row in table.select(&selector("tr")).skip(2) {
            let cells = child_elements(row, "td");
            let [address, price, notes, ..] = cells.as_slice() else {
                debug!(category = %category, cells = cells.len(), "skipping short apartment row");
                continue;
            };

            let detail_url = address
                .select(&selector("a"))
                .next()
                .and_then(|anchor| anchor.value().attr("href"))
                .map(|href| absolutize_url(origin, href));

            listings.push(ApartmentListing {
                stub: ItemStub::new(element_text(*address), detail_url),
                category: category.clone(),
                price: normalize_price(&element_text(*price)),
                notes: element_text(*notes),
            });
        }
    }

    debug!(items = listings.len(), "apartment list extracted");
    Ok(listings)
}

fn section_category(table: ElementRef<'_>) -> String {
    table
        .text()
        .map(str::trim)
        .find(|text| APARTMENT_SECTION.is_match(text))
        .map(|text| text.replace("List of ", "").trim().to_string())
        .unwrap_or_default()
}

pub fn normalize_price(price: &str) -> String {
    price.replace(['$', ','], "").trim().to_string()
}
