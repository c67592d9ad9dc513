use crate::cache::check_timestamp_key;
use serde::Serialize;

/// The two wiki lists this tool tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Vehicles,
    Apartments,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Vehicles, Dataset::Apartments];

    /// Cache key holding the list's last known item count; also the
    /// sub-directory for detail pages and the CSV file stem.
    pub fn key(self) -> &'static str {
        match self {
            Dataset::Vehicles => "vehicles",
            Dataset::Apartments => "apartments",
        }
    }

    pub fn check_timestamp_key(self) -> String {
        check_timestamp_key(self.key())
    }
}

/// A list entry before enrichment. `detail_url` is `None` when the wiki has no
/// page for the item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemStub {
    pub name: String,
    pub detail_url: Option<String>,
}

impl ItemStub {
    pub fn new(name: impl Into<String>, detail_url: Option<String>) -> Self {
        Self {
            name: name.into(),
            detail_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Speed {
    pub kmh: String,
    pub mph: String,
}

/// Items of one list, in source order.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapedList<T> {
    pub item_count: usize,
    pub items: Vec<T>,
}

impl<T> ScrapedList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            item_count: items.len(),
            items,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetReport {
    pub dataset: String,
    pub items: usize,
    pub count_changed: bool,
    pub refreshed: bool,
    pub enriched: usize,
    pub without_page: usize,
    pub pages_fetched: usize,
    pub csv_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub list_pages_refreshed: bool,
    pub datasets: Vec<DatasetReport>,
}
