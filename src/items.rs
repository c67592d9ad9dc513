use crate::error::{LayoutError, ScrapeError};
use crate::export::LinkFormatter;
use crate::fetch::PageStore;
use crate::infobox::{
    APARTMENT_IMAGE_SOURCE, VEHICLE_IMAGE_SOURCE, apartment_style, category, data_value,
    first_token, garage_capacity, image_url, info_panel,
};
use crate::listing::{ApartmentListing, extract_apartment_listings, extract_vehicle_stubs};
use crate::model::{Dataset, ItemStub, Speed};
use crate::modifications::{Modifications, VEHICLE_MODIFICATIONS, count_modifications};
use crate::normalize::normalize_filename;
use crate::table::{locate_drivetrain, locate_speed};
use scraper::Html;
use tracing::debug;

/// Shared shape of the two kinds of wiki items: built from a list page,
/// optionally enriched from a detail page, written as one CSV row.
pub trait ScrapedItem: Sized {
    const DATASET: Dataset;
    const CSV_HEADERS: &'static [&'static str];

    fn parse_list(doc: &Html, origin: &str) -> Result<Vec<Self>, LayoutError>;

    fn stub(&self) -> &ItemStub;

    /// Fills the detail fields from a parsed detail page. Missing landmarks
    /// leave their field `None`.
    fn apply_detail(&mut self, doc: &Html);

    fn csv_row(&self, links: &LinkFormatter) -> Vec<String>;

    /// Enriches the item from its detail page, fetching it when `refresh` is
    /// set or no local copy exists. Items without a page are left untouched
    /// and `false` is returned.
    fn extract_detail(&mut self, store: &PageStore<'_>, refresh: bool) -> Result<bool, ScrapeError> {
        let Some(url) = self.stub().detail_url.clone() else {
            return Ok(false);
        };

        let key = detail_page_key(Self::DATASET, &self.stub().name);
        let page = store.ensure(&key, &url, refresh)?;
        let doc = page.read_html()?;
        self.apply_detail(&doc);
        Ok(true)
    }
}

pub fn detail_page_key(dataset: Dataset, name: &str) -> String {
    format!("{}/{}", dataset.key(), normalize_filename(name))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vehicle {
    pub stub: ItemStub,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub vehicle_type: Option<String>,
    pub body_style: Option<String>,
    pub capacity: Option<String>,
    pub speed: Option<Speed>,
    pub drivetrain: Option<String>,
    pub modifications: Option<Modifications>,
}

impl Vehicle {
    pub fn new(stub: ItemStub) -> Self {
        Self {
            stub,
            ..Self::default()
        }
    }
}

impl ScrapedItem for Vehicle {
    const DATASET: Dataset = Dataset::Vehicles;
    const CSV_HEADERS: &'static [&'static str] = &[
        "name",
        "page url",
        "image url",
        "category",
        "type",
        "body style",
        "capacity",
        "speed (km/h)",
        "speed (mph)",
        "drivetrain",
        "modifications",
    ];

    fn parse_list(doc: &Html, origin: &str) -> Result<Vec<Self>, LayoutError> {
        Ok(extract_vehicle_stubs(doc, origin)?
            .into_iter()
            .map(Vehicle::new)
            .collect())
    }

    fn stub(&self) -> &ItemStub {
        &self.stub
    }

    fn apply_detail(&mut self, doc: &Html) {
        match info_panel(doc) {
            Some(panel) => {
                self.image_url = image_url(panel, &VEHICLE_IMAGE_SOURCE);
                self.category = category(panel);
                self.vehicle_type = data_value(panel, "type");
                self.body_style = data_value(panel, "body_style");
                self.capacity = data_value(panel, "capacity").map(|v| first_token(&v));
            }
            None => debug!(item = %self.stub.name, "no info panel"),
        }

        self.speed = locate_speed(doc);
        self.drivetrain = locate_drivetrain(doc);
        self.modifications = count_modifications(doc, VEHICLE_MODIFICATIONS);

        for (field, present) in [
            ("image", self.image_url.is_some()),
            ("category", self.category.is_some()),
            ("type", self.vehicle_type.is_some()),
            ("body style", self.body_style.is_some()),
            ("capacity", self.capacity.is_some()),
            ("speed", self.speed.is_some()),
            ("drivetrain", self.drivetrain.is_some()),
        ] {
            if !present {
                debug!(item = %self.stub.name, field, "field unknown");
            }
        }
    }

    fn csv_row(&self, links: &LinkFormatter) -> Vec<String> {
        let name = &self.stub.name;
        vec![
            name.clone(),
            links.format(self.stub.detail_url.as_deref().unwrap_or_default(), name),
            links.format(self.image_url.as_deref().unwrap_or_default(), name),
            self.category.clone().unwrap_or_default(),
            self.vehicle_type.clone().unwrap_or_default(),
            self.body_style.clone().unwrap_or_default(),
            self.capacity.clone().unwrap_or_default(),
            self.speed.as_ref().map(|s| s.kmh.clone()).unwrap_or_default(),
            self.speed.as_ref().map(|s| s.mph.clone()).unwrap_or_default(),
            self.drivetrain.clone().unwrap_or_default(),
            self.modifications
                .as_ref()
                .map(Modifications::to_json)
                .unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Apartment {
    pub stub: ItemStub,
    pub category: String,
    pub price: String,
    pub notes: String,
    pub image_url: Option<String>,
    pub style: Option<String>,
    pub garage_capacity: Option<String>,
}

impl From<ApartmentListing> for Apartment {
    fn from(listing: ApartmentListing) -> Self {
        Self {
            stub: listing.stub,
            category: listing.category,
            price: listing.price,
            notes: listing.notes,
            image_url: None,
            style: None,
            garage_capacity: None,
        }
    }
}

impl ScrapedItem for Apartment {
    const DATASET: Dataset = Dataset::Apartments;
    const CSV_HEADERS: &'static [&'static str] = &[
        "name",
        "link",
        "image url",
        "category",
        "style",
        "garage capacity",
        "price",
        "notes",
    ];

    fn parse_list(doc: &Html, origin: &str) -> Result<Vec<Self>, LayoutError> {
        Ok(extract_apartment_listings(doc, origin)?
            .into_iter()
            .map(Apartment::from)
            .collect())
    }

    fn stub(&self) -> &ItemStub {
        &self.stub
    }

    fn apply_detail(&mut self, doc: &Html) {
        let Some(panel) = info_panel(doc) else {
            debug!(item = %self.stub.name, "no info panel");
            return;
        };

        self.image_url = image_url(panel, &APARTMENT_IMAGE_SOURCE);
        self.style = apartment_style(panel);
        self.garage_capacity = garage_capacity(panel);
        if self.style.is_none() {
            debug!(item = %self.stub.name, "style unknown");
        }
        if self.garage_capacity.is_none() {
            debug!(item = %self.stub.name, "garage capacity unknown");
        }
    }

    fn csv_row(&self, links: &LinkFormatter) -> Vec<String> {
        let name = &self.stub.name;
        vec![
            name.clone(),
            links.format(self.stub.detail_url.as_deref().unwrap_or_default(), name),
            links.format(self.image_url.as_deref().unwrap_or_default(), name),
            self.category.clone(),
            self.style.clone().unwrap_or_default(),
            self.garage_capacity.clone().unwrap_or_default(),
            self.price.clone(),
            self.notes.clone(),
        ]
    }
}
