use anyhow::Result;
use scraper::Html;
use wikiscrape::export::LinkFormatter;
use wikiscrape::infobox::{data_value, info_panel, strip_annotation};
use wikiscrape::items::{Apartment, ScrapedItem, Vehicle, detail_page_key};
use wikiscrape::listing::ApartmentListing;
use wikiscrape::model::{Dataset, ItemStub, Speed};

fn fixture(name: &str) -> Result<Html> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    Ok(Html::parse_document(&std::fs::read_to_string(path)?))
}

fn adder() -> Vehicle {
    Vehicle::new(ItemStub::new(
        "Truffade Adder",
        Some("https://gta.fandom.com/wiki/Truffade_Adder".to_string()),
    ))
}

#[test]
fn vehicle_detail_fills_every_field() -> Result<()> {
    let mut vehicle = adder();
    vehicle.apply_detail(&fixture("truffade_adder.html")?);

    assert_eq!(
        vehicle.image_url.as_deref(),
        Some("https://static.example.org/adder-front.png")
    );
    assert_eq!(vehicle.category.as_deref(), Some("Super"));
    assert_eq!(vehicle.vehicle_type.as_deref(), Some("Car"));
    assert_eq!(vehicle.body_style.as_deref(), Some("Hypercar"));
    assert_eq!(vehicle.capacity.as_deref(), Some("2"));
    assert_eq!(
        vehicle.speed,
        Some(Speed {
            kmh: "250".to_string(),
            mph: "155".to_string()
        })
    );
    assert_eq!(vehicle.drivetrain.as_deref(), Some("AWD"));

    let modifications = vehicle.modifications.as_ref().expect("modifications table");
    assert_eq!(modifications.get("armor"), Some(3));
    assert_eq!(modifications.get("bumpers"), Some(4));
    assert_eq!(modifications.get("front bumpers"), Some(2));
    assert_eq!(modifications.get("engine"), None);
    assert_eq!(modifications.get("engine block"), Some(2));
    assert_eq!(modifications.get("exhaust"), Some(1));
    assert_eq!(modifications.total, 10);
    assert_eq!(modifications.theoretical_total, 12);
    Ok(())
}

#[test]
fn page_without_landmarks_leaves_fields_unknown() -> Result<()> {
    let mut vehicle = adder();
    vehicle.apply_detail(&fixture("grotti_turismo_r.html")?);

    assert_eq!(vehicle, adder());
    let row = vehicle.csv_row(&LinkFormatter::plain());
    assert_eq!(row.len(), Vehicle::CSV_HEADERS.len());
    assert!(row[2..].iter().all(String::is_empty));
    Ok(())
}

#[test]
fn category_without_link_uses_plain_text() {
    let doc = Html::parse_document(
        r#"<aside class="pi-theme-gta-with-subtitle">
            <div data-source="vehicle_class"><div class="pi-data-value pi-font">Sports Classics (GTA Online)</div></div>
            <div data-source="capacity"><div class="pi-data-value pi-font">4</div></div>
        </aside>"#,
    );
    let mut vehicle = adder();
    vehicle.apply_detail(&doc);

    assert_eq!(vehicle.category.as_deref(), Some("Sports Classics"));
    assert_eq!(vehicle.capacity.as_deref(), Some("4"));
    assert_eq!(vehicle.vehicle_type, None);
}

#[test]
fn present_but_empty_block_differs_from_absent() {
    let doc = Html::parse_document(
        r#"<aside class="pi-theme-gta-with-subtitle">
            <div data-source="type"><h3>Type</h3></div>
        </aside>"#,
    );
    let panel = info_panel(&doc).expect("panel present");

    assert_eq!(data_value(panel, "type"), Some(String::new()));
    assert_eq!(data_value(panel, "body_style"), None);
}

#[test]
fn lazy_loaded_image_uses_its_real_source() {
    let doc = Html::parse_document(
        r#"<aside class="pi-theme-gta-with-subtitle">
            <figure data-source="front_image">
                <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=" data-src="https://static.example.org/real.png">
            </figure>
        </aside>"#,
    );
    let mut vehicle = adder();
    vehicle.apply_detail(&doc);

    assert_eq!(
        vehicle.image_url.as_deref(),
        Some("https://static.example.org/real.png")
    );
}

#[test]
fn apartment_detail_fills_style_and_garage() -> Result<()> {
    let mut apartment = Apartment::from(ApartmentListing {
        stub: ItemStub::new(
            "Eclipse Towers, Apt 31",
            Some("https://gta.fandom.com/wiki/Eclipse_Towers".to_string()),
        ),
        category: "High-End Apartments".to_string(),
        price: "400000".to_string(),
        notes: "Best view".to_string(),
    });
    apartment.apply_detail(&fixture("eclipse_towers.html")?);

    assert_eq!(
        apartment.image_url.as_deref(),
        Some("https://static.example.org/eclipse.png")
    );
    assert_eq!(apartment.style.as_deref(), Some("Modern"));
    assert_eq!(apartment.garage_capacity.as_deref(), Some("10"));

    let row = apartment.csv_row(&LinkFormatter::plain());
    assert_eq!(
        row,
        vec![
            "Eclipse Towers, Apt 31",
            "https://gta.fandom.com/wiki/Eclipse_Towers",
            "https://static.example.org/eclipse.png",
            "High-End Apartments",
            "Modern",
            "10",
            "400000",
            "Best view",
        ]
    );
    Ok(())
}

#[test]
fn annotations_are_stripped() {
    assert_eq!(strip_annotation("Super (GTA V)"), "Super");
    assert_eq!(strip_annotation("Compacts"), "Compacts");
    assert_eq!(strip_annotation(""), "");
}

#[test]
fn detail_pages_are_keyed_by_normalized_name() {
    assert_eq!(
        detail_page_key(Dataset::Vehicles, "Truffade Adder"),
        "vehicles/truffade-adder"
    );
    assert_eq!(
        detail_page_key(Dataset::Apartments, "Eclipse Towers, Apt 31"),
        "apartments/eclipse-towers-apt-31"
    );
}
