use anyhow::Result;
use scraper::Html;
use wikiscrape::error::LayoutError;
use wikiscrape::listing::{
    UNTITLED_ITEM, extract_apartment_listings, extract_vehicle_stubs, normalize_price,
};
use wikiscrape::model::ItemStub;

const ORIGIN: &str = "https://gta.fandom.com";

fn fixture(name: &str) -> Result<Html> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    Ok(Html::parse_document(&std::fs::read_to_string(path)?))
}

#[test]
fn last_list_table_is_authoritative() -> Result<()> {
    let doc = fixture("vehicles.html")?;
    let stubs = extract_vehicle_stubs(&doc, ORIGIN)?;

    assert_eq!(
        stubs,
        vec![
            ItemStub::new(
                "Truffade Adder",
                Some("https://gta.fandom.com/wiki/Truffade_Adder".to_string())
            ),
            ItemStub::new("Pegassi Ghost", None),
            ItemStub::new(
                "Grotti Turismo R",
                Some("https://gta.fandom.com/wiki/Grotti_Turismo_R".to_string())
            ),
        ]
    );
    Ok(())
}

#[test]
fn items_without_pages_keep_their_names() -> Result<()> {
    let doc = Html::parse_document(
        r#"<table class="wikitable"><tr><td><ul>
            <li><a href="/index.php?title=Dinka_Foo&amp;action=edit&amp;redlink=1" class="new" title="Dinka Foo (page does not exist)">Foo</a></li>
            <li>Plain   Entry</li>
            <li><a href="/wiki/Mystery">Mystery</a></li>
            <li><a href="https://other.example.org/wiki/Bar" title="Bar">Bar</a></li>
        </ul></td></tr></table>"#,
    );
    let stubs = extract_vehicle_stubs(&doc, ORIGIN)?;

    assert_eq!(stubs.len(), 4);
    assert_eq!(stubs[0], ItemStub::new("Dinka Foo", None));
    assert_eq!(stubs[1], ItemStub::new("Plain Entry", None));
    assert_eq!(stubs[2].name, UNTITLED_ITEM);
    assert_eq!(
        stubs[2].detail_url.as_deref(),
        Some("https://gta.fandom.com/wiki/Mystery")
    );
    assert_eq!(
        stubs[3].detail_url.as_deref(),
        Some("https://other.example.org/wiki/Bar")
    );
    Ok(())
}

#[test]
fn empty_list_table_is_not_an_error() -> Result<()> {
    let doc = Html::parse_document(r#"<table class="wikitable"><tr><td></td></tr></table>"#);
    assert!(extract_vehicle_stubs(&doc, ORIGIN)?.is_empty());
    Ok(())
}

#[test]
fn missing_list_table_is_a_layout_error() {
    let doc = Html::parse_document(r#"<p>Nothing to see</p><table><tr><td>x</td></tr></table>"#);

    let err = extract_vehicle_stubs(&doc, ORIGIN).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::MissingListTable {
            dataset: "vehicles",
            ..
        }
    ));

    let err = extract_apartment_listings(&doc, ORIGIN).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::MissingListTable {
            dataset: "apartments",
            ..
        }
    ));
}

#[test]
fn apartment_rows_carry_their_section() -> Result<()> {
    let doc = fixture("apartments.html")?;
    let listings = extract_apartment_listings(&doc, ORIGIN)?;

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].stub.name, "Eclipse Towers, Apt 31");
    assert_eq!(
        listings[0].stub.detail_url.as_deref(),
        Some("https://gta.fandom.com/wiki/Eclipse_Towers")
    );
    assert_eq!(listings[0].category, "High-End Apartments");
    assert_eq!(listings[0].price, "400000");
    assert_eq!(listings[0].notes, "Best view");

    assert_eq!(listings[1].stub, ItemStub::new("Del Perro Heights, Apt 7", None));
    assert_eq!(listings[1].price, "200000");
    assert_eq!(listings[1].notes, "Beach, pier");
    Ok(())
}

#[test]
fn apartment_sections_are_read_in_order_and_short_rows_skipped() -> Result<()> {
    let doc = Html::parse_document(
        r#"<table class="wikitable">
            <tr><th colspan="3">List of Low-End Apartments</th></tr>
            <tr><th>Address</th><th>Price</th><th>Notes</th></tr>
            <tr><td>South Mo Milton Drive</td><td>$80,000</td><td></td></tr>
            <tr><td colspan="3">Removed in a later update</td></tr>
        </table>
        <table class="wikitable">
            <tr><th colspan="3">List of Medium-End Apartments</th></tr>
            <tr><th>Address</th><th>Price</th><th>Notes</th></tr>
            <tr><td><a href="/wiki/Hangman_Ave">Hangman Ave</a></td><td>$140,000</td><td>Garage</td></tr>
        </table>"#,
    );
    let listings = extract_apartment_listings(&doc, ORIGIN)?;

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].category, "Low-End Apartments");
    assert_eq!(listings[0].price, "80000");
    assert_eq!(listings[0].notes, "");
    assert_eq!(listings[1].category, "Medium-End Apartments");
    assert_eq!(listings[1].stub.name, "Hangman Ave");
    Ok(())
}

#[test]
fn prices_lose_currency_formatting() {
    assert_eq!(normalize_price("$1,250,000"), "1250000");
    assert_eq!(normalize_price(" $0 "), "0");
    assert_eq!(normalize_price("Free"), "Free");
}
