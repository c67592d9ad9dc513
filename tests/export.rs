use anyhow::Result;
use tempfile::tempdir;
use wikiscrape::config::ExportConfig;
use wikiscrape::export::{LinkFormatter, to_csv_string, write_csv};

#[test]
fn plain_links_pass_through() {
    let links = LinkFormatter::plain();
    assert_eq!(
        links.format("https://gta.fandom.com/wiki/Adder", "Adder"),
        "https://gta.fandom.com/wiki/Adder"
    );
    assert_eq!(links.format("", "Adder"), "");
}

#[test]
fn spreadsheet_links_use_the_configured_formula() {
    let links = LinkFormatter::new(&ExportConfig {
        excel_ready: true,
        hyperlink_format: "LIEN_HYPERTEXTE".to_string(),
    });

    assert_eq!(
        links.format("https://gta.fandom.com/wiki/Adder", "Truffade \"Adder\""),
        "=[BATCH_DELETE_THIS]LIEN_HYPERTEXTE(\"https://gta.fandom.com/wiki/Adder\";\"Truffade \"\"Adder\"\"\")"
    );
    assert_eq!(links.format("", "Ghost"), "");
}

#[test]
fn csv_fields_are_quoted_only_when_needed() {
    let rows = vec![
        vec!["Adder".to_string(), "1000000".to_string()],
        vec!["Eclipse Towers, Apt 31".to_string(), "say \"hi\"".to_string()],
        vec!["line\nbreak".to_string(), String::new()],
    ];
    let csv = to_csv_string(&["name", "price"], &rows);

    assert_eq!(
        csv,
        "name,price\nAdder,1000000\n\"Eclipse Towers, Apt 31\",\"say \"\"hi\"\"\"\n\"line\nbreak\",\n"
    );
}

#[test]
fn write_csv_creates_missing_directories() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out").join("deep").join("vehicles.csv");

    write_csv(&path, &["name"], &[vec!["Adder".to_string()]])?;

    assert_eq!(std::fs::read_to_string(path)?, "name\nAdder\n");
    Ok(())
}
