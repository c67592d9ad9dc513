use anyhow::Result;
use std::fs;
use tempfile::tempdir;
use wikiscrape::config::{AppConfig, load_config};

#[test]
fn defaults_are_valid() -> Result<()> {
    let config = load_config(None)?;

    assert_eq!(config.wiki.origin, "https://gta.fandom.com");
    assert_ne!(config.vehicles.page_url, config.apartments.page_url);
    assert_eq!(config.cache.global_expiration_hours, 168.0);
    assert!(!config.export.excel_ready);
    assert_eq!(config.export.hyperlink_format, "HYPERLINK");
    Ok(())
}

#[test]
fn partial_file_keeps_remaining_defaults() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("wikiscrape.toml");
    fs::write(
        &path,
        r#"
[paths]
output_dir = "out"

[vehicles]
page_url = "https://example.org/wiki/Vehicles"
expiration_hours = 24.0
iteration_start = 2
iteration_stop = 10

[export]
excel_ready = true

[fetch.headers]
Accept-Language = "en"
"#,
    )?;

    let config = load_config(Some(path.as_path()))?;

    assert_eq!(config.paths.output_dir, std::path::PathBuf::from("out"));
    assert_eq!(config.paths.cache_path, std::path::PathBuf::from("data/cache.json"));
    assert_eq!(config.vehicles.page_url, "https://example.org/wiki/Vehicles");
    assert_eq!(config.vehicles.expiration_hours, 24.0);
    assert_eq!(config.apartments.page_url, AppConfig::default().apartments.page_url);
    assert!(config.export.excel_ready);
    assert_eq!(config.export.hyperlink_format, "HYPERLINK");
    assert_eq!(config.fetch.headers.get("Accept-Language").map(String::as_str), Some("en"));

    assert!(!config.vehicles.in_window(1));
    assert!(config.vehicles.in_window(2));
    assert!(config.vehicles.in_window(9));
    assert!(!config.vehicles.in_window(10));
    assert!(config.apartments.in_window(10_000));
    Ok(())
}

#[test]
fn dataset_section_requires_a_page_url() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("wikiscrape.toml");
    fs::write(&path, "[apartments]\nexpiration_hours = 1.0\n")?;

    assert!(load_config(Some(path.as_path())).is_err());
    Ok(())
}

#[test]
fn validation_rejects_inconsistent_values() {
    let mut config = AppConfig::default();
    config.vehicles.iteration_start = 5;
    config.vehicles.iteration_stop = Some(3);
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.apartments.expiration_hours = -1.0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.wiki.origin = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.export.excel_ready = true;
    config.export.hyperlink_format = " ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().expect("tempdir");
    assert!(load_config(Some(dir.path().join("absent.toml").as_path())).is_err());
}
