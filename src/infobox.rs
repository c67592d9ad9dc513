//! Lookups scoped to a detail page's portable info panel.
//!
//! Every lookup returns `None` when its landmark is missing and `Some("")`
//! when the landmark exists but carries no text.

use crate::dom::{element_text, selector};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;

pub const INFO_PANEL_CLASS: &str = "pi-theme-gta-with-subtitle";

pub static VEHICLE_IMAGE_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^front_image").expect("vehicle image regex must compile"));
pub static APARTMENT_IMAGE_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^image").expect("apartment image regex must compile"));
static CATEGORY_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)class").expect("category regex must compile"));
static STYLE_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)style").expect("style regex must compile"));

pub fn info_panel(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&selector(&format!(".{INFO_PANEL_CLASS}"))).next()
}

/// `src` of the image inside the first figure whose `data-source` matches.
/// Lazy-loaded images keep their real address in `data-src`.
pub fn image_url(panel: ElementRef<'_>, source: &Regex) -> Option<String> {
    let figure = panel
        .select(&selector("figure[data-source]"))
        .find(|figure| figure.value().attr("data-source").is_some_and(|v| source.is_match(v)))?;
    let image = figure.select(&selector("img")).next()?;

    let src = image.value().attr("src");
    match (src, image.value().attr("data-src")) {
        (Some(src), Some(lazy)) if src.starts_with("data:") => Some(lazy.to_string()),
        (Some(src), _) => Some(src.to_string()),
        (None, lazy) => lazy.map(ToString::to_string),
    }
}

fn block_matching<'a>(panel: ElementRef<'a>, source: &Regex) -> Option<ElementRef<'a>> {
    panel
        .select(&selector("div[data-source]"))
        .find(|block| block.value().attr("data-source").is_some_and(|v| source.is_match(v)))
}

fn block_exact<'a>(panel: ElementRef<'a>, source: &str) -> Option<ElementRef<'a>> {
    panel
        .select(&selector("div[data-source]"))
        .find(|block| block.value().attr("data-source") == Some(source))
}

fn nested_text(block: ElementRef<'_>, css: &str) -> String {
    block
        .select(&selector(css))
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Text of the `.pi-data-value` under the block whose `data-source` is exactly `source`.
pub fn data_value(panel: ElementRef<'_>, source: &str) -> Option<String> {
    block_exact(panel, source).map(|block| nested_text(block, ".pi-data-value"))
}

/// Link text when the class block links somewhere, its plain text otherwise.
pub fn category(panel: ElementRef<'_>) -> Option<String> {
    let block = block_matching(panel, &CATEGORY_SOURCE)?;
    let text = match block.select(&selector("a")).next() {
        Some(anchor) => element_text(anchor),
        None => nested_text(block, ".pi-font"),
    };
    Some(strip_annotation(&text))
}

pub fn apartment_style(panel: ElementRef<'_>) -> Option<String> {
    let block = block_matching(panel, &STYLE_SOURCE)?;
    Some(strip_annotation(&nested_text(block, ".pi-font")))
}

pub fn garage_capacity(panel: ElementRef<'_>) -> Option<String> {
    let heading = panel
        .select(&selector("h3"))
        .find(|h3| element_text(*h3).to_lowercase().contains("garage capacity"))?;
    let parent = heading.parent().and_then(ElementRef::wrap)?;
    Some(first_token(&nested_text(parent, ".pi-data-value")))
}

/// `"Super (GTA V)"` -> `"Super"`.
pub fn strip_annotation(text: &str) -> String {
    text.split(" (").next().unwrap_or_default().trim().to_string()
}

/// Leading magnitude of a value such as `"2 (driver + passenger)"`.
pub fn first_token(text: &str) -> String {
    text.split_whitespace().next().unwrap_or_default().to_string()
}
