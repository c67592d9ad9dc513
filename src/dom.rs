use scraper::{ElementRef, Selector};
use url::Url;

/// Parses a selector known at compile time.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("static selector {css} must parse: {err:?}"))
}

/// Element text with whitespace runs collapsed to single spaces.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn has_name(element: ElementRef<'_>, name: &str) -> bool {
    element.value().name().eq_ignore_ascii_case(name)
}

/// Nearest ancestor element named `name`.
pub fn closest<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| has_name(*ancestor, name))
}

/// Direct children named `name`, in document order.
pub fn child_elements<'a>(element: ElementRef<'a>, name: &str) -> Vec<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| has_name(*child, name))
        .collect()
}

pub fn has_previous_element_sibling(element: ElementRef<'_>) -> bool {
    element.prev_siblings().any(|node| node.value().is_element())
}

/// Joins a wiki-relative path onto `origin`; absolute links pass through.
pub fn absolutize_url(origin: &str, value: &str) -> String {
    if value.starts_with("http://") || value.starts_with("https://") {
        return value.to_string();
    }

    if let Ok(base) = Url::parse(origin)
        && let Ok(joined) = base.join(value)
    {
        return joined.to_string();
    }

    format!("{}{}", origin.trim_end_matches('/'), value)
}
