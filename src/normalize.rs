use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("non-word regex must compile"));
static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("separator regex must compile"));

/// Maps an item name to a stable, filesystem-safe file stem.
///
/// NFKC-normalizes, lowercases, drops everything that is not a word
/// character, whitespace or hyphen, collapses whitespace/hyphen runs into a
/// single `-` and trims leading/trailing `-` and `_`. Idempotent.
pub fn normalize_filename(name: &str) -> String {
    let composed: String = name.nfkc().collect::<String>().to_lowercase();
    let stripped = NON_WORD.replace_all(&composed, "");
    let collapsed = SEPARATOR_RUN.replace_all(&stripped, "-");
    collapsed.trim_matches(['-', '_']).to_string()
}
