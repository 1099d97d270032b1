use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Split a comma-separated ingredient list into clean item names.
///
/// Items are trimmed and inner whitespace is collapsed. Empty items are
/// dropped, and so are repeats that differ only by case (the first spelling wins).
pub fn parse_ingredients(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    raw.split(',')
        .map(normalize_item)
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

fn normalize_item(item: &str) -> String {
    WHITESPACE.replace_all(item.trim(), " ").into_owned()
}
