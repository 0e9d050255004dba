/// Strips BOM/zero-width characters and collapses runs of whitespace.
/// Exported names and comments keep their original casing.
pub(crate) fn clean_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans and lowercases a cell for enum/flag matching.
pub(crate) fn normalize_token(value: &str) -> String {
    clean_text(value).to_ascii_lowercase()
}

#[cfg(test)]
pub(crate) fn clean_for_tests(value: &str) -> String {
    clean_text(value)
}
