pub(crate) fn normalize_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a `;`-delimited wish cell into cleaned entries, dropping blanks.
pub(crate) fn split_delimited(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(normalize_name)
        .filter(|entry| !entry.is_empty())
        .collect()
}
