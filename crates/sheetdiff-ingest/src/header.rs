//! Header cleanup shared by CSV and spreadsheet sources.

use std::collections::BTreeSet;

/// Trims, strips a byte-order mark and collapses inner whitespace.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

/// Normalizes a header row into unique, non-empty column names.
///
/// Blank headers become `Unnamed: {index}`; repeats get `.1`, `.2`, ...
pub fn unique_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.iter()
        .enumerate()
        .map(|(index, value)| {
            let mut base = normalize_header(value.as_ref());
            if base.is_empty() {
                base = format!("Unnamed: {index}");
            }
            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}
