use unicode_normalization::UnicodeNormalization;

const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Canonical comparison form shared by titles, bodies and queries.
///
/// Lowercase, NFD, drop combining diacritics, turn anything that is not an
/// ASCII word character or whitespace into a space, collapse runs of
/// whitespace and trim. The output is ASCII, so normalizing twice is a no-op.
pub fn normalize(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.to_lowercase().nfd() {
        if COMBINING_MARKS.contains(&c) {
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '_' {
            cleaned.push(c.to_ascii_lowercase());
        } else {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split an already normalized string into its non-empty terms.
pub fn terms(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}
