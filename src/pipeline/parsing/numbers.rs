//! Numeral tokens: recognition and normalization.

use std::sync::LazyLock;

use regex::Regex;

/// Integers and decimals, optional leading minus, `.` or `,` as decimal mark.
/// OCR prints the minus as `-`, U+2212 or an en dash.
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\x{2212}\x{2013}]?\d+(?:[.,]\d+)?").unwrap());

/// Parse one numeral token, treating a comma as the decimal point.
pub fn normalize_number(token: &str) -> Option<f64> {
    token
        .trim()
        .chars()
        .map(|c| match c {
            ',' => '.',
            '\u{2212}' | '\u{2013}' => '-',
            c => c,
        })
        .collect::<String>()
        .parse::<f64>()
        .ok()
}

/// Every numeral in `text`, in reading order.
pub fn extract_numbers(text: &str) -> Vec<f64> {
    NUMBER_PATTERN
        .find_iter(text)
        .filter_map(|m| normalize_number(m.as_str()))
        .collect()
}

/// At most `limit` numerals from the start of `text`.
pub fn extract_numbers_limited(text: &str, limit: usize) -> Vec<f64> {
    NUMBER_PATTERN
        .find_iter(text)
        .filter_map(|m| normalize_number(m.as_str()))
        .take(limit)
        .collect()
}
