//! Patient metadata from the report header.
//!
//! Best-effort: every field is independently optional and a missing match
//! leaves it `None`. Input is whitespace-collapsed header text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static PATIENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bID[:\s]+([A-Za-z0-9-]+)").unwrap());

static AGE_LABELLED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bAge\b[:\s]+(\d+)").unwrap());

/// Age printed right before the sex label, e.g. "42 Male" or "42 years Female".
static AGE_BEFORE_SEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s*(?:years?|y)?\s*(?:Male|Female)\b").unwrap()
});

static SEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(Male|Female)\b").unwrap());

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}[./-]\d{1,2}[./-]\d{2,4})\b").unwrap());

static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2}:\d{2})(?:\s?(AM|PM))?\b").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub patient_id: Option<String>,
    pub sex: Option<String>,
    pub age: Option<String>,
    pub collection_date: Option<String>,
    pub collection_time: Option<String>,
}

impl MetadataRecord {
    /// Values in output column order: ID, sex, age, date, time.
    pub fn columns(&self) -> [Option<&str>; 5] {
        [
            self.patient_id.as_deref(),
            self.sex.as_deref(),
            self.age.as_deref(),
            self.collection_date.as_deref(),
            self.collection_time.as_deref(),
        ]
    }
}

pub fn parse_metadata(header: &str) -> MetadataRecord {
    MetadataRecord {
        patient_id: first_capture(&PATIENT_ID, header),
        sex: first_capture(&SEX, header).map(|s| title_case(&s)),
        age: first_capture(&AGE_LABELLED, header)
            .or_else(|| first_capture(&AGE_BEFORE_SEX, header)),
        collection_date: first_capture(&DATE, header),
        collection_time: parse_time(header),
    }
}

/// Byte offset just past the first date-shaped token, if any.
pub fn first_date_end(text: &str) -> Option<usize> {
    DATE.find(text).map(|m| m.end())
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn parse_time(text: &str) -> Option<String> {
    let caps = TIME.captures(text)?;
    let clock = caps.get(1)?.as_str();
    Some(match caps.get(2) {
        Some(suffix) => format!("{clock} {}", suffix.as_str().to_ascii_uppercase()),
        None => clock.to_string(),
    })
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
