//! Value normalization for loose, date-aware comparison.
//!
//! Every cell is compared through its canonical string form, so numeric `1`
//! and text `"1"` are equal. For date-like columns in date-only mode both
//! sides are first reduced to their calendar date; when either side does not
//! parse as a date the comparison falls back to the string forms for that
//! column only.
//!
//! # Accepted date text
//!
//! - `YYYY-MM-DD`, optionally followed by ` HH:MM`, ` HH:MM:SS` or `THH:MM:SS`
//!   (fractional seconds allowed)
//! - RFC 3339 timestamps with offsets
//! - `DD.MM.YYYY`, `YYYY/MM/DD` and `MM/DD/YYYY`, each with an optional time

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use sheetdiff_model::CellValue;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d", "%m/%d/%Y"];

/// A value reduced to the form used for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComparableValue {
    Text(String),
    Date(NaiveDate),
}

/// Outcome of attempting to read a cell as a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParse {
    /// The calendar date component, time of day dropped.
    Parsed(NaiveDate),
    /// Not a date; carries the string form used instead.
    FellBack(String),
}

impl DateParse {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    pub fn into_comparable(self) -> ComparableValue {
        match self {
            Self::Parsed(date) => ComparableValue::Date(date),
            Self::FellBack(text) => ComparableValue::Text(text),
        }
    }
}

/// Which rule decided a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonPath {
    /// Plain string comparison; date handling was not requested.
    Text,
    /// Both sides parsed and their calendar dates were compared.
    Date,
    /// Date handling was requested but a side did not parse.
    TextFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueComparison {
    pub equal: bool,
    pub path: ComparisonPath,
}

/// Reduces a cell to its comparable form.
///
/// With `as_date` the calendar date is returned when the value parses;
/// otherwise, and always without `as_date`, the canonical string form.
/// Empty cells normalize to the empty string.
pub fn normalize(value: &CellValue, as_date: bool) -> ComparableValue {
    if as_date {
        parse_date(value).into_comparable()
    } else {
        ComparableValue::Text(value.to_canonical_string())
    }
}

/// Attempts to read a cell as a calendar date.
pub fn parse_date(value: &CellValue) -> DateParse {
    match value {
        CellValue::Date(date) => DateParse::Parsed(*date),
        CellValue::DateTime(datetime) => DateParse::Parsed(datetime.date()),
        CellValue::Text(text) => match parse_date_text(text) {
            Some(date) => DateParse::Parsed(date),
            None => DateParse::FellBack(text.clone()),
        },
        other => DateParse::FellBack(other.to_canonical_string()),
    }
}

/// Parses date or date-time text, returning only the calendar date.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|datetime| datetime.naive_local().date())
}

/// Compares two cells under the loose equality policy.
///
/// Never fails: a side that does not parse as a date degrades the comparison
/// to the string forms, and the returned path records that it happened.
pub fn compare_values(old: &CellValue, new: &CellValue, as_date: bool) -> ValueComparison {
    if as_date {
        if let (DateParse::Parsed(left), DateParse::Parsed(right)) =
            (parse_date(old), parse_date(new))
        {
            return ValueComparison {
                equal: left == right,
                path: ComparisonPath::Date,
            };
        }
        return ValueComparison {
            equal: old.to_canonical_string() == new.to_canonical_string(),
            path: ComparisonPath::TextFallback,
        };
    }
    ValueComparison {
        equal: old.to_canonical_string() == new.to_canonical_string(),
        path: ComparisonPath::Text,
    }
}

/// Canonical string form of an identifier value; empty for missing values.
pub fn key_string(value: &CellValue) -> String {
    value.to_canonical_string()
}
