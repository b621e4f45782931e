//! Input Normalizer
//!
//! Turns the free-form date and time strings users send into the canonical
//! `YYYY-MM-DD` / `HH:MM` forms. Formats are tried in a fixed order and the
//! first one that parses wins, so an ambiguous input such as `01-02-2020`
//! always resolves the same way (day-month-year, see `DATE_FORMATS`).

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Accepted date layouts, in priority order.
pub const DATE_FORMATS: &[(&str, &str)] = &[
    ("%Y-%m-%d", "YYYY-MM-DD"),
    ("%d-%m-%Y", "DD-MM-YYYY"),
    ("%d/%m/%Y", "DD/MM/YYYY"),
    ("%Y/%m/%d", "YYYY/MM/DD"),
    ("%d.%m.%Y", "DD.MM.YYYY"),
    ("%Y.%m.%d", "YYYY.MM.DD"),
    ("%d %B %Y", "DD Month YYYY"),
    ("%d %b %Y", "DD Mon YYYY"),
    ("%B %d %Y", "Month DD YYYY"),
    ("%b %d %Y", "Mon DD YYYY"),
    ("%d-%B-%Y", "DD-Month-YYYY"),
    ("%d-%b-%Y", "DD-Mon-YYYY"),
];

/// Accepted time layouts, in priority order. Seconds are parsed and dropped.
pub const TIME_FORMATS: &[(&str, &str)] = &[
    ("%H:%M", "HH:MM"),
    ("%H:%M:%S", "HH:MM:SS"),
    ("%I:%M %p", "HH:MM AM/PM"),
];

const DATE_HINT: &str =
    "YYYY-MM-DD, DD-MM-YYYY, DD/MM/YYYY, DD.MM.YYYY, '5th May 1999', 'May 5, 1999'";
const TIME_HINT: &str = "HH:MM, HH.MM, HH:MM:SS, 02:35 PM, 02:35PM";

lazy_static! {
    static ref ORDINAL: Regex = Regex::new(r"(?i)(\d+)(st|nd|rd|th)").unwrap();
    static ref COMMA: Regex = Regex::new(r"\s*,\s*").unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
    static ref MERIDIEM: Regex = Regex::new(r"(\d)([AP]M)").unwrap();
    static ref DIGITS: Regex = Regex::new(r"\d+").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Invalid date format: {input}. Supported formats: {}", DATE_HINT)]
    Date { input: String },
    #[error("Invalid time format: {input}. Supported formats: {}", TIME_HINT)]
    Time { input: String },
}

impl NormalizeError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            NormalizeError::Date { .. } => "date",
            NormalizeError::Time { .. } => "time",
        }
    }
}

/// Canonical birth instant in local (place) time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedInstant {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl NormalizedInstant {
    pub fn parse(date: &str, time: &str) -> Result<Self, NormalizeError> {
        Ok(Self {
            date: parse_date(date)?,
            time: parse_time(time)?,
        })
    }

    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn time_string(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    pub fn local_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// `YYYY-MM-DDTHH:MM:00`
    pub fn iso(&self) -> String {
        self.local_datetime().format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate, NormalizeError> {
    let cleaned = ORDINAL.replace_all(input, "$1");
    let cleaned = COMMA.replace_all(&cleaned, " ");
    let cleaned = SPACES.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim();

    DATE_FORMATS
        .iter()
        .filter_map(|(fmt, _)| NaiveDate::parse_from_str(cleaned, fmt).ok())
        .find(|date| has_full_year(cleaned, date.year()))
        .ok_or_else(|| NormalizeError::Date {
            input: input.to_string(),
        })
}

/// chrono's `%Y` takes one to four digits; the year must be written out in full.
fn has_full_year(cleaned: &str, year: i32) -> bool {
    let year = format!("{:04}", year);
    DIGITS.find_iter(cleaned).any(|m| m.as_str() == year && m.len() == 4)
}

pub fn parse_time(input: &str) -> Result<NaiveTime, NormalizeError> {
    let upper = input.trim().replace('.', ":").to_uppercase();
    let spaced = MERIDIEM.replace_all(&upper, "${1} ${2}");

    TIME_FORMATS
        .iter()
        .find_map(|(fmt, _)| NaiveTime::parse_from_str(&spaced, fmt).ok())
        .map(|t| t.with_second(0).unwrap_or(t))
        .ok_or_else(|| NormalizeError::Time {
            input: input.to_string(),
        })
}

/// Canonical `YYYY-MM-DD` for a free-form date.
pub fn normalize_date(input: &str) -> Result<String, NormalizeError> {
    Ok(parse_date(input)?.format("%Y-%m-%d").to_string())
}

/// Canonical 24-hour `HH:MM` for a free-form time.
pub fn normalize_time(input: &str) -> Result<String, NormalizeError> {
    Ok(parse_time(input)?.format("%H:%M").to_string())
}
