//! Date normalization for work-history tokens.
//!
//! Tokens arrive in whatever shape the CV (or the extraction model) used:
//! `2021-03`, `03/2021`, `Mar 2021`, `Present`, a bare year inside free text,
//! or nothing at all. Each resolves to a display string, a sortable key and,
//! for duration math, a first-of-month date.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::cv::WorkEntry;
use crate::text::patterns::ci;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Placeholder shown instead of a month name for an out-of-range month number.
const INVALID_MONTH: &str = "--";
const UNKNOWN_DISPLAY: &str = "-";
const PRESENT_DISPLAY: &str = "Present";

static ONGOING: LazyLock<Regex> = LazyLock::new(|| ci(r"present|current|ongoing"));
static YEAR_MONTH: LazyLock<Regex> = LazyLock::new(|| ci(r"^(\d{4})[-/](\d{1,2})$"));
static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| ci(r"^(\d{1,2})[-/](\d{4})$"));
static NAMED_MONTH: LazyLock<Regex> = LazyLock::new(|| ci(r"^([A-Za-z]{3,9})\s+(\d{4})$"));
static ANY_YEAR: LazyLock<Regex> = LazyLock::new(|| ci(r"\d{4}"));

/// Total order over date tokens. Unknown sorts first, ongoing sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub year: i32,
    pub month: u32,
    pub tiebreak: u8,
}

impl SortKey {
    pub const UNKNOWN: SortKey = SortKey::new(0, 0, 0);
    pub const PRESENT: SortKey = SortKey::new(9999, 12, 1);

    pub const fn new(year: i32, month: u32, tiebreak: u8) -> Self {
        Self {
            year,
            month,
            tiebreak,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("date token is empty")]
    Empty,

    #[error("no recognizable date in '{0}'")]
    Unrecognized(String),

    #[error("month {month} out of range in '{token}'")]
    InvalidMonth { token: String, month: u32 },
}

/// Recognized token shapes, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Shape {
    Ongoing,
    /// `YYYY-MM` and `MM/YYYY` alike: both carry a numeric month.
    Numeric { year: i32, month: u32 },
    Named { year: i32, token: String },
    YearOnly { year: i32 },
}

fn is_blank(token: &str) -> bool {
    matches!(token, "" | "-" | "null" | "None")
}

fn classify(token: Option<&str>) -> Option<Shape> {
    let token = token.map(str::trim).filter(|t| !is_blank(t))?;

    if ONGOING.is_match(token) {
        return Some(Shape::Ongoing);
    }
    if let Some(c) = YEAR_MONTH.captures(token) {
        return Some(Shape::Numeric {
            year: c[1].parse().ok()?,
            month: c[2].parse().ok()?,
        });
    }
    if let Some(c) = MONTH_YEAR.captures(token) {
        return Some(Shape::Numeric {
            year: c[2].parse().ok()?,
            month: c[1].parse().ok()?,
        });
    }
    if let Some(c) = NAMED_MONTH.captures(token) {
        return Some(Shape::Named {
            year: c[2].parse().ok()?,
            token: c[1].to_string(),
        });
    }
    ANY_YEAR
        .find(token)
        .and_then(|m| m.as_str().parse().ok())
        .map(|year| Shape::YearOnly { year })
}

fn month_name(month: u32) -> Option<&'static str> {
    (1..=12)
        .contains(&month)
        .then(|| MONTH_NAMES[(month - 1) as usize])
}

/// Month number from the first three letters of a month token.
fn month_from_abbreviation(token: &str) -> Option<u32> {
    let prefix: String = token.chars().take(3).collect::<String>().to_ascii_lowercase();
    MONTH_NAMES
        .iter()
        .position(|name| name[..3].eq_ignore_ascii_case(&prefix))
        .map(|i| i as u32 + 1)
}

/// Full month name for an exact abbreviation ("Sep") or full name ("september").
fn lookup_month_name(token: &str) -> Option<&'static str> {
    MONTH_NAMES.iter().copied().find(|name| {
        name.eq_ignore_ascii_case(token) || name[..3].eq_ignore_ascii_case(token)
    })
}

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Human-readable period, e.g. `"March 2021"`, `"Present"` or `"-"`.
pub fn format_period(token: Option<&str>) -> String {
    match classify(token) {
        Some(Shape::Ongoing) => PRESENT_DISPLAY.to_string(),
        Some(Shape::Numeric { year, month }) => {
            format!("{} {year}", month_name(month).unwrap_or(INVALID_MONTH))
        }
        Some(Shape::Named { year, token }) => match lookup_month_name(&token) {
            Some(name) => format!("{name} {year}"),
            None => format!("{} {year}", title_case(&token)),
        },
        Some(Shape::YearOnly { .. }) => token.unwrap_or_default().trim().to_string(),
        None => UNKNOWN_DISPLAY.to_string(),
    }
}

pub fn sort_key(token: Option<&str>) -> SortKey {
    match classify(token) {
        Some(Shape::Ongoing) => SortKey::PRESENT,
        Some(Shape::Numeric { year, month }) => SortKey::new(year, month, 0),
        Some(Shape::Named { year, token }) => {
            SortKey::new(year, month_from_abbreviation(&token).unwrap_or(12), 0)
        }
        Some(Shape::YearOnly { year }) => SortKey::new(year, 12, 0),
        None => SortKey::UNKNOWN,
    }
}

/// First-of-month date for duration math. "Present" resolves against `today`.
pub fn parse_date_at(token: Option<&str>, today: NaiveDate) -> Result<NaiveDate, DateError> {
    let raw = token.map(str::trim).unwrap_or_default();
    let shape = classify(token).ok_or_else(|| {
        if is_blank(raw) {
            DateError::Empty
        } else {
            DateError::Unrecognized(raw.to_string())
        }
    })?;

    let (year, month) = match shape {
        Shape::Ongoing => (today.year(), today.month()),
        Shape::Numeric { year, month } => (year, month),
        Shape::Named { year, token } => (year, month_from_abbreviation(&token).unwrap_or(1)),
        Shape::YearOnly { year } => (year, 1),
    };

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| DateError::InvalidMonth {
        token: raw.to_string(),
        month,
    })
}

pub fn parse_date(token: Option<&str>) -> Result<NaiveDate, DateError> {
    parse_date_at(token, today())
}

/// Whole months from `from` to `to`, clamped at zero.
pub fn months_between_at(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Option<u32> {
    let a = parse_date_at(from, today).ok()?;
    let b = parse_date_at(to, today).ok()?;
    let total = (b.year() - a.year()) * 12 + (b.month() as i32 - a.month() as i32);
    Some(total.max(0) as u32)
}

pub fn months_between(from: Option<&str>, to: Option<&str>) -> Option<u32> {
    months_between_at(from, to, today())
}

/// Elapsed time between two tokens as `"1y 6m"`, `"2y"`, `"5m"` or `"0m"`;
/// empty when either side does not parse.
pub fn duration_at(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> String {
    match months_between_at(from, to, today) {
        Some(total) => format_months(total),
        None => String::new(),
    }
}

pub fn duration(from: Option<&str>, to: Option<&str>) -> String {
    duration_at(from, to, today())
}

fn format_months(total: u32) -> String {
    let (years, months) = (total / 12, total % 12);
    match (years, months) {
        (0, 0) => "0m".to_string(),
        (0, m) => format!("{m}m"),
        (y, 0) => format!("{y}y"),
        (y, m) => format!("{y}y {m}m"),
    }
}

/// Total experience for the identity block. Non-positive input reads `"0m"`.
pub fn months_to_ym(months: i64) -> String {
    if months <= 0 {
        return "0m".to_string();
    }
    format_months(months as u32)
}

/// Work entries ordered most recent first by their end date; stable on ties.
pub fn sort_work(work: &[WorkEntry]) -> Vec<&WorkEntry> {
    let mut sorted: Vec<&WorkEntry> = work.iter().collect();
    sorted.sort_by(|a, b| sort_key(b.to.as_deref()).cmp(&sort_key(a.to.as_deref())));
    sorted
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
