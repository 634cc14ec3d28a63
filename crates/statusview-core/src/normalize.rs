//! Total conversions from raw field values to display forms.
//!
//! Nothing in here fails: malformed input becomes [`PLACEHOLDER`] for text
//! or `None` for numbers and dates.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::record::{is_truthy, number_string, primitive_string};

pub const PLACEHOLDER: &str = "—";

static CALENDAR_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid calendar date pattern"));

static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").expect("valid float pattern")
});

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%a %b %d %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];

/// Anything that can be read as a calendar day.
pub trait DateLike {
    fn to_calendar_date(&self) -> Option<NaiveDate>;
}

impl DateLike for str {
    fn to_calendar_date(&self) -> Option<NaiveDate> {
        parse_date_str(self)
    }
}

impl DateLike for String {
    fn to_calendar_date(&self) -> Option<NaiveDate> {
        parse_date_str(self)
    }
}

impl DateLike for NaiveDate {
    fn to_calendar_date(&self) -> Option<NaiveDate> {
        Some(*self)
    }
}

impl DateLike for NaiveDateTime {
    fn to_calendar_date(&self) -> Option<NaiveDate> {
        Some(self.date())
    }
}

impl<Tz: TimeZone> DateLike for DateTime<Tz> {
    fn to_calendar_date(&self) -> Option<NaiveDate> {
        Some(self.with_timezone(&Local).date_naive())
    }
}

impl DateLike for Value {
    fn to_calendar_date(&self) -> Option<NaiveDate> {
        match self {
            Value::String(s) => parse_date_str(s),
            _ => None,
        }
    }
}

impl<T: DateLike + ?Sized> DateLike for Option<&T> {
    fn to_calendar_date(&self) -> Option<NaiveDate> {
        self.and_then(|v| v.to_calendar_date())
    }
}

pub fn parse_date_like<D: DateLike + ?Sized>(value: &D) -> Option<NaiveDate> {
    value.to_calendar_date()
}

/// `YYYY-MM-DD` (with an optional time after `T` or a space) is read as that
/// calendar day with no timezone conversion. Other strings go through the
/// generic formats.
fn parse_date_str(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }

    let date_part = value
        .split('T')
        .next()
        .and_then(|p| p.split(' ').next())
        .unwrap_or_default();
    if CALENDAR_DATE.is_match(date_part) {
        let year = date_part[0..4].parse::<i32>().ok()?;
        let month = date_part[5..7].parse::<u32>().ok()?;
        let day = date_part[8..10].parse::<u32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    parse_generic_date(value.trim())
}

fn parse_generic_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.to_calendar_date();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return dt.to_calendar_date();
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    {
        return Some(date);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

/// Short US form without the comma: `Mar 05 2024`.
pub fn format_date_short_us(date: NaiveDate) -> String {
    date.format("%b %d %Y").to_string()
}

/// Display form of a date-ish field. Unparseable input is echoed back.
pub fn format_date_only(value: &Value) -> String {
    if !is_truthy(value) {
        return PLACEHOLDER.to_string();
    }
    match parse_date_like(value) {
        Some(date) => format_date_short_us(date),
        None => primitive_string(value),
    }
}

/// Same rendering as [`format_date_only`], used for the effort card figures.
pub fn format_date_kpi(value: &Value) -> String {
    format_date_only(value)
}

pub fn parse_percent_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) if !s.is_empty() => {
            let cleaned = s.trim().replacen('%', "", 1);
            parse_float_prefix(cleaned.trim_start())
        }
        _ => None,
    }
}

/// Leading decimal number of `s`, ignoring trailing text (`"42abc"` -> 42).
fn parse_float_prefix(s: &str) -> Option<f64> {
    let m = FLOAT_PREFIX.find(s)?;
    m.as_str().parse::<f64>().ok().filter(|f| f.is_finite())
}

pub fn format_percent_label(value: &Value) -> String {
    match value {
        Value::Null => PLACEHOLDER.to_string(),
        Value::String(s) if s.is_empty() => PLACEHOLDER.to_string(),
        Value::String(s) if s.contains('%') => s.clone(),
        Value::String(s) => format!("{s}%"),
        Value::Number(n) => format!("{}%", number_string(n.as_f64().unwrap_or_default())),
        other => primitive_string(other),
    }
}

/// Display text for a primitive or a reference object
/// (`{display_value, value}` and friends).
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => PLACEHOLDER.to_string(),
        Value::String(s) if s.is_empty() => PLACEHOLDER.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(_) | Value::Bool(_) => primitive_string(value),
        Value::Object(map) => ["display_value", "displayValue", "name", "label", "value"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|v| is_truthy(v))
            .map(primitive_string)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        Value::Array(_) => PLACEHOLDER.to_string(),
    }
}

/// Strips markup for tooltip text. This is cosmetic cleanup only and must not
/// be used to sanitize content that will be rendered as markup.
pub fn clean_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    HTML_TAG.replace_all(html, "").trim().to_string()
}
