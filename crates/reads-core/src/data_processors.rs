use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::models::{fields, Book, RawRecord};
use crate::time_utils::TimezoneHandler;

// ── FieldParser ───────────────────────────────────────────────────────────────

/// Lenient conversion of untyped record fields.
///
/// Strings are read with a leading-number rule: surrounding whitespace is
/// ignored and parsing stops at the first character that cannot continue the
/// number, so `"352 pages"` reads as `352`. Anything that yields no number
/// is `None`.
pub struct FieldParser;

fn leading_int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([+-]?\d+)").expect("regex is valid"))
}

fn leading_float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("regex is valid")
    })
}

impl FieldParser {
    /// Parse an integer. Fractional JSON numbers are truncated.
    pub fn parse_int(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            }),
            Value::String(s) => leading_int_re()
                .captures(s)
                .and_then(|caps| caps[1].parse::<i64>().ok()),
            _ => None,
        }
    }

    /// Parse a finite floating-point number.
    pub fn parse_float(value: &Value) -> Option<f64> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => leading_float_re()
                .captures(s)
                .and_then(|caps| caps[1].parse::<f64>().ok()),
            _ => None,
        };
        parsed.filter(|f| f.is_finite())
    }

    /// Parse a non-negative count such as a page number or a rating.
    pub fn parse_count(value: &Value) -> Option<u32> {
        Self::parse_int(value).and_then(|n| u32::try_from(n).ok())
    }

    /// Render a field as text. Numbers keep their JSON spelling; missing and
    /// non-scalar values become the empty string.
    pub fn parse_text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Strip a parenthetical series annotation: everything from the first
    /// `(` onward is dropped and the remainder trimmed.
    ///
    /// `"The Way of Kings (The Stormlight Archive, #1)"` → `"The Way of Kings"`.
    pub fn display_title(raw: &str) -> String {
        raw.split('(').next().unwrap_or_default().trim().to_string()
    }
}

// ── RecordConverter ───────────────────────────────────────────────────────────

/// Builds canonical [`Book`] values from raw records.
pub struct RecordConverter;

static MISSING: Value = Value::Null;

fn field<'a>(record: &'a RawRecord, name: &str) -> &'a Value {
    record.get(name).unwrap_or(&MISSING)
}

impl RecordConverter {
    /// Map one raw record onto a [`Book`]. Never fails; unreadable fields
    /// become unknown.
    pub fn to_book(record: &RawRecord, tz: &TimezoneHandler) -> Book {
        Book {
            id: FieldParser::parse_text(field(record, fields::BOOK_ID)),
            title: FieldParser::display_title(&FieldParser::parse_text(field(
                record,
                fields::TITLE,
            ))),
            author: FieldParser::parse_text(field(record, fields::AUTHOR)),
            pages: FieldParser::parse_count(field(record, fields::NUMBER_OF_PAGES)),
            rating: FieldParser::parse_count(field(record, fields::MY_RATING)),
            avg_rating: FieldParser::parse_float(field(record, fields::AVERAGE_RATING)),
            completed_date: tz.parse_calendar_date(field(record, fields::DATE_READ)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
