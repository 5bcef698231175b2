use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use tracing::{debug, warn};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Naive date-time layouts, read as wall-clock time in the local calendar.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Date-only layouts seen in reading-history exports.
const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Resolves completion timestamps to calendar dates in one configured zone.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler for the given IANA timezone name.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { tz }
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// Expose the configured timezone.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Resolve a raw `DateRead` value to a local calendar date.
    ///
    /// * `null`, booleans, arrays, objects → `None`
    /// * JSON number → Unix epoch milliseconds
    /// * JSON string → see [`TimezoneHandler::parse_calendar_date_str`]
    pub fn parse_calendar_date(&self, value: &Value) -> Option<NaiveDate> {
        match value {
            Value::String(s) => self.parse_calendar_date_str(s),
            Value::Number(n) => {
                let millis = n.as_i64().or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })?;
                DateTime::from_timestamp_millis(millis).map(|dt| self.local_date(dt))
            }
            _ => None,
        }
    }

    /// Parse a date string.
    ///
    /// Values carrying an offset (RFC 3339, RFC 2822) are shifted into the
    /// configured zone before the date is taken. Naive values are already
    /// local and keep their calendar date.
    pub fn parse_calendar_date_str(&self, s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let normalised = match s.strip_suffix('Z') {
            Some(stripped) => format!("{}+00:00", stripped),
            None => s.to_string(),
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(self.local_date(dt.with_timezone(&Utc)));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(self.local_date(dt.with_timezone(&Utc)));
        }

        for fmt in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive.date());
            }
        }
        for fmt in NAIVE_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Some(date);
            }
        }

        debug!("TimezoneHandler: could not parse date \"{}\"", s);
        None
    }

    fn local_date(&self, dt: DateTime<Utc>) -> NaiveDate {
        dt.with_timezone(&self.tz).date_naive()
    }
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self { tz: Tz::UTC }
    }
}

// ── Calendar labels ───────────────────────────────────────────────────────────

/// Long month name plus year, e.g. `"March 2024"`.
pub fn month_label(date: NaiveDate) -> String {
    format!("{} {}", date.format("%B"), year_label(date))
}

/// Calendar year as plain digits, e.g. `"2024"`.
///
/// chrono's `%Y` signs years past 9999; the label never does.
pub fn year_label(date: NaiveDate) -> String {
    date.year().to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
