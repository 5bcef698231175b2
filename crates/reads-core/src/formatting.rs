use chrono::NaiveDate;

/// Placeholder shown for unknown values.
pub const UNKNOWN: &str = "-";

/// Label used for books whose completion date could not be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use reads_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234), "1,234");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a page count, or [`UNKNOWN`].
pub fn format_pages(pages: Option<u32>) -> String {
    pages
        .map(|p| format_count(u64::from(p)))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Format a rating with two decimals, or [`UNKNOWN`].
///
/// ```
/// use reads_core::formatting::format_rating;
///
/// assert_eq!(format_rating(Some(4.267)), "4.27");
/// assert_eq!(format_rating(None), "-");
/// ```
pub fn format_rating(rating: Option<f64>) -> String {
    rating
        .map(|r| format!("{:.2}", r))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Format a completion date as ISO `YYYY-MM-DD`, or [`INVALID_DATE`].
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

/// Calculate `(part / whole) * 100`, rounded half away from zero to an
/// integer.
///
/// Returns `0` if `whole` is zero.
///
/// ```
/// use reads_core::formatting::percentage;
///
/// assert_eq!(percentage(1.0, 3.0), 33);
/// assert_eq!(percentage(5.0, 0.0), 0);
/// ```
pub fn percentage(part: f64, whole: f64) -> u32 {
    if whole == 0.0 {
        return 0;
    }
    let raw = ((part / whole) * 100.0).round();
    if raw <= 0.0 {
        0
    } else {
        raw as u32
    }
}

/// Render a fixed-width text progress bar such as `[#####-----]`.
///
/// `percent` above 100 renders as a full bar.
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
