use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An untyped book record as delivered by the data source.
///
/// No schema is enforced; every consumed field may be absent or malformed.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Field names read from a [`RawRecord`].
pub mod fields {
    pub const BOOK_ID: &str = "BookID";
    pub const TITLE: &str = "Title";
    pub const AUTHOR: &str = "Author";
    pub const NUMBER_OF_PAGES: &str = "NumberOfPages";
    pub const MY_RATING: &str = "MyRating";
    pub const AVERAGE_RATING: &str = "AverageRating";
    pub const DATE_READ: &str = "DateRead";
}

/// A completed book, normalised from a [`RawRecord`].
///
/// Unknown numeric fields are `None`; an unparsable completion date is
/// `None` as well and acts as the invalid-date marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Identifier taken verbatim from `BookID`.
    pub id: String,
    /// Display title with any parenthetical series annotation removed.
    pub title: String,
    /// Author, verbatim.
    pub author: String,
    /// Page count, when known.
    pub pages: Option<u32>,
    /// The reader's own rating, when known.
    pub rating: Option<u32>,
    /// Community average rating, when known.
    pub avg_rating: Option<f64>,
    /// Local calendar date the book was finished.
    pub completed_date: Option<NaiveDate>,
}

impl Book {
    /// `true` when the completion date parsed to a real calendar date.
    pub fn has_valid_date(&self) -> bool {
        self.completed_date.is_some()
    }
}

/// Pages completed within one "Month Year" bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReading {
    /// Label such as `"March 2024"`.
    pub month: String,
    pub pages: u64,
}

/// Books completed within one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyReading {
    /// Four-digit year, e.g. `"2024"`.
    pub year: String,
    pub books: u32,
}

/// Ordering applied to the monthly and yearly series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesOrder {
    /// Order in which each bucket first appears while scanning the books.
    #[default]
    FirstSeen,
    /// Oldest bucket first.
    Chronological,
}

impl SeriesOrder {
    /// Parse the CLI spelling (`"first-seen"` / `"chronological"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "first-seen" => Some(Self::FirstSeen),
            "chronological" => Some(Self::Chronological),
            _ => None,
        }
    }
}

impl std::fmt::Display for SeriesOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstSeen => write!(f, "first-seen"),
            Self::Chronological => write!(f, "chronological"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_serializes_camel_case() {
        let book = Book {
            id: "42".to_string(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            pages: Some(612),
            rating: Some(5),
            avg_rating: Some(4.27),
            completed_date: NaiveDate::from_ymd_opt(2024, 3, 5),
        };
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["avgRating"], serde_json::json!(4.27));
        assert_eq!(json["completedDate"], serde_json::json!("2024-03-05"));
        assert_eq!(json["pages"], serde_json::json!(612));
    }

    #[test]
    fn test_unknown_fields_serialize_as_null() {
        let book = Book {
            id: "1".to_string(),
            title: String::new(),
            author: String::new(),
            pages: None,
            rating: None,
            avg_rating: None,
            completed_date: None,
        };
        assert!(!book.has_valid_date());
        let json = serde_json::to_value(&book).unwrap();
        assert!(json["pages"].is_null());
        assert!(json["completedDate"].is_null());
    }

    #[test]
    fn test_series_order_names() {
        assert_eq!(SeriesOrder::from_name("first-seen"), Some(SeriesOrder::FirstSeen));
        assert_eq!(
            SeriesOrder::from_name("chronological"),
            Some(SeriesOrder::Chronological)
        );
        assert_eq!(SeriesOrder::from_name("random"), None);
        assert_eq!(SeriesOrder::Chronological.to_string(), "chronological");
        assert_eq!(SeriesOrder::default(), SeriesOrder::FirstSeen);
    }
}
