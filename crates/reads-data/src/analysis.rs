//! Dashboard pipeline for My Reads.
//!
//! Normalises a batch of raw records once and computes every dashboard view
//! from the same immutable book list, returning a [`DashboardSummary`] ready
//! for the presentation layer.

use chrono::Utc;
use reads_core::error::Result;
use reads_core::models::{Book, MonthlyReading, RawRecord, SeriesOrder, YearlyReading};
use reads_core::time_utils::TimezoneHandler;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregator::{ReadingAggregator, DEFAULT_TOP_N};
use crate::reader::RecordSource;

// ── Public types ──────────────────────────────────────────────────────────────

/// Knobs for [`analyze_reading`].
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Zone used to place completion timestamps on the calendar.
    pub timezone: TimezoneHandler,
    /// Ordering of the monthly and yearly series.
    pub order: SeriesOrder,
    /// Length of the recent and longest lists.
    pub top_n: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            timezone: TimezoneHandler::default(),
            order: SeriesOrder::FirstSeen,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Metadata produced alongside the dashboard views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this summary was generated.
    pub generated_at: String,
    /// Raw records handed to the pipeline.
    pub records_read: usize,
    /// Books left after normalisation.
    pub books_normalized: usize,
    /// Records dropped as duplicate ids.
    pub duplicates_dropped: usize,
    /// Books whose completion date could not be parsed.
    pub invalid_dates: usize,
    /// Books whose page count is unknown.
    pub unknown_pages: usize,
}

/// Every dashboard view computed from one reading history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub monthly: Vec<MonthlyReading>,
    pub yearly: Vec<YearlyReading>,
    pub average_pages: u64,
    /// Percentage of a year's days with a finished book.
    pub consistency: u32,
    pub recent: Vec<Book>,
    pub longest: Vec<Book>,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline over `records`.
///
/// 1. Normalise records into books (duplicate ids dropped).
/// 2. Compute monthly and yearly series in `options.order`.
/// 3. Compute average pages and consistency.
/// 4. Build the recent and longest lists.
pub fn analyze_reading(records: &[RawRecord], options: &AnalysisOptions) -> DashboardSummary {
    let normalized = ReadingAggregator::normalize_counted(records, &options.timezone);
    let books = normalized.books;

    let invalid_dates = books.iter().filter(|b| !b.has_valid_date()).count();
    let unknown_pages = books.iter().filter(|b| b.pages.is_none()).count();
    if invalid_dates > 0 || unknown_pages > 0 {
        debug!(
            "{} books without a completion date, {} without a page count",
            invalid_dates, unknown_pages
        );
    }

    let summary = DashboardSummary {
        monthly: ReadingAggregator::monthly_pages_ordered(&books, options.order),
        yearly: ReadingAggregator::yearly_books_ordered(&books, options.order),
        average_pages: ReadingAggregator::average_pages_per_book(&books),
        consistency: ReadingAggregator::reading_consistency(&books),
        recent: ReadingAggregator::last_n_books(&books, options.top_n),
        longest: ReadingAggregator::longest_n_books(&books, options.top_n),
        metadata: AnalysisMetadata {
            generated_at: Utc::now().to_rfc3339(),
            records_read: records.len(),
            books_normalized: books.len(),
            duplicates_dropped: normalized.duplicates_dropped,
            invalid_dates,
            unknown_pages,
        },
    };

    info!(
        "Analysed {} books ({} duplicates dropped)",
        summary.metadata.books_normalized, summary.metadata.duplicates_dropped
    );
    summary
}

/// Fetch records from `source` and run [`analyze_reading`].
pub fn analyze_source(
    source: &dyn RecordSource,
    options: &AnalysisOptions,
) -> Result<DashboardSummary> {
    let records = source.fetch()?;
    Ok(analyze_reading(&records, options))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use reads_core::error::ReadsError;
    use serde_json::{json, Value};

    fn records(value: Value) -> Vec<RawRecord> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => map,
                    _ => panic!("test record must be an object"),
                })
                .collect(),
            _ => panic!("test records must be an array"),
        }
    }

    fn history() -> Vec<RawRecord> {
        records(json!([
            {"BookID": 1, "Title": "Dune (Dune #1)", "Author": "Frank Herbert",
             "NumberOfPages": 612, "MyRating": 5, "AverageRating": 4.27, "DateRead": "2023-07-14"},
            {"BookID": 2, "Title": "Emma", "Author": "Jane Austen",
             "NumberOfPages": "474", "MyRating": "3", "AverageRating": "4.02", "DateRead": "2024/03/05"},
            {"BookID": 3, "Title": "Circe", "Author": "Madeline Miller",
             "NumberOfPages": 393, "MyRating": 4, "AverageRating": 4.26, "DateRead": "2024-03-20"},
            {"BookID": 2, "Title": "Emma (reread)", "Author": "Jane Austen",
             "NumberOfPages": 474, "DateRead": "2024-08-01"},
            {"BookID": 4, "Title": "Unfinished", "Author": "Nobody",
             "NumberOfPages": null, "DateRead": ""}
        ]))
    }

    struct StaticSource(Vec<RawRecord>);

    impl RecordSource for StaticSource {
        fn fetch(&self) -> Result<Vec<RawRecord>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl RecordSource for FailingSource {
        fn fetch(&self) -> Result<Vec<RawRecord>> {
            Err(ReadsError::InvalidRecordShape("boom".to_string()))
        }
    }

    // ── analyze_reading ───────────────────────────────────────────────────────

    #[test]
    fn test_analyze_reading_full_history() {
        let summary = analyze_reading(&history(), &AnalysisOptions::default());

        assert_eq!(summary.metadata.records_read, 5);
        assert_eq!(summary.metadata.books_normalized, 4);
        assert_eq!(summary.metadata.duplicates_dropped, 1);
        assert_eq!(summary.metadata.invalid_dates, 1);
        assert_eq!(summary.metadata.unknown_pages, 1);

        let months: Vec<(&str, u64)> = summary
            .monthly
            .iter()
            .map(|m| (m.month.as_str(), m.pages))
            .collect();
        assert_eq!(months, vec![("July 2023", 612), ("March 2024", 867)]);

        let years: Vec<(&str, u32)> = summary
            .yearly
            .iter()
            .map(|y| (y.year.as_str(), y.books))
            .collect();
        assert_eq!(years, vec![("2023", 1), ("2024", 2)]);

        // (612 + 474 + 393) / 3 = 493
        assert_eq!(summary.average_pages, 493);
        // 3 distinct days / 365 → 0.82% → 1
        assert_eq!(summary.consistency, 1);

        let recent: Vec<&str> = summary.recent.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(recent, vec!["3", "2", "1", "4"]);
        let longest: Vec<&str> = summary.longest.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(longest, vec!["Dune", "Emma", "Circe", "Unfinished"]);
    }

    #[test]
    fn test_analyze_reading_respects_top_n_and_order() {
        let options = AnalysisOptions {
            order: SeriesOrder::Chronological,
            top_n: 2,
            ..AnalysisOptions::default()
        };
        let input = records(json!([
            {"BookID": "a", "NumberOfPages": 10, "DateRead": "2024-05-01"},
            {"BookID": "b", "NumberOfPages": 20, "DateRead": "2022-05-01"},
            {"BookID": "c", "NumberOfPages": 30, "DateRead": "2023-05-01"}
        ]));
        let summary = analyze_reading(&input, &options);

        let years: Vec<&str> = summary.yearly.iter().map(|y| y.year.as_str()).collect();
        assert_eq!(years, vec!["2022", "2023", "2024"]);
        assert_eq!(summary.recent.len(), 2);
        assert_eq!(summary.longest.len(), 2);
        assert_eq!(summary.longest[0].id, "c");
    }

    #[test]
    fn test_analyze_reading_empty() {
        let summary = analyze_reading(&[], &AnalysisOptions::default());
        assert!(summary.monthly.is_empty());
        assert!(summary.yearly.is_empty());
        assert_eq!(summary.average_pages, 0);
        assert_eq!(summary.consistency, 0);
        assert!(summary.recent.is_empty());
        assert!(summary.longest.is_empty());
    }

    #[test]
    fn test_summary_serializes_for_presentation() {
        let summary = analyze_reading(&history(), &AnalysisOptions::default());
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["averagePages"], json!(493));
        assert_eq!(json["monthly"][1], json!({"month": "March 2024", "pages": 867}));
        assert_eq!(json["recent"][0]["completedDate"], json!("2024-03-20"));
        assert_eq!(json["metadata"]["duplicatesDropped"], json!(1));
        assert_eq!(json["metadata"]["booksNormalized"], json!(4));
        assert!(json["metadata"]["generatedAt"].is_string());
        assert!(json["metadata"].get("duplicates_dropped").is_none());
    }

    // ── analyze_source ────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_source_uses_fetched_records() {
        let source = StaticSource(history());
        let summary = analyze_source(&source, &AnalysisOptions::default()).unwrap();
        assert_eq!(summary.metadata.books_normalized, 4);
    }

    #[test]
    fn test_analyze_source_propagates_errors() {
        let result = analyze_source(&FailingSource, &AnalysisOptions::default());
        assert!(matches!(result, Err(ReadsError::InvalidRecordShape(_))));
    }
}
