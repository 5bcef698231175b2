//! Reading statistics over a normalised book list.
//!
//! Every view borrows the book slice immutably and returns freshly built
//! data, so views can be computed in any order on the same list.

use std::collections::{HashMap, HashSet};

use chrono::Datelike;
use reads_core::data_processors::RecordConverter;
use reads_core::formatting::percentage;
use reads_core::models::{Book, MonthlyReading, RawRecord, SeriesOrder, YearlyReading};
use reads_core::time_utils::{month_label, year_label, TimezoneHandler};
use tracing::debug;

/// Length of the recent and longest lists shown on the dashboard.
pub const DEFAULT_TOP_N: usize = 10;

/// Denominator of the consistency metric.
const DAYS_PER_YEAR: f64 = 365.0;

// ── Normalization ─────────────────────────────────────────────────────────────

/// Books built from a batch of raw records, plus how many were dropped.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub books: Vec<Book>,
    /// Records skipped because an earlier record had the same id.
    pub duplicates_dropped: usize,
}

// ── Buckets ───────────────────────────────────────────────────────────────────

/// One labelled group in a monthly or yearly series.
#[derive(Debug)]
struct Bucket {
    label: String,
    /// `(year, month)`; month is 0 for yearly buckets.
    sort_key: (i32, u32),
    total: u64,
}

/// Accumulates buckets in first-seen order.
#[derive(Debug, Default)]
struct BucketSeries {
    buckets: Vec<Bucket>,
    index: HashMap<String, usize>,
}

impl BucketSeries {
    fn add(&mut self, label: String, sort_key: (i32, u32), amount: u64) {
        let idx = match self.index.get(&label) {
            Some(&idx) => idx,
            None => {
                self.index.insert(label.clone(), self.buckets.len());
                self.buckets.push(Bucket {
                    label,
                    sort_key,
                    total: 0,
                });
                self.buckets.len() - 1
            }
        };
        self.buckets[idx].total += amount;
    }

    fn into_ordered(mut self, order: SeriesOrder) -> Vec<Bucket> {
        if order == SeriesOrder::Chronological {
            self.buckets.sort_by_key(|b| b.sort_key);
        }
        self.buckets
    }
}

// ── ReadingAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that turns raw records into dashboard statistics.
pub struct ReadingAggregator;

impl ReadingAggregator {
    /// Build one [`Book`] per record, in input order, dropping records whose
    /// id was already seen. Records with an empty id are always kept.
    pub fn normalize(records: &[RawRecord], tz: &TimezoneHandler) -> Vec<Book> {
        Self::normalize_counted(records, tz).books
    }

    /// Same as [`ReadingAggregator::normalize`] but also reports how many
    /// duplicates were dropped.
    pub fn normalize_counted(records: &[RawRecord], tz: &TimezoneHandler) -> Normalized {
        let mut seen: HashSet<String> = HashSet::new();
        let mut result = Normalized::default();

        for record in records {
            let book = RecordConverter::to_book(record, tz);
            if !book.id.is_empty() && !seen.insert(book.id.clone()) {
                debug!("Dropping duplicate record for book id {}", book.id);
                result.duplicates_dropped += 1;
                continue;
            }
            result.books.push(book);
        }

        result
    }

    /// Pages completed per "Month Year", in first-seen order.
    pub fn monthly_pages(books: &[Book]) -> Vec<MonthlyReading> {
        Self::monthly_pages_ordered(books, SeriesOrder::FirstSeen)
    }

    /// Pages completed per "Month Year" in the requested order.
    ///
    /// Books without a valid completion date are skipped; unknown page counts
    /// add nothing to their month.
    pub fn monthly_pages_ordered(books: &[Book], order: SeriesOrder) -> Vec<MonthlyReading> {
        let mut series = BucketSeries::default();
        for book in books {
            let Some(date) = book.completed_date else {
                continue;
            };
            series.add(
                month_label(date),
                (date.year(), date.month()),
                u64::from(book.pages.unwrap_or(0)),
            );
        }

        series
            .into_ordered(order)
            .into_iter()
            .map(|b| MonthlyReading {
                month: b.label,
                pages: b.total,
            })
            .collect()
    }

    /// Books completed per year, in first-seen order.
    pub fn yearly_books(books: &[Book]) -> Vec<YearlyReading> {
        Self::yearly_books_ordered(books, SeriesOrder::FirstSeen)
    }

    /// Books completed per year in the requested order. Books without a
    /// valid completion date are skipped.
    pub fn yearly_books_ordered(books: &[Book], order: SeriesOrder) -> Vec<YearlyReading> {
        let mut series = BucketSeries::default();
        for book in books {
            let Some(date) = book.completed_date else {
                continue;
            };
            series.add(year_label(date), (date.year(), 0), 1);
        }

        series
            .into_ordered(order)
            .into_iter()
            .map(|b| YearlyReading {
                year: b.label,
                books: u32::try_from(b.total).unwrap_or(u32::MAX),
            })
            .collect()
    }

    /// Mean page count over books with a known page count, rounded half away
    /// from zero. `0` when no book has a known page count.
    pub fn average_pages_per_book(books: &[Book]) -> u64 {
        let (total, count) = books
            .iter()
            .filter_map(|b| b.pages)
            .fold((0u64, 0u64), |(total, count), pages| {
                (total + u64::from(pages), count + 1)
            });

        if count == 0 {
            return 0;
        }
        (total as f64 / count as f64).round() as u64
    }

    /// Share of a year's days on which at least one book was finished, as a
    /// rounded percentage capped at 100.
    pub fn reading_consistency(books: &[Book]) -> u32 {
        let distinct_days: HashSet<_> = books.iter().filter_map(|b| b.completed_date).collect();
        percentage(distinct_days.len() as f64, DAYS_PER_YEAR).min(100)
    }

    /// Up to `n` books, most recently completed first.
    ///
    /// Books with an invalid date come last; equal dates are ordered by id.
    pub fn last_n_books(books: &[Book], n: usize) -> Vec<Book> {
        let mut sorted = books.to_vec();
        // `None` orders below every date, so descending puts it last.
        sorted.sort_by(|a, b| {
            b.completed_date
                .cmp(&a.completed_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        sorted.truncate(n);
        sorted
    }

    /// Up to `n` books, longest first. The sort is stable and books with an
    /// unknown page count come last.
    pub fn longest_n_books(books: &[Book], n: usize) -> Vec<Book> {
        let mut sorted = books.to_vec();
        sorted.sort_by(|a, b| b.pages.cmp(&a.pages));
        sorted.truncate(n);
        sorted
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
