//! Plain-text and JSON rendering of the dashboard views.
//!
//! Text output is laid out as aligned columns. Widths are measured in
//! terminal cells so titles with wide characters still line up.

use reads_core::current_reading::CurrentReading;
use reads_core::formatting::{
    format_count, format_date, format_pages, format_rating, progress_bar, UNKNOWN,
};
use reads_core::models::{Book, MonthlyReading, YearlyReading};
use reads_data::analysis::DashboardSummary;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Titles and authors longer than this many cells are cut with an ellipsis.
const MAX_TEXT_WIDTH: usize = 40;

const PROGRESS_BAR_WIDTH: usize = 30;

// ── TextTable ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// A minimal column-aligned table.
struct TextTable {
    headers: Vec<(&'static str, Align)>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(headers: Vec<(&'static str, Align)>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|(h, _)| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        let header: Vec<String> = self.headers.iter().map(|(h, _)| h.to_string()).collect();
        lines.push(self.render_row(&header, &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for row in &self.rows {
            lines.push(self.render_row(row, &widths));
        }
        lines.join("\n")
    }

    fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .zip(&self.headers)
            .map(|((cell, &width), (_, align))| pad(cell, width, *align))
            .collect();
        cells.join("  ").trim_end().to_string()
    }
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.width()));
    match align {
        Align::Left => format!("{}{}", cell, fill),
        Align::Right => format!("{}{}", fill, cell),
    }
}

/// Cut `s` to at most `max` terminal cells, marking the cut with `…`.
fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

// ── Text views ────────────────────────────────────────────────────────────────

/// Pages read per month.
pub fn render_monthly(monthly: &[MonthlyReading]) -> String {
    let mut table = TextTable::new(vec![("Month", Align::Left), ("Pages", Align::Right)]);
    for m in monthly {
        table.push(vec![m.month.clone(), format_count(m.pages)]);
    }
    table.render()
}

/// Books read per year.
pub fn render_yearly(yearly: &[YearlyReading]) -> String {
    let mut table = TextTable::new(vec![("Year", Align::Left), ("Books", Align::Right)]);
    for y in yearly {
        table.push(vec![y.year.clone(), y.books.to_string()]);
    }
    table.render()
}

/// A list of books with the reader's rating next to the average rating.
pub fn render_books(books: &[Book]) -> String {
    let mut table = TextTable::new(vec![
        ("Title", Align::Left),
        ("Author", Align::Left),
        ("Pages", Align::Right),
        ("Rating", Align::Right),
        ("Avg", Align::Right),
        ("Completed", Align::Left),
    ]);
    for b in books {
        table.push(vec![
            truncate_to_width(&b.title, MAX_TEXT_WIDTH),
            truncate_to_width(&b.author, MAX_TEXT_WIDTH),
            format_pages(b.pages),
            b.rating
                .map(|r| r.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            format_rating(b.avg_rating),
            format_date(b.completed_date),
        ]);
    }
    table.render()
}

/// Every dashboard panel in one report.
pub fn render_summary(summary: &DashboardSummary) -> String {
    let meta = &summary.metadata;
    let mut out = String::new();

    out.push_str(&format!(
        "Books read: {}   Average pages per book: {}   Reading consistency: {}% of days\n",
        format_count(meta.books_normalized as u64),
        format_count(summary.average_pages),
        summary.consistency
    ));
    if meta.duplicates_dropped > 0 || meta.invalid_dates > 0 {
        out.push_str(&format!(
            "({} duplicate records dropped, {} books without a completion date)\n",
            meta.duplicates_dropped, meta.invalid_dates
        ));
    }

    let sections = [
        ("Pages Read Per Month", render_monthly(&summary.monthly)),
        ("Books Read Per Year", render_yearly(&summary.yearly)),
        ("Rating Comparison (most recent)", render_books(&summary.recent)),
        ("Books by Page Length", render_books(&summary.longest)),
    ];
    for (title, body) in sections {
        out.push_str(&format!("\n{}\n{}\n", title, body));
    }

    out.trim_end().to_string()
}

/// The book being read and how far along it is.
pub fn render_current(state: &CurrentReading) -> String {
    let Some(book) = &state.book else {
        return "No book selected. Use --select-book to choose the book you are reading."
            .to_string();
    };

    let mut lines = vec![book.title.clone()];
    if !book.authors.is_empty() {
        lines.push(format!("by {}", book.authors.join(", ")));
    }
    if !book.isbn.is_empty() {
        lines.push(format!("ISBN: {}", book.isbn));
    }
    if book.page_count > 0 {
        let percent = state.progress_percentage();
        lines.push(format!(
            "{} of {} pages ({}%)",
            state.current_page, book.page_count, percent
        ));
        lines.push(progress_bar(percent, PROGRESS_BAR_WIDTH));
    } else {
        lines.push(format!("Page {} (page count unknown)", state.current_page));
    }
    lines.join("\n")
}

// ── View dispatch ─────────────────────────────────────────────────────────────

/// Render one dashboard `view` as text or pretty JSON.
pub fn render_dashboard_view(
    view: &str,
    summary: &DashboardSummary,
    json: bool,
) -> anyhow::Result<String> {
    let output = match (view, json) {
        ("monthly", false) => render_monthly(&summary.monthly),
        ("monthly", true) => serde_json::to_string_pretty(&summary.monthly)?,
        ("yearly", false) => render_yearly(&summary.yearly),
        ("yearly", true) => serde_json::to_string_pretty(&summary.yearly)?,
        ("recent", false) => render_books(&summary.recent),
        ("recent", true) => serde_json::to_string_pretty(&summary.recent)?,
        ("longest", false) => render_books(&summary.longest),
        ("longest", true) => serde_json::to_string_pretty(&summary.longest)?,
        ("summary", false) => render_summary(summary),
        ("summary", true) => serde_json::to_string_pretty(summary)?,
        (other, _) => anyhow::bail!("Unknown dashboard view: {}", other),
    };
    Ok(output)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reads_core::current_reading::CatalogBook;
    use reads_data::analysis::AnalysisMetadata;

    fn book(id: &str, title: &str, pages: Option<u32>, date: Option<(i32, u32, u32)>) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: "Ursula K. Le Guin".to_string(),
            pages,
            rating: Some(5),
            avg_rating: Some(4.16),
            completed_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    fn summary() -> DashboardSummary {
        let books = vec![
            book("1", "The Dispossessed", Some(387), Some((2024, 3, 5))),
            book("2", "A Wizard of Earthsea", None, None),
        ];
        DashboardSummary {
            monthly: vec![MonthlyReading {
                month: "March 2024".to_string(),
                pages: 1_387,
            }],
            yearly: vec![YearlyReading {
                year: "2024".to_string(),
                books: 2,
            }],
            average_pages: 387,
            consistency: 1,
            recent: books.clone(),
            longest: books,
            metadata: AnalysisMetadata {
                generated_at: "2024-03-06T00:00:00+00:00".to_string(),
                records_read: 3,
                books_normalized: 2,
                duplicates_dropped: 1,
                invalid_dates: 1,
                unknown_pages: 1,
            },
        }
    }

    // ── TextTable ─────────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_table_alignment() {
        let out = render_monthly(&summary().monthly);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Month       Pages");
        assert_eq!(lines[1], "----------  -----");
        assert_eq!(lines[2], "March 2024  1,387");
    }

    #[test]
    fn test_wide_characters_are_measured_in_cells() {
        let mut table = TextTable::new(vec![("T", Align::Left), ("N", Align::Right)]);
        table.push(vec!["本".to_string(), "1".to_string()]);
        table.push(vec!["ab".to_string(), "2".to_string()]);
        let out = table.render();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "本  1");
        assert_eq!(lines[3], "ab  2");
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
    }

    // ── Book lists ────────────────────────────────────────────────────────────

    #[test]
    fn test_render_books_marks_unknowns() {
        let out = render_books(&summary().recent);
        assert!(out.contains("The Dispossessed"));
        assert!(out.contains("2024-03-05"));
        assert!(out.contains("Invalid Date"));
        let last = out.lines().last().unwrap();
        assert!(last.contains(" - "), "unknown pages should render as '-': {last}");
    }

    // ── Summary ───────────────────────────────────────────────────────────────

    #[test]
    fn test_render_summary_sections() {
        let out = render_summary(&summary());
        assert!(out.starts_with("Books read: 2   Average pages per book: 387"));
        assert!(out.contains("1% of days"));
        assert!(out.contains("1 duplicate records dropped"));
        assert!(out.contains("Pages Read Per Month"));
        assert!(out.contains("Books Read Per Year"));
        assert!(out.contains("Books by Page Length"));
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    #[test]
    fn test_dispatch_json_views() {
        let s = summary();
        let yearly = render_dashboard_view("yearly", &s, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&yearly).unwrap();
        assert_eq!(value, serde_json::json!([{"year": "2024", "books": 2}]));

        let full = render_dashboard_view("summary", &s, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&full).unwrap();
        assert_eq!(value["averagePages"], serde_json::json!(387));
    }

    #[test]
    fn test_dispatch_text_view() {
        let out = render_dashboard_view("longest", &summary(), false).unwrap();
        assert!(out.starts_with("Title"));
    }

    #[test]
    fn test_dispatch_unknown_view() {
        assert!(render_dashboard_view("current", &summary(), false).is_err());
    }

    // ── Current reading ───────────────────────────────────────────────────────

    #[test]
    fn test_render_current_without_book() {
        let out = render_current(&CurrentReading::default());
        assert!(out.starts_with("No book selected"));
    }

    #[test]
    fn test_render_current_progress() {
        let mut state = CurrentReading::default();
        state.select_book(CatalogBook {
            title: "The Left Hand of Darkness".to_string(),
            authors: vec!["Ursula K. Le Guin".to_string()],
            page_count: 304,
            ..CatalogBook::default()
        });
        state.update_page(152).unwrap();

        let out = render_current(&state);
        assert!(out.contains("by Ursula K. Le Guin"));
        assert!(out.contains("152 of 304 pages (50%)"));
        assert!(out.contains(&format!("[{}{}]", "#".repeat(15), "-".repeat(15))));
    }
}
