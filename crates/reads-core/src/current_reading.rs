//! The single "currently reading" selection and its page progress.
//!
//! State is a small JSON document kept under `~/.my-reads/`. Loading never
//! fails: a missing or corrupt file yields the empty selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ReadsError, Result};
use crate::formatting::percentage;

// ── CatalogBook ───────────────────────────────────────────────────────────────

/// A book picked from the external catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogBook {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    /// Thumbnail URL, empty when the catalog has none.
    pub image: String,
    pub isbn: String,
    /// Zero when the catalog does not know the length.
    pub page_count: u32,
    pub description: String,
}

// ── CurrentReading ────────────────────────────────────────────────────────────

/// The book being read and the page reached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentReading {
    pub book: Option<CatalogBook>,
    pub current_page: u32,
}

impl CurrentReading {
    /// Replace the selection and restart at page 0.
    pub fn select_book(&mut self, book: CatalogBook) {
        debug!("Selected \"{}\" as current book", book.title);
        self.book = Some(book);
        self.current_page = 0;
    }

    /// Move to `page`. State is left untouched on error.
    pub fn update_page(&mut self, page: u32) -> Result<()> {
        let book = self.book.as_ref().ok_or(ReadsError::NoCurrentBook)?;
        if page > book.page_count {
            return Err(ReadsError::PageOutOfRange {
                page,
                page_count: book.page_count,
            });
        }
        self.current_page = page;
        Ok(())
    }

    /// Rounded percentage of the book read; 0 with no book or no page count.
    pub fn progress_percentage(&self) -> u32 {
        match &self.book {
            Some(book) if book.page_count > 0 => {
                percentage(f64::from(self.current_page), f64::from(book.page_count))
            }
            _ => 0,
        }
    }
}

// ── CurrentReadingStore ───────────────────────────────────────────────────────

/// File-backed persistence for [`CurrentReading`].
#[derive(Debug, Clone)]
pub struct CurrentReadingStore {
    path: PathBuf,
}

impl CurrentReadingStore {
    /// Store at `~/.my-reads/current_reading.json`.
    pub fn new() -> Self {
        Self::at(Self::default_path())
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Return the default path of the state file.
    pub fn default_path() -> PathBuf {
        Self::path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the state path rooted at `base_dir`.
    pub fn path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".my-reads").join("current_reading.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state, or the empty selection.
    pub fn load(&self) -> CurrentReading {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return CurrentReading::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(
                "Ignoring unreadable current-reading state {}: {}",
                self.path.display(),
                e
            );
            CurrentReading::default()
        })
    }

    /// Atomically write `state`, creating parent directories if needed.
    pub fn save(&self, state: &CurrentReading) -> Result<()> {
        let write_err = |source| ReadsError::FileWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(state)?;

        // Write to a temp file then rename for atomicity.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;

        Ok(())
    }
}

impl Default for CurrentReadingStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
