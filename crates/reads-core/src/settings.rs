use clap::parser::ValueSource;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::models::SeriesOrder;
use crate::time_utils::{get_system_timezone, TimezoneHandler};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Reading statistics for your book history
#[derive(Parser, Debug, Clone)]
#[command(
    name = "my-reads",
    about = "Reading statistics for your book history",
    version
)]
pub struct Settings {
    /// Dashboard view
    #[arg(long, default_value = "summary", value_parser = ["summary", "monthly", "yearly", "recent", "longest", "current"])]
    pub view: String,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Reading-history export (JSON array or JSONL file, or a directory of them).
    /// Remembered for later runs when given on the command line; --clear
    /// restores the default ~/.my-reads/data
    #[arg(long, env = "MY_READS_DATA")]
    pub data_path: Option<PathBuf>,

    /// Timezone used to place completion dates on the calendar (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Ordering of the monthly and yearly series
    #[arg(long, default_value = "first-seen", value_parser = ["first-seen", "chronological"])]
    pub order: String,

    /// Number of books in the recent and longest lists (1-50)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=50))]
    pub top_n: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,

    /// Select the book you are currently reading (catalog entry as JSON)
    #[arg(long)]
    pub select_book: Option<String>,

    /// Record the page reached in the current book
    #[arg(long)]
    pub page: Option<u32>,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.my-reads/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".my-reads").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);
        let saved_data_path = last.data_path.clone();

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }
        if settings.data_path.is_none() {
            settings.data_path = last.data_path;
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "order") {
            if let Some(v) = last.order {
                settings.order = v;
            }
        }
        // NOTE: clap stores the arg id using the field name (underscores).
        if !is_arg_explicitly_set(&matches, "top_n") {
            if let Some(v) = last.top_n {
                settings.top_n = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let mut params = LastUsedParams::from(&settings);
        params.data_path = persisted_data_path(
            matches.value_source("data_path"),
            settings.data_path.clone(),
            saved_data_path,
        );
        let _ = params.save_to(config_path);

        settings
    }

    /// The configured series ordering. Unknown spellings fall back to the
    /// default first-seen order.
    pub fn series_order(&self) -> SeriesOrder {
        SeriesOrder::from_name(&self.order).unwrap_or_default()
    }

    /// `true` when output should be machine-readable JSON.
    pub fn json_output(&self) -> bool {
        self.format == "json"
    }

    /// Resolve `"auto"` sentinel values, replace unknown timezones with the
    /// system zone, and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = get_system_timezone();
        } else if !TimezoneHandler::validate_timezone(&settings.timezone) {
            let system = get_system_timezone();
            warn!(
                "Unknown timezone \"{}\", using system timezone {}",
                settings.timezone, system
            );
            settings.timezone = system;
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            view: Some(s.view.clone()),
            format: Some(s.format.clone()),
            data_path: s.data_path.clone(),
            timezone: Some(s.timezone.clone()),
            order: Some(s.order.clone()),
            top_n: Some(s.top_n),
        }
    }
}

/// The data path to remember for the next run. A path taken from
/// `MY_READS_DATA` is used for this run only and leaves the saved one alone.
fn persisted_data_path(
    source: Option<ValueSource>,
    current: Option<PathBuf>,
    saved: Option<PathBuf>,
) -> Option<PathBuf> {
    match source {
        Some(ValueSource::EnvVariable) => saved,
        _ => current,
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
