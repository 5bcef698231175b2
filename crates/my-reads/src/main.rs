mod bootstrap;
mod render;

use anyhow::{Context, Result};
use reads_core::current_reading::{CatalogBook, CurrentReadingStore};
use reads_core::settings::Settings;
use reads_core::time_utils::TimezoneHandler;
use reads_data::analysis::{analyze_source, AnalysisOptions};
use reads_data::reader::{self, FileRecordSource};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("My Reads v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Format: {}, Timezone: {}",
        settings.view,
        settings.format,
        settings.timezone
    );

    let output = match settings.view.as_str() {
        "current" => run_current(&settings)?,
        view => run_dashboard(view, &settings)?,
    };
    println!("{}", output);

    Ok(())
}

/// Show the book being read, applying `--select-book` / `--page` first.
fn run_current(settings: &Settings) -> Result<String> {
    let store = CurrentReadingStore::new();
    let mut state = store.load();
    let mut changed = false;

    if let Some(raw) = &settings.select_book {
        let book: CatalogBook =
            serde_json::from_str(raw).context("--select-book expects a catalog entry as JSON")?;
        state.select_book(book);
        changed = true;
    }
    if let Some(page) = settings.page {
        state.update_page(page)?;
        changed = true;
    }

    if changed {
        store.save(&state)?;
        tracing::info!("Saved current reading to {}", store.path().display());
    }

    if settings.json_output() {
        Ok(serde_json::to_string_pretty(&state)?)
    } else {
        Ok(render::render_current(&state))
    }
}

/// Load the reading history and render one dashboard view.
fn run_dashboard(view: &str, settings: &Settings) -> Result<String> {
    let data_path = reader::resolve_data_path(settings.data_path.as_deref());
    tracing::debug!("Reading history from {}", data_path.display());

    let source = FileRecordSource::new(&data_path);
    let options = AnalysisOptions {
        timezone: TimezoneHandler::new(&settings.timezone),
        order: settings.series_order(),
        top_n: settings.top_n as usize,
    };

    let summary = analyze_source(&source, &options)
        .with_context(|| format!("Failed to analyse {}", data_path.display()))?;
    render::render_dashboard_view(view, &summary, settings.json_output())
}
