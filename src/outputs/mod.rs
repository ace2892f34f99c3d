//! Rendering of result tables.
//!
//! # Submodules
//!
//! - [`console`]: plain and boxed tables on stdout
//! - [`csv`]: CSV files for spreadsheets
//! - [`json`]: JSON files, one object per row keyed by the header
//!
//! # Output Structure
//!
//! ```text
//! results/
//! ├── pep_2025-05-06_14-30-00.csv
//! └── latest-versions_2025-05-06_14-31-12.json
//! ```

pub mod console;
pub mod csv;
pub mod json;

use crate::cli::OutputMode;
use crate::config::Settings;
use crate::errors::Result;
use crate::models::ResultTable;
use crate::scrapers::Mode;
use tracing::instrument;

/// Present `table` the way the user asked for.
#[instrument(level = "info", skip(table, settings))]
pub async fn control_output(
    table: &ResultTable,
    output: Option<OutputMode>,
    mode: Mode,
    settings: &Settings,
) -> Result<()> {
    match output {
        None => print!("{}", console::plain(table)),
        Some(OutputMode::Pretty) => print!("{}", console::pretty(table)),
        Some(OutputMode::File) => {
            csv::write_results(table, mode, &settings.results_dir).await?;
        }
        Some(OutputMode::Json) => {
            json::write_results(table, mode, &settings.results_dir).await?;
        }
    }
    Ok(())
}
