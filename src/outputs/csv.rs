//! CSV output.
//!
//! Cells are quoted only when they contain a comma, a quote or a line break;
//! embedded quotes are doubled. Lines end with `\n`.

use crate::errors::Result;
use crate::models::ResultTable;
use crate::scrapers::Mode;
use crate::utils::{ensure_writable_dir, results_filename};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// The whole table, header first, as CSV text.
pub fn to_csv(table: &ResultTable) -> String {
    table
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| escape(cell)).join(",") + "\n")
        .collect()
}

/// Write `table` to `<results_dir>/<mode>_<timestamp>.csv`.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip(table, results_dir), fields(results_dir = %results_dir.display()))]
pub async fn write_results(table: &ResultTable, mode: Mode, results_dir: &Path) -> Result<PathBuf> {
    ensure_writable_dir(results_dir).await?;
    let path = results_dir.join(results_filename(mode.as_str(), "csv"));
    fs::write(&path, to_csv(table)).await?;
    info!(path = %path.display(), "Results saved");
    Ok(path)
}
