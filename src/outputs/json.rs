//! JSON output.
//!
//! Each data row becomes an object keyed by the header cells:
//!
//! ```json
//! [
//!   {"Status": "Active", "Count": "2"},
//!   {"Status": "Total", "Count": "3"}
//! ]
//! ```

use crate::errors::Result;
use crate::models::ResultTable;
use crate::scrapers::Mode;
use crate::utils::{ensure_writable_dir, results_filename};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Data rows as an array of header-keyed objects.
pub fn to_json(table: &ResultTable) -> Value {
    let header = table.header();
    Value::Array(
        table
            .records()
            .iter()
            .map(|row| {
                let object: Map<String, Value> = header
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned().map(Value::String))
                    .collect();
                Value::Object(object)
            })
            .collect(),
    )
}

/// Write `table` to `<results_dir>/<mode>_<timestamp>.json`.
///
/// # Returns
///
/// The path of the written file, or an error if the directory cannot be
/// created or the file cannot be written.
#[instrument(level = "info", skip(table, results_dir), fields(results_dir = %results_dir.display()))]
pub async fn write_results(table: &ResultTable, mode: Mode, results_dir: &Path) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(&to_json(table))?;

    if let Err(e) = ensure_writable_dir(results_dir).await {
        error!(error = %e, "Failed to create results dir");
        return Err(e.into());
    }

    let path = results_dir.join(results_filename(mode.as_str(), "json"));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Results saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultTable {
        let mut table = ResultTable::with_header(&["Link to documentation", "Version", "Status"]);
        table.push(["https://docs.python.org/3.13/", "3.13", "stable"]);
        table.push(["https://www.python.org/doc/versions/", "All versions", ""]);
        table
    }

    #[test]
    fn test_rows_are_keyed_by_header() {
        let value = to_json(&sample());
        assert_eq!(
            value,
            serde_json::json!([
                {"Link to documentation": "https://docs.python.org/3.13/", "Version": "3.13", "Status": "stable"},
                {"Link to documentation": "https://www.python.org/doc/versions/", "Version": "All versions", "Status": ""}
            ])
        );
    }

    #[tokio::test]
    async fn test_write_results_roundtrips_through_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_results(&sample(), Mode::LatestVersions, dir.path())
            .await
            .unwrap();

        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("latest-versions_")
        );
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, to_json(&sample()));
    }
}
