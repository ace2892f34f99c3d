//! Console rendering.

use crate::models::ResultTable;
use itertools::Itertools;

/// One line per row, cells separated by a single space.
pub fn plain(table: &ResultTable) -> String {
    table
        .rows()
        .iter()
        .map(|row| row.iter().join(" ") + "\n")
        .collect()
}

/// Boxed table with left-aligned cells and a rule under the header.
///
/// ```text
/// +--------+-------+
/// | Status | Count |
/// +--------+-------+
/// | Active | 2     |
/// +--------+-------+
/// ```
pub fn pretty(table: &ResultTable) -> String {
    let widths: Vec<usize> = (0..table.header().len())
        .map(|col| {
            table
                .rows()
                .iter()
                .map(|row| row.get(col).map_or(0, |cell| cell.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = format!(
        "+{}+\n",
        widths.iter().map(|w| "-".repeat(w + 2)).join("+")
    );
    let line = |row: &[String]| {
        let cells = widths
            .iter()
            .enumerate()
            .map(|(col, w)| {
                let cell = row.get(col).map_or("", String::as_str);
                format!(" {cell}{} ", " ".repeat(w - cell.chars().count()))
            })
            .join("|");
        format!("|{cells}|\n")
    };

    let mut out = String::new();
    out.push_str(&rule);
    out.push_str(&line(table.header()));
    out.push_str(&rule);
    for row in table.records() {
        out.push_str(&line(row.as_slice()));
    }
    out.push_str(&rule);
    out
}

/// `<rows> rows x <columns> columns`, for log lines.
pub fn describe(table: &ResultTable) -> String {
    format!(
        "{} rows x {} columns",
        table.records().len(),
        table.header().len()
    )
}
