//! Data models shared by the extractors and the output renderers.
//!
//! - [`ResultTable`]: header plus fixed-arity string rows, the product of every
//!   tabular crawl mode
//! - [`VersionStatus`]: a documentation version parsed from sidebar link text
//! - [`ExpectedStatus`]: PEP index status codes and the statuses they abbreviate
//! - [`StatusSummary`]: declared-status counts built during PEP reconciliation

use once_cell::sync::Lazy;
use regex::Regex;

/// `Python X.Y (status)`, searched anywhere in the link text.
static VERSION_STATUS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Python (?P<version>\d\.\d+) \((?P<status>.*)\)")
        .expect("version/status pattern is valid")
});

/// Ordered rows of strings; row 0 is the header.
///
/// Every row has the header's arity. Tables are built once per invocation and
/// handed to the output stage as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Start a table with the given column names.
    pub fn with_header(columns: &[&str]) -> Self {
        Self {
            rows: vec![columns.iter().map(|c| c.to_string()).collect()],
        }
    }

    /// Append a data row.
    ///
    /// # Panics
    ///
    /// In debug builds, if the row's arity differs from the header's.
    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = row.into_iter().map(Into::into).collect();
        debug_assert_eq!(row.len(), self.rows[0].len(), "row arity must match header");
        self.rows.push(row);
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    /// Data rows, excluding the header.
    pub fn records(&self) -> &[Vec<String>] {
        &self.rows[1..]
    }

    /// All rows, header first.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// A documentation version and its support status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStatus {
    pub version: String,
    /// Empty when the link text did not follow the `Python X.Y (status)` form.
    pub status: String,
}

impl VersionStatus {
    /// Parse link text such as `Python 3.10 (security-fixes)`.
    ///
    /// Text that does not match is kept whole as the version with an empty
    /// status; this is not an error.
    pub fn parse(text: &str) -> Self {
        match VERSION_STATUS_PATTERN.captures(text) {
            Some(caps) => Self {
                version: caps["version"].to_string(),
                status: caps["status"].to_string(),
            },
            None => Self {
                version: text.to_string(),
                status: String::new(),
            },
        }
    }
}

static EXPECTED_STATUS: &[(&str, &[&str])] = &[
    ("A", &["Active", "Accepted"]),
    ("D", &["Deferred"]),
    ("F", &["Final"]),
    ("P", &["Provisional"]),
    ("R", &["Rejected"]),
    ("S", &["Superseded"]),
    ("W", &["Withdrawn"]),
    ("", &["Draft", "Active"]),
];

/// Mapping from a PEP index status code to the full statuses it stands for.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedStatus {
    entries: &'static [(&'static str, &'static [&'static str])],
}

impl Default for ExpectedStatus {
    fn default() -> Self {
        Self {
            entries: EXPECTED_STATUS,
        }
    }
}

impl ExpectedStatus {
    /// Acceptable statuses for `code`, or `None` for an unknown code.
    pub fn lookup(&self, code: &str) -> Option<&'static [&'static str]> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, statuses)| *statuses)
    }
}

/// Counts of PEP statuses as declared on the PEP pages, plus the number of
/// index rows seen.
///
/// Keys keep first-seen order so the rendered table is stable for a given
/// input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    counts: Vec<(String, usize)>,
    total: usize,
}

impl StatusSummary {
    /// Count one index row, whether or not its status resolves.
    pub fn count_row(&mut self) {
        self.total += 1;
    }

    /// Count one declared status.
    pub fn record(&mut self, status: &str) {
        match self.counts.iter_mut().find(|(s, _)| s == status) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((status.to_string(), 1)),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn counts(&self) -> &[(String, usize)] {
        &self.counts
    }

    /// Sum of all per-status counts.
    pub fn counted(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// `Status | Count` rows in first-seen order, then `Total`.
    pub fn into_table(self) -> ResultTable {
        let mut table = ResultTable::with_header(&["Status", "Count"]);
        for (status, n) in self.counts {
            table.push([status, n.to_string()]);
        }
        table.push(["Total".to_string(), self.total.to_string()]);
        table
    }
}
