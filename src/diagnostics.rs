//! Operator diagnostics emitted while crawling.
//!
//! Extractors never write log lines for data problems directly. They build a
//! [`Diagnostic`] and hand it to a [`DiagnosticSink`]. The binary installs
//! [`TracingSink`], which turns each diagnostic into a `tracing` event; tests
//! install a recording sink and assert on exactly what was reported.

use std::fmt;
use tracing::{error, info};

/// Something worth telling the operator about, without stopping the crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A page could not be fetched at the transport level.
    Unreachable { url: String, error: String },
    /// A PEP index row carries a status code missing from the expected table.
    UnknownStatusCode { code: String, row: String },
    /// The status declared on a PEP page is not one the index code allows.
    StatusMismatch {
        url: String,
        declared: String,
        expected: Vec<String>,
    },
    /// A PEP page has a field list but no `Status` field.
    MissingStatusField { url: String },
    /// A per-item page or entry lacks an element the extractor needs.
    MissingElement { url: String, detail: String },
    /// The documentation archive was written to disk.
    ArchiveSaved { path: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Unreachable { url, error } => {
                write!(f, "failed to fetch {url}: {error}")
            }
            Diagnostic::UnknownStatusCode { code, row } => {
                write!(f, "unknown status code {code:?} in index row: {row}")
            }
            Diagnostic::StatusMismatch {
                url,
                declared,
                expected,
            } => write!(
                f,
                "PEP status mismatch at {url}: page declares {declared:?}, index expects {expected:?}"
            ),
            Diagnostic::MissingStatusField { url } => {
                write!(f, "PEP page {url} has no Status field")
            }
            Diagnostic::MissingElement { url, detail } => {
                write!(f, "page {url} is missing {detail}")
            }
            Diagnostic::ArchiveSaved { path } => {
                write!(f, "archive downloaded and saved: {path}")
            }
        }
    }
}

/// Destination for diagnostics.
///
/// Implementations must be shareable across the concurrent fetch stage.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::Unreachable { url, error } => {
                error!(%url, %error, "Page unreachable; skipping");
            }
            Diagnostic::UnknownStatusCode { code, row } => {
                info!(%code, %row, "Unknown status code in PEP index");
            }
            Diagnostic::StatusMismatch {
                url,
                declared,
                expected,
            } => {
                info!(%url, %declared, ?expected, "PEP status mismatch");
            }
            Diagnostic::MissingStatusField { url } => {
                error!(%url, "PEP page has no Status field; skipping");
            }
            Diagnostic::MissingElement { url, detail } => {
                error!(%url, %detail, "Required element missing; skipping");
            }
            Diagnostic::ArchiveSaved { path } => {
                info!(%path, "Archive downloaded and saved");
            }
        }
    }
}
