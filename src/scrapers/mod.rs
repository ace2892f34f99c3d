//! Crawl modes.
//!
//! Each mode starts from one anchor page on the documentation or PEP site and
//! produces a [`ResultTable`] (or, for [`download`], a file on disk):
//!
//! | Mode | Module | Anchor page | Output |
//! |------|--------|-------------|--------|
//! | `whats-new` | [`whats_new`] | `whatsnew/` | link, title, editors per release |
//! | `latest-versions` | [`latest_versions`] | docs root sidebar | link, version, status |
//! | `download` | [`download`] | `download.html` | PDF (A4) archive saved to disk |
//! | `pep` | [`pep`] | PEP numerical index | declared status counts + total |
//!
//! # Failure tiers
//!
//! - An unreachable anchor page yields a header-only table (the fetch failure
//!   is already reported as a diagnostic).
//! - A missing anchor *element* aborts the mode with a global error.
//! - Unreachable or malformed per-item pages are reported and skipped.

pub mod download;
pub mod latest_versions;
pub mod pep;
pub mod whats_new;

use crate::config::Settings;
use crate::diagnostics::DiagnosticSink;
use crate::errors::Result;
use crate::http::Session;
use crate::models::{ExpectedStatus, ResultTable};
use clap::ValueEnum;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Everything a crawl mode needs: the session, settings and where to report.
#[derive(Clone)]
pub struct CrawlContext {
    pub session: Session,
    pub settings: Settings,
    pub sink: Arc<dyn DiagnosticSink>,
    pub expected: ExpectedStatus,
}

impl CrawlContext {
    pub fn new(session: Session, settings: Settings, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            session,
            settings,
            sink,
            expected: ExpectedStatus::default(),
        }
    }

    pub fn sink(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }
}

/// Crawl mode selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Release notes ("What's New") for every Python version.
    WhatsNew,
    /// Documentation versions and their support status.
    LatestVersions,
    /// Download the A4 PDF documentation archive.
    Download,
    /// Reconcile PEP statuses between the index and each PEP page.
    Pep,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::WhatsNew => "whats-new",
            Mode::LatestVersions => "latest-versions",
            Mode::Download => "download",
            Mode::Pep => "pep",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run one crawl mode.
///
/// Returns `Ok(None)` for modes without tabular output.
#[instrument(level = "info", skip(ctx))]
pub async fn run(mode: Mode, ctx: &CrawlContext) -> Result<Option<ResultTable>> {
    match mode {
        Mode::WhatsNew => whats_new::whats_new(ctx).await.map(Some),
        Mode::LatestVersions => latest_versions::latest_versions(ctx).await.map(Some),
        Mode::Download => download::download(ctx).await.map(|_| None),
        Mode::Pep => pep::pep(ctx).await.map(Some),
    }
}
