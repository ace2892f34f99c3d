//! # pydocs_crawler
//!
//! Crawls the Python documentation and the PEP index and reports what it
//! finds as tables.
//!
//! ## Modes
//!
//! - `whats-new`: title and editors of every "What's New" release notes page
//! - `latest-versions`: documentation versions and their support status
//! - `download`: the A4 PDF documentation archive, saved to `downloads/`
//! - `pep`: PEP statuses as declared on each PEP page, reconciled against
//!   the status codes of the numerical index
//!
//! ## Usage
//!
//! ```sh
//! pydocs_crawler pep -o pretty
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: a cache-aware [`http::Session`]; unreachable pages are
//!    reported and skipped
//! 2. **Locating**: [`html::find_tag`] with typed absence
//! 3. **Extracting**: one module per mode under [`scrapers`]
//! 4. **Output**: console, CSV or JSON via [`outputs`]

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod diagnostics;
mod errors;
mod html;
mod http;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::Settings;
use diagnostics::TracingSink;
use http::{ResponseCache, Session};
use scrapers::CrawlContext;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("parser starting");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = Settings::load(args.config.as_deref())?;
    let session = Session::new(&settings, !args.no_cache)?;

    if args.clear_cache {
        let cache = ResponseCache::for_settings(&settings);
        let removed = cache.clear().await?;
        info!(dir = %cache.dir().display(), removed, "Cache cleared");
    }

    let mode = args.mode;
    let ctx = CrawlContext::new(session, settings, Arc::new(TracingSink));
    let results = match scrapers::run(mode, &ctx).await {
        Ok(results) => results,
        Err(e) => {
            error!(%mode, error = %e, global = e.is_global(), "Crawl aborted");
            return Err(e.into());
        }
    };

    if let Some(table) = results {
        info!(%mode, shape = %outputs::console::describe(&table), "Crawl finished");
        outputs::control_output(&table, args.output, mode, &ctx.settings).await?;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "parser finished"
    );
    Ok(())
}
