//! Command-line interface definitions.
//!
//! # Examples
//!
//! ```sh
//! # Count PEP statuses and print them as a table
//! pydocs_crawler pep -o pretty
//!
//! # Refresh the cache and save the version list as CSV
//! pydocs_crawler latest-versions --clear-cache -o file
//!
//! # Download the A4 PDF archive
//! pydocs_crawler download
//! ```

use crate::scrapers::Mode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How a result table is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Boxed, left-aligned table on stdout.
    Pretty,
    /// CSV file in the results directory.
    File,
    /// JSON file in the results directory.
    Json,
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Crawl mode
    #[arg(value_enum)]
    pub mode: Mode,

    /// Clear the HTTP cache before crawling
    #[arg(short, long)]
    pub clear_cache: bool,

    /// Output format; rows are printed space-separated when omitted
    #[arg(short, long, value_enum)]
    pub output: Option<OutputMode>,

    /// Optional path to a YAML settings file
    #[arg(long, env = "PYDOCS_CRAWLER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bypass the HTTP cache for this run
    #[arg(long)]
    pub no_cache: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["pydocs_crawler", "pep"]);

        assert_eq!(cli.mode, Mode::Pep);
        assert!(!cli.clear_cache);
        assert_eq!(cli.output, None);
        assert!(!cli.no_cache);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["pydocs_crawler", "whats-new", "-c", "-o", "pretty"]);

        assert_eq!(cli.mode, Mode::WhatsNew);
        assert!(cli.clear_cache);
        assert_eq!(cli.output, Some(OutputMode::Pretty));
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "pydocs_crawler",
            "latest-versions",
            "--output",
            "file",
            "--config",
            "/tmp/crawler.yaml",
            "--no-cache",
        ]);

        assert_eq!(cli.mode, Mode::LatestVersions);
        assert_eq!(cli.output, Some(OutputMode::File));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/crawler.yaml")));
        assert!(cli.no_cache);
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["pydocs_crawler", "sitemap"]).is_err());
    }
}
