//! Runtime settings.
//!
//! Every field has a default, so the crawler runs without any config file.
//! A YAML file passed with `--config` overrides individual fields:
//!
//! ```yaml
//! main_doc_url: https://docs.python.org/3/
//! main_pep_url: https://peps.python.org/
//! downloads_dir: downloads
//! results_dir: results
//! cache_dir: .http_cache
//! cache_ttl_secs: 86400
//! concurrency: 8
//! ```

use crate::errors::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

pub const MAIN_DOC_URL: &str = "https://docs.python.org/3/";
pub const MAIN_PEP_URL: &str = "https://peps.python.org/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the Python documentation; release notes, versions and the
    /// download page are resolved against it.
    pub main_doc_url: String,
    /// Root of the PEP index site.
    pub main_pep_url: String,
    pub downloads_dir: PathBuf,
    pub results_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// Age after which cached responses are refetched. `None` keeps them forever.
    pub cache_ttl_secs: Option<u64>,
    /// PEP detail pages fetched concurrently.
    pub concurrency: usize,
    /// Per-request timeout. `None` leaves the HTTP client default in place.
    pub request_timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            main_doc_url: MAIN_DOC_URL.to_string(),
            main_pep_url: MAIN_PEP_URL.to_string(),
            downloads_dir: PathBuf::from("downloads"),
            results_dir: PathBuf::from("results"),
            cache_dir: PathBuf::from(".http_cache"),
            cache_ttl_secs: None,
            concurrency: 8,
            request_timeout_secs: None,
            user_agent: concat!("pydocs_crawler/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or the defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or if either base URL is
    /// not an absolute URL.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let settings: Settings = serde_yaml::from_str(&raw)?;
                info!(path = %path.display(), "Loaded configuration");
                settings
            }
            None => Settings::default(),
        };
        settings.doc_base()?;
        settings.pep_base()?;
        Ok(settings)
    }

    pub fn doc_base(&self) -> Result<Url> {
        Ok(Url::parse(&self.main_doc_url)?)
    }

    pub fn pep_base(&self) -> Result<Url> {
        Ok(Url::parse(&self.main_pep_url)?)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Concurrency clamped to at least one in-flight request.
    pub fn fetch_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ParserError;
    use std::io::Write;

    #[test]
    fn test_defaults_point_at_python_sites() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.main_doc_url, MAIN_DOC_URL);
        assert_eq!(settings.main_pep_url, MAIN_PEP_URL);
        assert_eq!(settings.cache_ttl(), None);
        assert_eq!(settings.fetch_concurrency(), 8);
    }

    #[test]
    fn test_yaml_overrides_single_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "main_pep_url: http://127.0.0.1:8080/").unwrap();
        writeln!(file, "cache_ttl_secs: 60").unwrap();
        writeln!(file, "concurrency: 0").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.main_pep_url, "http://127.0.0.1:8080/");
        assert_eq!(settings.main_doc_url, MAIN_DOC_URL);
        assert_eq!(settings.cache_ttl(), Some(Duration::from_secs(60)));
        assert_eq!(settings.fetch_concurrency(), 1);
    }

    #[test]
    fn test_relative_base_url_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "main_doc_url: docs/3/").unwrap();

        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ParserError::Url(_)));
    }
}
