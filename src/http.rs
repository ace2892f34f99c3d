//! Cache-aware HTTP session and the failure-tolerant fetch used by every
//! extractor.
//!
//! # Cache layout
//!
//! Successful responses are stored under the cache directory, keyed by the
//! SHA-256 of the URL:
//!
//! ```text
//! .http_cache/
//! ├── 3f1c…e9.json   # url, status, fetched_at
//! └── 3f1c…e9.body   # raw response bytes
//! ```
//!
//! A broken or unreadable entry is a cache miss, never a fetch failure.

use crate::config::Settings;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, instrument, warn};

/// A fetched page.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
    pub from_cache: bool,
}

impl Page {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheMeta {
    url: String,
    status: u16,
    fetched_at: DateTime<Utc>,
}

/// On-disk store of successful responses.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    ttl: Option<Duration>,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Option<Duration>) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// Cache configured by `settings`, whether or not a session uses it.
    pub fn for_settings(settings: &Settings) -> Self {
        Self::new(&settings.cache_dir, settings.cache_ttl())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key(url: &str) -> String {
        format!("{:x}", Sha256::digest(url.as_bytes()))
    }

    fn paths(&self, url: &str) -> (PathBuf, PathBuf) {
        let key = Self::key(url);
        (
            self.dir.join(format!("{key}.json")),
            self.dir.join(format!("{key}.body")),
        )
    }

    /// Cached page for `url`, if present and not older than the TTL.
    pub async fn get(&self, url: &str) -> Result<Option<Page>> {
        let (meta_path, body_path) = self.paths(url);
        let raw = match fs::read(&meta_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let meta: CacheMeta = serde_json::from_slice(&raw)?;
        if meta.url != url {
            return Ok(None);
        }
        if let Some(ttl) = self.ttl {
            let age = (Utc::now() - meta.fetched_at).to_std().unwrap_or_default();
            if age >= ttl {
                debug!(%url, ?age, "Cached response expired");
                return Ok(None);
            }
        }
        let body = match fs::read(&body_path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(Page {
            url: meta.url,
            status: meta.status,
            body,
            from_cache: true,
        }))
    }

    pub async fn put(&self, page: &Page) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let (meta_path, body_path) = self.paths(&page.url);
        let meta = CacheMeta {
            url: page.url.clone(),
            status: page.status,
            fetched_at: Utc::now(),
        };
        // Body first: a meta file without its body reads as a miss.
        fs::write(&body_path, &page.body).await?;
        fs::write(&meta_path, serde_json::to_vec(&meta)?).await?;
        Ok(())
    }

    /// Remove every cached response. Returns the number of files deleted.
    #[instrument(level = "info", skip_all, fields(dir = %self.dir.display()))]
    pub async fn clear(&self) -> Result<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }
        debug!(removed, "Removed cached responses");
        Ok(removed)
    }
}

/// HTTP client that transparently serves repeat requests from the cache.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    cache: Option<ResponseCache>,
}

impl Session {
    /// Build a session from settings; `use_cache = false` bypasses the cache
    /// entirely.
    pub fn new(settings: &Settings, use_cache: bool) -> Result<Self> {
        let mut builder = Client::builder().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let cache = use_cache.then(|| ResponseCache::for_settings(settings));
        Ok(Self {
            client: builder.build()?,
            cache,
        })
    }

    /// GET `url`, consulting the cache first.
    ///
    /// # Errors
    ///
    /// Only transport-level failures (DNS, connect, timeout, broken body).
    /// HTTP error statuses come back as a [`Page`].
    pub async fn get(&self, url: &str) -> Result<Page> {
        if let Some(cache) = &self.cache {
            match cache.get(url).await {
                Ok(Some(page)) => {
                    debug!(%url, "Cache hit");
                    return Ok(page);
                }
                Ok(None) => {}
                Err(e) => warn!(%url, error = %e, "Unreadable cache entry; refetching"),
            }
        }

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        let page = Page {
            url: url.to_string(),
            status,
            body,
            from_cache: false,
        };
        debug!(%url, status, bytes = page.body.len(), "Fetched");

        if page.is_success() {
            if let Some(cache) = &self.cache {
                if let Err(e) = cache.put(&page).await {
                    warn!(%url, error = %e, "Failed to store response in cache");
                }
            }
        }
        Ok(page)
    }
}

/// Fetch `url`, turning a transport failure into a diagnostic and `None`.
///
/// Callers skip the current item on `None`; one unreachable page never
/// aborts a crawl.
pub async fn get_response(session: &Session, url: &str, sink: &dyn DiagnosticSink) -> Option<Page> {
    match session.get(url).await {
        Ok(page) => {
            debug!(%url, status = page.status, from_cache = page.from_cache, "Page ready");
            Some(page)
        }
        Err(e) => {
            sink.emit(Diagnostic::Unreachable {
                url: url.to_string(),
                error: e.to_string(),
            });
            None
        }
    }
}
