//! PDF (A4) documentation archive download.

use super::CrawlContext;
use crate::diagnostics::Diagnostic;
use crate::errors::{ParserError, Result};
use crate::html::find_tag;
use crate::http::get_response;
use crate::utils::{ensure_writable_dir, filename_from_url};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::path::PathBuf;
use tokio::fs;
use tracing::{instrument, warn};
use url::Url;

static PDF_A4_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".+pdf-a4\.zip$").expect("archive pattern is valid"));

/// Download the A4 PDF archive linked from `download.html`.
///
/// Returns the saved path, or `None` when the download page or the archive
/// itself could not be fetched, or the archive request answered with an
/// error status. Nothing is written in that case.
///
/// # Errors
///
/// A global error if the page has no main block, no docutils table or no
/// A4 archive link; I/O errors writing the archive.
#[instrument(level = "info", skip_all)]
pub async fn download(ctx: &CrawlContext) -> Result<Option<PathBuf>> {
    let downloads_url = ctx.settings.doc_base()?.join("download.html")?;
    let Some(page) = get_response(&ctx.session, downloads_url.as_str(), ctx.sink()).await else {
        return Ok(None);
    };
    let archive_url = archive_link(&page.text(), &downloads_url)?;
    let filename = filename_from_url(&archive_url)
        .ok_or_else(|| ParserError::NotFound(format!("file name in {archive_url}")))?;

    let Some(archive) = get_response(&ctx.session, archive_url.as_str(), ctx.sink()).await else {
        return Ok(None);
    };
    if !archive.is_success() {
        warn!(url = %archive_url, status = archive.status, "Archive request returned an error status");
        return Ok(None);
    }

    let downloads_dir = &ctx.settings.downloads_dir;
    ensure_writable_dir(downloads_dir).await?;
    let archive_path = downloads_dir.join(filename);
    fs::write(&archive_path, &archive.body).await?;

    ctx.sink().emit(Diagnostic::ArchiveSaved {
        path: archive_path.display().to_string(),
    });
    Ok(Some(archive_path))
}

/// Absolute URL of the A4 archive in the download table.
fn archive_link(html: &str, base: &Url) -> Result<Url> {
    let document = Html::parse_document(html);
    let main = find_tag(document.root_element(), "div", &[("role", "main".into())])?;
    let table = find_tag(main, "table", &[("class", "docutils".into())])?;
    let link = find_tag(table, "a", &[("href", PDF_A4_PATTERN.clone().into())])?;
    // The pattern filter guarantees the attribute exists.
    let href = link.value().attr("href").unwrap_or_default();
    Ok(base.join(href)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::test_support::context;
    use tempfile::TempDir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    const DOWNLOAD_PAGE: &str = r#"<html><body>
        <div class="body" role="main">
          <table class="docutils align-default">
            <tr><td>PDF (US-Letter)</td><td><a href="archives/python-3.13-docs-pdf-letter.zip">Download</a></td></tr>
            <tr><td>PDF (A4)</td><td><a href="archives/python-3.13-docs-pdf-a4.zip">Download</a></td></tr>
          </table>
        </div>
    </body></html>"#;

    #[test]
    fn test_archive_link_is_resolved() {
        let base = Url::parse("https://docs.python.org/3/download.html").unwrap();
        let url = archive_link(DOWNLOAD_PAGE, &base).unwrap();
        assert_eq!(
            url.as_str(),
            "https://docs.python.org/3/archives/python-3.13-docs-pdf-a4.zip"
        );
    }

    #[test]
    fn test_missing_archive_link_reports_pattern() {
        let base = Url::parse("https://docs.python.org/3/download.html").unwrap();
        let html = r#"<div role="main"><table class="docutils"><tr><td>nothing</td></tr></table></div>"#;
        match archive_link(html, &base).unwrap_err() {
            ParserError::TagNotFound { tag, attrs } => {
                assert_eq!(tag, "a");
                assert!(attrs.contains("pdf-a4"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_download_saves_archive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/download.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DOWNLOAD_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/archives/python-3.13-docs-pdf-a4.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04zip".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let (ctx, sink) = context(&server.uri(), &dir);
        let saved = download(&ctx).await.unwrap().unwrap();

        assert_eq!(saved, dir.path().join("downloads").join("python-3.13-docs-pdf-a4.zip"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"PK\x03\x04zip");
        assert_eq!(
            sink.events(),
            vec![Diagnostic::ArchiveSaved {
                path: saved.display().to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_error_status_archive_is_not_saved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/download.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DOWNLOAD_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/archives/python-3.13-docs-pdf-a4.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let (ctx, sink) = context(&server.uri(), &dir);

        assert_eq!(download(&ctx).await.unwrap(), None);
        assert!(!dir.path().join("downloads").join("python-3.13-docs-pdf-a4.zip").exists());
        assert_eq!(sink.count(|d| matches!(d, Diagnostic::ArchiveSaved { .. })), 0);
    }
}
