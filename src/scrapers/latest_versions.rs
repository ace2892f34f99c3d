//! Documentation versions listed in the docs sidebar.

use super::CrawlContext;
use crate::errors::{ParserError, Result};
use crate::html::{find_all, find_tag, text_of};
use crate::http::get_response;
use crate::models::{ResultTable, VersionStatus};
use scraper::Html;
use tracing::{info, instrument};

/// Marker text identifying the versions list among the sidebar lists.
const VERSIONS_MARKER: &str = "All versions";

/// List every documentation version with its status.
///
/// # Errors
///
/// [`ParserError::NotFound`] if no sidebar list mentions "All versions", and
/// [`ParserError::TagNotFound`] if the sidebar itself is missing.
#[instrument(level = "info", skip_all)]
pub async fn latest_versions(ctx: &CrawlContext) -> Result<ResultTable> {
    let url = ctx.settings.doc_base()?;
    let mut results = ResultTable::with_header(&["Link to documentation", "Version", "Status"]);

    let Some(page) = get_response(&ctx.session, url.as_str(), ctx.sink()).await else {
        return Ok(results);
    };
    for (link, parsed) in version_links(&page.text())? {
        results.push([link, parsed.version, parsed.status]);
    }
    info!(count = results.records().len(), "Collected documentation versions");
    Ok(results)
}

/// `(href, version/status)` for every link in the first sidebar list whose
/// text contains the versions marker.
fn version_links(html: &str) -> Result<Vec<(String, VersionStatus)>> {
    let document = Html::parse_document(html);
    let sidebar = find_tag(
        document.root_element(),
        "div",
        &[("class", "sphinxsidebarwrapper".into())],
    )?;

    let versions_list = find_all(sidebar, "ul", &[])
        .into_iter()
        .find(|ul| text_of(*ul).contains(VERSIONS_MARKER))
        .ok_or_else(|| {
            ParserError::NotFound(format!("sidebar list containing {VERSIONS_MARKER:?}"))
        })?;

    Ok(find_all(versions_list, "a", &[])
        .into_iter()
        .map(|a| {
            let href = a.value().attr("href").unwrap_or_default().to_string();
            (href, VersionStatus::parse(&text_of(a)))
        })
        .collect())
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

    const SIDEBAR: &str = r#"<html><body>
        <div class="sphinxsidebar"><div class="sphinxsidebarwrapper">
          <ul><li><a href="/3/download.html">Download</a></li></ul>
          <ul>
            <li><a href="https://docs.python.org/3.14/">Python 3.14 (in development)</a></li>
            <li><a href="https://docs.python.org/3.13/">Python 3.13 (stable)</a></li>
            <li><a href="https://www.python.org/doc/versions/">All versions</a></li>
          </ul>
          <ul><li>Also mentions All versions but comes later</li></ul>
        </div></div>
    </body></html>"#;

    #[test]
    fn test_first_marker_list_wins() {
        let links = version_links(SIDEBAR).unwrap();
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].0, "https://docs.python.org/3.14/");
        assert_eq!(links[0].1.version, "3.14");
        assert_eq!(links[0].1.status, "in development");
        assert_eq!(links[1].1.status, "stable");
        assert_eq!(links[2].1.version, "All versions");
        assert_eq!(links[2].1.status, "");
    }

    #[test]
    fn test_missing_marker_is_global_not_found() {
        let html = r#"<div class="sphinxsidebarwrapper"><ul><li><a href="x">Python 3.13 (stable)</a></li></ul></div>"#;
        let err = version_links(html).unwrap_err();
        assert!(matches!(err, ParserError::NotFound(_)));
        assert!(err.is_global());
    }

    #[test]
    fn test_missing_sidebar_is_tag_not_found() {
        let err = version_links("<html><body></body></html>").unwrap_err();
        assert!(matches!(err, ParserError::TagNotFound { .. }));
    }

    #[tokio::test]
    async fn test_latest_versions_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SIDEBAR))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let (ctx, sink) = context(&server.uri(), &dir);
        let table = latest_versions(&ctx).await.unwrap();

        assert_eq!(table.header(), ["Link to documentation", "Version", "Status"]);
        assert_eq!(
            table.records()[1],
            ["https://docs.python.org/3.13/", "3.13", "stable"]
        );
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_docs_root_yields_header_only() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let dir = TempDir::new().unwrap();
        let (ctx, sink) = context(&base, &dir);
        let table = latest_versions(&ctx).await.unwrap();

        assert!(table.records().is_empty());
        assert_eq!(sink.events().len(), 1);
    }
}
