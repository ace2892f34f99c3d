//! Release notes ("What's New in Python") walker.
//!
//! Enumerates the table of contents on `whatsnew/`, follows each entry to its
//! release notes page and records the page title together with the editor
//! block (the page's first definition list).

use super::CrawlContext;
use crate::diagnostics::Diagnostic;
use crate::errors::Result;
use crate::html::{find_all, find_tag, text_of};
use crate::http::get_response;
use crate::models::ResultTable;
use crate::utils::progress_bar;
use futures::stream::{self, StreamExt};
use scraper::Html;
use tracing::{debug, info, instrument};
use url::Url;

/// One table-of-contents entry: the resolved link, or why there is none.
type TocEntry = std::result::Result<Url, String>;

/// Walk every release notes page linked from `whatsnew/`.
///
/// # Errors
///
/// A global error if the TOC section or its wrapper is missing from the
/// index page. Per-release failures are reported and skipped.
#[instrument(level = "info", skip_all)]
pub async fn whats_new(ctx: &CrawlContext) -> Result<ResultTable> {
    let whats_new_url = ctx.settings.doc_base()?.join("whatsnew/")?;
    let mut results = ResultTable::with_header(&["Link to article", "Title", "Editor, author"]);

    let Some(page) = get_response(&ctx.session, whats_new_url.as_str(), ctx.sink()).await else {
        return Ok(results);
    };
    let entries = toc_entries(&page.text(), &whats_new_url)?;
    info!(count = entries.len(), "Indexed release notes");

    let pb = progress_bar(entries.len(), "whats-new");
    let pb = &pb;
    let whats_new_url = &whats_new_url;
    let rows: Vec<Option<[String; 3]>> = stream::iter(entries)
        .then(|entry| async move {
            pb.inc(1);
            let link = match entry {
                Ok(link) => link,
                Err(detail) => {
                    ctx.sink().emit(Diagnostic::MissingElement {
                        url: whats_new_url.to_string(),
                        detail,
                    });
                    return None;
                }
            };
            let page = get_response(&ctx.session, link.as_str(), ctx.sink()).await?;
            match release_summary(&page.text()) {
                Ok((title, editors)) => {
                    debug!(%link, %title, "Parsed release notes");
                    Some([link.to_string(), title, editors])
                }
                Err(e) => {
                    ctx.sink().emit(Diagnostic::MissingElement {
                        url: link.to_string(),
                        detail: e.to_string(),
                    });
                    None
                }
            }
        })
        .collect()
        .await;
    pb.finish_and_clear();

    for row in rows.into_iter().flatten() {
        results.push(row);
    }
    info!(count = results.records().len(), "Collected release notes");
    Ok(results)
}

/// Links of every `li.toctree-l1` under the "What's New" TOC, resolved
/// against `base`.
fn toc_entries(html: &str, base: &Url) -> Result<Vec<TocEntry>> {
    let document = Html::parse_document(html);
    let main_section = find_tag(
        document.root_element(),
        "section",
        &[("id", "what-s-new-in-python".into())],
    )?;
    let toc = find_tag(main_section, "div", &[("class", "toctree-wrapper".into())])?;

    Ok(find_all(toc, "li", &[("class", "toctree-l1".into())])
        .into_iter()
        .map(|li| {
            let href = find_tag(li, "a", &[])
                .ok()
                .and_then(|a| a.value().attr("href"))
                .ok_or_else(|| format!("link in TOC entry {:?}", text_of(li).trim()))?;
            base.join(href)
                .map_err(|e| format!("valid link in TOC entry ({href}: {e})"))
        })
        .collect())
}

/// First heading and first definition list text of a release notes page.
fn release_summary(html: &str) -> Result<(String, String)> {
    let document = Html::parse_document(html);
    let h1 = find_tag(document.root_element(), "h1", &[])?;
    let dl = find_tag(document.root_element(), "dl", &[])?;

    let title = text_of(h1).trim().trim_end_matches('¶').trim().to_string();
    let editors = text_of(dl).replace('\n', " ").trim().to_string();
    Ok((title, editors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ParserError;
    use crate::scrapers::test_support::context;
    use tempfile::TempDir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    const INDEX: &str = r#"<html><body>
        <section id="what-s-new-in-python">
          <h1>What's New in Python</h1>
          <div class="toctree-wrapper compound">
            <ul>
              <li class="toctree-l1"><a class="reference internal" href="3.12.html">What's New In Python 3.12</a></li>
              <li class="toctree-l1"><a class="reference internal" href="3.11.html">What's New In Python 3.11</a></li>
              <li class="toctree-l1">Changelog (no link)</li>
            </ul>
          </div>
        </section>
    </body></html>"#;

    const RELEASE_312: &str = r##"<html><body>
        <h1>What's New In Python 3.12<a class="headerlink" href="#">¶</a></h1>
        <dl class="field-list simple">
<dt>Editor</dt>
<dd>Adam Turner</dd>
        </dl>
    </body></html>"##;

    const RELEASE_311_NO_DL: &str = "<html><body><h1>What's New In Python 3.11</h1></body></html>";

    #[test]
    fn test_release_summary_collapses_newlines() {
        let (title, editors) = release_summary(RELEASE_312).unwrap();
        assert_eq!(title, "What's New In Python 3.12");
        assert_eq!(editors, "Editor Adam Turner");
    }

    #[test]
    fn test_toc_entries_resolve_relative_links() {
        let base = Url::parse("https://docs.python.org/3/whatsnew/").unwrap();
        let entries = toc_entries(INDEX, &base).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0].as_ref().unwrap().as_str(),
            "https://docs.python.org/3/whatsnew/3.12.html"
        );
        assert!(entries[2].is_err());
    }

    #[tokio::test]
    async fn test_whats_new_skips_bad_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/whatsnew/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(INDEX))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/whatsnew/3.12.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RELEASE_312))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/whatsnew/3.11.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RELEASE_311_NO_DL))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let (ctx, sink) = context(&server.uri(), &dir);
        let table = whats_new(&ctx).await.unwrap();

        assert_eq!(table.header(), ["Link to article", "Title", "Editor, author"]);
        assert_eq!(table.records().len(), 1);
        assert_eq!(
            table.records()[0],
            [
                format!("{}/3/whatsnew/3.12.html", server.uri()),
                "What's New In Python 3.12".to_string(),
                "Editor Adam Turner".to_string(),
            ]
        );
        assert_eq!(sink.count(|d| matches!(d, Diagnostic::MissingElement { .. })), 2);
    }

    #[tokio::test]
    async fn test_missing_toc_section_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/whatsnew/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let (ctx, _sink) = context(&server.uri(), &dir);
        let err = whats_new(&ctx).await.unwrap_err();
        assert!(matches!(err, ParserError::TagNotFound { ref tag, .. } if tag == "section"));
    }
}
