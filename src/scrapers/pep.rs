//! PEP status reconciliation.
//!
//! The PEP numerical index lists every PEP with a short status code (the
//! second letter of the first cell, e.g. `SF` for a Standards Track PEP that
//! is Final). Each PEP page declares its full status in its header field list.
//! This module cross-checks the two and counts the declared statuses.
//!
//! # Pipeline
//!
//! 1. Parse the index into owned [`IndexRow`]s.
//! 2. Fetch every PEP page concurrently (bounded, order preserving) and turn
//!    each into a [`DetailOutcome`].
//! 3. Fold the `(row, outcome)` pairs sequentially with [`reconcile`], which
//!    owns all counting and anomaly reporting.
//!
//! The fold is pure apart from its diagnostic sink, so the counting rules can
//! be tested without any network.

use super::CrawlContext;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::errors::Result;
use crate::html::{find_all, find_tag, text_of};
use crate::http::get_response;
use crate::models::{ExpectedStatus, ResultTable, StatusSummary};
use crate::utils::{progress_bar, squash_whitespace, truncate_for_log};
use futures::stream::{self, StreamExt};
use scraper::{ElementRef, Html};
use tracing::{info, instrument};
use url::Url;

/// Text of the field-list label carrying the PEP status.
const STATUS_LABEL: &str = "Status";

/// One row of the numerical index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    /// Status code: the first cell's text minus its leading type letter.
    pub code: String,
    /// Resolved PEP page URL, if the row links to one.
    pub url: Option<Url>,
    /// Row text, for diagnostics.
    pub text: String,
}

/// What became of one PEP page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    /// The page declares this status.
    Declared(String),
    /// The page could not be fetched; already reported by the fetcher.
    Unreachable,
    /// The index row has no link to follow.
    NoLink,
    /// The page has no PEP header field list.
    NoFieldList,
    /// The field list has no `Status` entry.
    NoStatusField,
}

/// Reconcile index status codes with the statuses declared on PEP pages.
///
/// # Errors
///
/// A global error if the index page has no numerical index section or no
/// table body. Per-PEP problems are reported and skipped.
#[instrument(level = "info", skip_all)]
pub async fn pep(ctx: &CrawlContext) -> Result<ResultTable> {
    let index_url = ctx.settings.pep_base()?;
    let Some(page) = get_response(&ctx.session, index_url.as_str(), ctx.sink()).await else {
        return Ok(StatusSummary::default().into_table());
    };
    let rows = index_rows(&page.text(), &index_url)?;
    info!(count = rows.len(), "Indexed PEPs");

    let pb = progress_bar(rows.len(), "pep");
    let pb = &pb;
    let entries: Vec<(IndexRow, DetailOutcome)> = stream::iter(rows)
        .map(|row| async move {
            let outcome = match &row.url {
                Some(url) => match get_response(&ctx.session, url.as_str(), ctx.sink()).await {
                    Some(page) => declared_status(&page.text()),
                    None => DetailOutcome::Unreachable,
                },
                None => DetailOutcome::NoLink,
            };
            pb.inc(1);
            (row, outcome)
        })
        .buffered(ctx.settings.fetch_concurrency())
        .collect()
        .await;
    pb.finish_and_clear();

    let summary = reconcile(entries, &ctx.expected, ctx.sink());
    info!(
        total = summary.total(),
        counted = summary.counted(),
        statuses = summary.counts().len(),
        "PEP reconciliation finished"
    );
    Ok(summary.into_table())
}

/// Fold fetched PEP pages into a [`StatusSummary`].
///
/// Every row counts towards the total, whatever its outcome. Unknown codes and
/// status mismatches are reported but still counted (an unknown code is not
/// also reported as a mismatch); rows whose status cannot
/// be determined are reported (unless the fetcher already did) and left out
/// of the per-status counts.
pub fn reconcile<I>(entries: I, expected: &ExpectedStatus, sink: &dyn DiagnosticSink) -> StatusSummary
where
    I: IntoIterator<Item = (IndexRow, DetailOutcome)>,
{
    let mut summary = StatusSummary::default();
    for (row, outcome) in entries {
        summary.count_row();

        let expected_statuses = expected.lookup(&row.code);
        if expected_statuses.is_none() {
            sink.emit(Diagnostic::UnknownStatusCode {
                code: row.code.clone(),
                row: truncate_for_log(&row.text, 200),
            });
        }
        let page_url = || {
            row.url
                .as_ref()
                .map_or_else(|| row.text.clone(), Url::to_string)
        };

        let declared = match outcome {
            DetailOutcome::Declared(status) => status,
            DetailOutcome::Unreachable => continue,
            DetailOutcome::NoLink => {
                sink.emit(Diagnostic::MissingElement {
                    url: page_url(),
                    detail: "link to the PEP page".to_string(),
                });
                continue;
            }
            DetailOutcome::NoFieldList => {
                sink.emit(Diagnostic::MissingElement {
                    url: page_url(),
                    detail: "PEP header field list".to_string(),
                });
                continue;
            }
            DetailOutcome::NoStatusField => {
                sink.emit(Diagnostic::MissingStatusField { url: page_url() });
                continue;
            }
        };

        // An unknown code has already been reported; there is nothing to
        // compare against.
        if let Some(statuses) = expected_statuses {
            if !statuses.contains(&declared.as_str()) {
                sink.emit(Diagnostic::StatusMismatch {
                    url: page_url(),
                    declared: declared.clone(),
                    expected: statuses.iter().map(|s| s.to_string()).collect(),
                });
            }
        }
        summary.record(&declared);
    }
    summary
}

/// Rows of the numerical index table.
fn index_rows(html: &str, base: &Url) -> Result<Vec<IndexRow>> {
    let document = Html::parse_document(html);
    let numerical_index = find_tag(
        document.root_element(),
        "section",
        &[("id", "numerical-index".into())],
    )?;
    let tbody = find_tag(numerical_index, "tbody", &[])?;

    Ok(find_all(tbody, "tr", &[])
        .into_iter()
        .map(|tr| {
            let code = find_tag(tr, "td", &[])
                .map(|td| text_of(td).trim().chars().skip(1).collect::<String>())
                .unwrap_or_default();
            let url = find_tag(tr, "a", &[])
                .ok()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| base.join(href).ok());
            IndexRow {
                code,
                url,
                text: squash_whitespace(&text_of(tr)),
            }
        })
        .collect())
}

/// Status declared in a PEP page's header field list.
///
/// The value is the node two siblings after the `Status` label's element:
/// the label's `dt` is followed by a whitespace text node, then the `dd`.
fn declared_status(html: &str) -> DetailOutcome {
    let document = Html::parse_document(html);
    let Ok(field_list) = find_tag(
        document.root_element(),
        "dl",
        &[("class", "rfc2822 field-list simple".into())],
    ) else {
        return DetailOutcome::NoFieldList;
    };

    let value = field_list
        .descendants()
        .find(|node| node.value().as_text().is_some_and(|t| &**t == STATUS_LABEL))
        .and_then(|label| label.parent())
        .and_then(|label_el| label_el.next_sibling())
        .and_then(|separator| separator.next_sibling());

    match value {
        Some(node) => {
            let text = match ElementRef::wrap(node) {
                Some(el) => text_of(el),
                None => node
                    .value()
                    .as_text()
                    .map(|t| String::from(&**t))
                    .unwrap_or_default(),
            };
            DetailOutcome::Declared(text.trim().to_string())
        }
        None => DetailOutcome::NoStatusField,
    }
}
