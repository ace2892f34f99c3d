//! Tag lookup over parsed HTML.
//!
//! Only the lookups the extractors need are supported: one tag name plus a
//! set of attribute filters, each either a literal value or a regex. Absence
//! is reported as [`ParserError::TagNotFound`] so every call site decides for
//! itself whether a missing element is fatal or just skips one item.

use crate::errors::{ParserError, Result};
use itertools::Itertools;
use regex::Regex;
use scraper::ElementRef;

/// How a single attribute value is matched.
#[derive(Debug, Clone)]
pub enum AttrMatch {
    /// Literal value. For `class` a single class token also matches.
    Exact(String),
    /// Regex searched anywhere in the raw attribute value.
    Pattern(Regex),
}

impl AttrMatch {
    fn matches(&self, name: &str, value: &str) -> bool {
        match self {
            AttrMatch::Exact(expected) => {
                value == expected.as_str()
                    || (name == "class"
                        && value
                            .split_ascii_whitespace()
                            .any(|c| c == expected.as_str()))
            }
            AttrMatch::Pattern(re) => re.is_match(value),
        }
    }
}

impl From<&str> for AttrMatch {
    fn from(value: &str) -> Self {
        AttrMatch::Exact(value.to_string())
    }
}

impl From<Regex> for AttrMatch {
    fn from(re: Regex) -> Self {
        AttrMatch::Pattern(re)
    }
}

/// Attribute filters for a lookup, all of which must match.
pub type Attrs<'a> = &'a [(&'a str, AttrMatch)];

fn element_matches(el: &ElementRef<'_>, tag: &str, attrs: Attrs<'_>) -> bool {
    el.value().name().eq_ignore_ascii_case(tag)
        && attrs.iter().all(|(name, want)| {
            el.value()
                .attr(name)
                .is_some_and(|value| want.matches(name, value))
        })
}

fn describe(attrs: Attrs<'_>) -> String {
    let inner = attrs
        .iter()
        .map(|(name, want)| match want {
            AttrMatch::Exact(v) => format!("{name}={v:?}"),
            AttrMatch::Pattern(re) => format!("{name}=/{}/", re.as_str()),
        })
        .join(", ");
    format!("{{{inner}}}")
}

/// All descendants of `node` (excluding `node` itself) matching `tag` and
/// `attrs`, in document order.
pub fn find_all<'a>(node: ElementRef<'a>, tag: &str, attrs: Attrs<'_>) -> Vec<ElementRef<'a>> {
    node.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| element_matches(el, tag, attrs))
        .collect()
}

/// First descendant of `node` matching `tag` and every filter in `attrs`.
///
/// # Errors
///
/// [`ParserError::TagNotFound`] carrying the tag name and the attempted
/// filters when nothing matches.
pub fn find_tag<'a>(node: ElementRef<'a>, tag: &str, attrs: Attrs<'_>) -> Result<ElementRef<'a>> {
    node.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| element_matches(el, tag, attrs))
        .ok_or_else(|| ParserError::TagNotFound {
            tag: tag.to_string(),
            attrs: describe(attrs),
        })
}

/// Concatenated text of every text node under `el`.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}
