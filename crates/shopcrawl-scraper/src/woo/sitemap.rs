//! Sitemap discovery of WooCommerce product detail URLs.
//!
//! A root sitemap is either a `<sitemapindex>` of nested sitemaps or a
//! `<urlset>` of pages. Indexes are followed breadth-first, preferring the
//! nested sitemaps whose URL mentions one of the configured patterns
//! (`product` by default), down to [`MAX_SITEMAP_DEPTH`] levels.

use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::client::StoreClient;
use crate::error::ScraperError;
use crate::session::CrawlSession;

/// Deepest nesting level of sitemap indexes that is still followed.
pub const MAX_SITEMAP_DEPTH: usize = 3;

/// The `<loc>` references of one sitemap document.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SitemapRefs {
    /// `<sitemap><loc>` entries: nested sitemaps.
    pub sitemaps: Vec<String>,
    /// `<url><loc>` entries: pages.
    pub pages: Vec<String>,
}

/// Extracts nested-sitemap and page references from a sitemap document.
///
/// Only a `<loc>` whose direct parent is `<sitemap>` or `<url>` counts, so
/// image and video extensions (`<image:loc>` inside `<image:image>`) are
/// ignored.
///
/// # Errors
///
/// Returns the `quick_xml` error if the document is not well-formed XML.
pub fn parse_sitemap(xml: &str) -> Result<SitemapRefs, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut refs = SitemapRefs::default();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut loc_text: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"loc" {
                    loc_text = Some(String::new());
                }
                stack.push(name);
            }
            Event::Text(e) => {
                if let Some(text) = loc_text.as_mut() {
                    let unescaped = e
                        .unescape()
                        .map_or_else(|_| String::from_utf8_lossy(&e).into_owned(), Cow::into_owned);
                    text.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if let Some(text) = loc_text.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let closed = stack.pop();
                if closed.as_deref() == Some(b"loc".as_slice()) {
                    let loc = loc_text.take().unwrap_or_default();
                    let loc = loc.trim();
                    if !loc.is_empty() {
                        match stack.last().map(Vec::as_slice) {
                            Some(b"sitemap") => refs.sitemaps.push(loc.to_owned()),
                            Some(b"url") => refs.pages.push(loc.to_owned()),
                            _ => {}
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(refs)
}

/// Chooses which nested sitemaps to follow: those whose URL contains one of
/// `patterns` (case-insensitive), or all of them when none does.
#[must_use]
pub fn select_nested(sitemaps: &[String], patterns: &[String]) -> Vec<String> {
    let patterns: Vec<String> = patterns
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();
    let matching: Vec<String> = sitemaps
        .iter()
        .filter(|url| {
            let url = url.to_lowercase();
            patterns.iter().any(|p| url.contains(p.as_str()))
        })
        .cloned()
        .collect();

    if matching.is_empty() {
        sitemaps.to_vec()
    } else {
        matching
    }
}

/// Walks the sitemap tree rooted at `root_url` and returns the detail URLs
/// not yet seen by `session`, in discovery order.
///
/// A failed or malformed nested sitemap is logged and skipped.
///
/// # Errors
///
/// Returns the fetch or parse error of the root sitemap; without it there
/// is nothing to crawl.
pub async fn discover_detail_urls(
    client: &StoreClient,
    root_url: &str,
    patterns: &[String],
    session: &mut CrawlSession,
) -> Result<Vec<String>, ScraperError> {
    let mut queue: VecDeque<(String, usize)> = VecDeque::from([(root_url.to_owned(), 0)]);
    let mut visited: HashSet<String> = HashSet::new();
    let mut detail_urls = Vec::new();

    while let Some((url, depth)) = queue.pop_front() {
        if !visited.insert(url.clone()) {
            continue;
        }

        let refs = match fetch_sitemap(client, &url).await {
            Ok(refs) => refs,
            Err(e) if depth == 0 => return Err(e),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "skipping unavailable sitemap");
                continue;
            }
        };

        if refs.sitemaps.is_empty() {
            let before = detail_urls.len();
            for page in refs.pages {
                if session.mark_url(&page) {
                    detail_urls.push(page);
                }
            }
            tracing::debug!(url = %url, new_urls = detail_urls.len() - before, "read sitemap leaf");
            continue;
        }

        if depth >= MAX_SITEMAP_DEPTH {
            tracing::warn!(url = %url, depth, "sitemap nesting too deep, not following");
            continue;
        }
        let nested = select_nested(&refs.sitemaps, patterns);
        tracing::debug!(
            url = %url,
            nested = refs.sitemaps.len(),
            followed = nested.len(),
            "read sitemap index"
        );
        queue.extend(nested.into_iter().map(|n| (n, depth + 1)));
    }

    tracing::info!(
        root = %root_url,
        detail_urls = detail_urls.len(),
        "sitemap discovery complete"
    );
    Ok(detail_urls)
}

async fn fetch_sitemap(client: &StoreClient, url: &str) -> Result<SitemapRefs, ScraperError> {
    let body = client.get_text(url).await?;
    parse_sitemap(&body).map_err(|source| ScraperError::Sitemap {
        url: url.to_owned(),
        source,
    })
}
