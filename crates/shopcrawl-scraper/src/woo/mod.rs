//! WooCommerce storefront crawl: sitemap discovery, then concurrent detail
//! page fetches scraped with a [`SelectorConfig`].

mod detail;
mod selectors;
mod sitemap;

use futures::stream::{self, StreamExt};
use scraper::Html;
use shopcrawl_core::SiteConfig;

use crate::client::StoreClient;
use crate::error::ScraperError;
use crate::session::CrawlSession;

pub use detail::{breadcrumb_category, extract_product, page_slug, CATEGORY_SEPARATOR};
pub use selectors::{Expression, SelectorConfig};
pub use sitemap::{parse_sitemap, select_nested, SitemapRefs, MAX_SITEMAP_DEPTH};

/// Crawls one WooCommerce site whose `domain` is the root sitemap URL.
///
/// Detail pages are fetched up to `detail_concurrency` at a time and
/// processed here as they complete, so only this task touches `session`.
/// A detail page that fails to fetch is logged and dropped.
///
/// # Errors
///
/// Returns the fetch or parse error of the root sitemap.
pub async fn crawl_woocommerce(
    client: &StoreClient,
    site: &SiteConfig,
    config: &SelectorConfig,
    detail_concurrency: usize,
    session: &mut CrawlSession,
) -> Result<(), ScraperError> {
    session.set_currency(&config.currency);
    let domain = session.origin_domain().to_owned();
    tracing::info!(domain = %domain, currency = %session.currency(), "starting woocommerce crawl");

    let detail_urls =
        sitemap::discover_detail_urls(client, site.domain.trim(), &config.site_map, session)
            .await?;
    let total = detail_urls.len();

    let mut pages = stream::iter(detail_urls)
        .map(|url| async move {
            let body = client.get_text(&url).await;
            (url, body)
        })
        .buffer_unordered(detail_concurrency.max(1));

    let mut failed = 0usize;
    while let Some((url, body)) = pages.next().await {
        let body = match body {
            Ok(body) => body,
            Err(e) => {
                failed += 1;
                tracing::warn!(url = %url, error = %e, "skipping product page");
                continue;
            }
        };

        let raw = {
            let doc = Html::parse_document(&body);
            extract_product(&doc, &url, config, session.custom_category())
        };
        if raw.name.is_none() {
            tracing::debug!(url = %url, "no title found on product page");
        }
        session.emit(&url, raw);
    }

    tracing::info!(
        domain = %domain,
        detail_urls = total,
        failed,
        rows = session.row_count(),
        "woocommerce crawl complete"
    );
    Ok(())
}
