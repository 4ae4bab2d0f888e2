//! Shopify storefront crawl: `meta.json` for the currency, then
//! `products.json` page by page until a short page.

use shopcrawl_core::SiteConfig;

use crate::client::{site_origin, StoreClient, SHOPIFY_PAGE_LIMIT};
use crate::error::ScraperError;
use crate::normalize::flatten_product;
use crate::pagination::{has_next_page, MAX_LISTING_PAGES, MAX_PAGE_PARSE_ATTEMPTS};
use crate::session::CrawlSession;
use crate::types::{ShopifyMeta, ShopifyProduct, ShopifyProductsPage};

/// Crawls one Shopify site, emitting a row per variant into `session`.
///
/// Rows emitted before an error stay in the session.
///
/// # Errors
///
/// - [`ScraperError::InvalidSiteUrl`] if the site domain is not a URL.
/// - Any fetch error for a listing page that survived the client's retries.
/// - [`ScraperError::ListingUnparsable`] when one page returned an
///   unparsable body [`MAX_PAGE_PARSE_ATTEMPTS`] times in a row.
pub async fn crawl_shopify(
    client: &StoreClient,
    site: &SiteConfig,
    session: &mut CrawlSession,
) -> Result<(), ScraperError> {
    let origin = site_origin(&site.domain)?;
    let domain = session.origin_domain().to_owned();

    let currency = fetch_shop_currency(client, &origin).await;
    session.set_currency(&currency);
    tracing::info!(domain = %domain, currency = %session.currency(), "starting shopify crawl");

    let mut page = 1u32;
    loop {
        let listing = fetch_listing_page(client, &origin, &domain, page).await?;
        let product_count = listing.products.len();

        for value in listing.products {
            let product = match serde_json::from_value::<ShopifyProduct>(value) {
                Ok(product) => product,
                Err(e) => {
                    tracing::warn!(domain = %domain, page, error = %e, "skipping malformed product");
                    continue;
                }
            };
            for record in flatten_product(&product, session.custom_category()) {
                session.emit(&record.identity, record.raw);
            }
        }

        tracing::info!(
            domain = %domain,
            page,
            product_count,
            rows = session.row_count(),
            "processed listing page"
        );

        if !has_next_page(product_count, SHOPIFY_PAGE_LIMIT) {
            break;
        }
        if page >= MAX_LISTING_PAGES {
            tracing::warn!(
                domain = %domain,
                max_pages = MAX_LISTING_PAGES,
                "listing page cap reached, stopping crawl"
            );
            break;
        }
        page += 1;
    }

    tracing::info!(domain = %domain, rows = session.row_count(), "shopify crawl complete");
    Ok(())
}

/// Reads the shop currency from `meta.json`. Any failure falls back to USD.
async fn fetch_shop_currency(client: &StoreClient, origin: &str) -> String {
    let url = StoreClient::meta_url(origin);
    let body = match client.get_text(&url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "shop meta unavailable, assuming USD");
            return "USD".to_owned();
        }
    };

    match serde_json::from_str::<ShopifyMeta>(&body) {
        Ok(ShopifyMeta {
            currency: Some(code),
        }) if !code.trim().is_empty() => code.trim().to_ascii_uppercase(),
        Ok(_) => {
            tracing::warn!(url = %url, "shop meta has no currency, assuming USD");
            "USD".to_owned()
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "shop meta is not valid JSON, assuming USD");
            "USD".to_owned()
        }
    }
}

/// Fetches and decodes one listing page, re-requesting it while the body
/// fails to parse.
async fn fetch_listing_page(
    client: &StoreClient,
    origin: &str,
    domain: &str,
    page: u32,
) -> Result<ShopifyProductsPage, ScraperError> {
    let url = StoreClient::products_url(origin, SHOPIFY_PAGE_LIMIT, page)?;
    let mut attempts = 0u32;

    loop {
        let body = client.get_text(&url).await?;
        match serde_json::from_str::<ShopifyProductsPage>(&body) {
            Ok(listing) => return Ok(listing),
            Err(e) => {
                attempts += 1;
                tracing::warn!(
                    url = %url,
                    attempts,
                    max_attempts = MAX_PAGE_PARSE_ATTEMPTS,
                    error = %e,
                    "unparsable listing page"
                );
                if attempts >= MAX_PAGE_PARSE_ATTEMPTS {
                    return Err(ScraperError::ListingUnparsable {
                        domain: domain.to_owned(),
                        page,
                        attempts,
                    });
                }
            }
        }
    }
}
