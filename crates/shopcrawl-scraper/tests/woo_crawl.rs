//! Integration tests for `crawl_woocommerce`.
//!
//! A `wiremock` server plays the storefront: a sitemap index, product
//! sitemaps and product detail pages.

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopcrawl_core::{Platform, RateTable, SiteConfig};
use shopcrawl_scraper::{crawl_woocommerce, CrawlSession, SelectorConfig, StoreClient};

fn test_client() -> StoreClient {
    StoreClient::new(5, "shopcrawl-test/0.1", 0, 0).expect("failed to build test StoreClient")
}

fn sitemap_index(entries: &[String]) -> String {
    let body: String = entries
        .iter()
        .map(|loc| format!("<sitemap><loc>{loc}</loc></sitemap>"))
        .collect();
    format!(r#"<?xml version="1.0"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{body}</sitemapindex>"#)
}

fn urlset(entries: &[String]) -> String {
    let body: String = entries
        .iter()
        .map(|loc| format!("<url><loc>{loc}</loc></url>"))
        .collect();
    format!(r#"<?xml version="1.0"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{body}</urlset>"#)
}

fn product_page(title: &str, price: &str) -> String {
    format!(
        r#"<html><body>
        <nav class="woocommerce-breadcrumb"><a href="/">Home</a><a href="/c/bath/">Bath</a><span class="breadcrumb-last">{title}</span></nav>
        <h1 class="product_title entry-title">{title}</h1>
        <p class="price"><span class="woocommerce-Price-amount amount"><bdi>{price}</bdi></span></p>
        </body></html>"#
    )
}

async fn mount_xml(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/xml"))
        .mount(server)
        .await;
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

fn woo_site(server: &MockServer) -> SiteConfig {
    SiteConfig::new(
        format!("{}/sitemap_index.xml", server.uri()),
        Some("保健/美容/卫生/护理".to_owned()),
        Platform::Woocommerce,
    )
}

#[tokio::test]
async fn crawls_product_sitemaps_and_skips_others() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(
        &server,
        "/sitemap_index.xml",
        sitemap_index(&[
            format!("{base}/post-sitemap.xml"),
            format!("{base}/product-sitemap1.xml"),
            format!("{base}/product-sitemap2.xml"),
        ]),
    )
    .await;
    // The post sitemap must never be fetched.
    Mock::given(method("GET"))
        .and(path("/post-sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    // soap appears in both product sitemaps but is fetched once.
    mount_xml(
        &server,
        "/product-sitemap1.xml",
        urlset(&[format!("{base}/product/soap/"), format!("{base}/product/salt/")]),
    )
    .await;
    mount_xml(
        &server,
        "/product-sitemap2.xml",
        urlset(&[format!("{base}/product/soap/"), format!("{base}/product/gone/")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/product/soap/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(product_page("Lavender Soap", "$1,200.50"), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_html(&server, "/product/salt/", product_page("Bath Salt", "$8.00")).await;
    Mock::given(method("GET"))
        .and(path("/product/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let site = woo_site(&server);
    let mut session = CrawlSession::new(&site, Arc::new(RateTable::default()));
    crawl_woocommerce(
        &test_client(),
        &site,
        &SelectorConfig::default(),
        4,
        &mut session,
    )
    .await
    .expect("crawl should succeed");

    let mut rows = session.into_rows();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(rows.len(), 2, "the 404 page is dropped");

    assert_eq!(rows[0].name, "Bath Salt");
    assert_eq!(rows[0].regular_price.to_string(), "8.00");
    assert_eq!(rows[1].name, "Lavender Soap");
    assert_eq!(rows[1].regular_price.to_string(), "1200.50");
    assert!(rows.iter().all(|r| r.categories == "Bath"));
    assert!(rows.iter().all(|r| r.sku.starts_with("CARE-")));
    assert!(rows.iter().all(|r| r.custom_category == "保健/美容/卫生/护理"));
}

#[tokio::test]
async fn flat_urlset_root_is_read_directly() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_xml(
        &server,
        "/sitemap_index.xml",
        urlset(&[format!("{base}/product/towel/")]),
    )
    .await;
    mount_html(&server, "/product/towel/", product_page("Towel", "€12")).await;

    let site = woo_site(&server);
    let config = SelectorConfig::from_json(r#"{"currency": "EUR"}"#).unwrap();
    let mut session = CrawlSession::new(&site, Arc::new(RateTable::from_rates([("EUR", 2.0)])));
    crawl_woocommerce(&test_client(), &site, &config, 2, &mut session)
        .await
        .expect("crawl should succeed");

    assert_eq!(session.currency(), "EUR");
    assert_eq!(session.row_count(), 1);
    assert_eq!(session.rows()[0].regular_price.to_string(), "24.00");
}

#[tokio::test]
async fn root_sitemap_failure_is_an_error_with_no_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let site = woo_site(&server);
    let mut session = CrawlSession::new(&site, Arc::new(RateTable::default()));
    let result = crawl_woocommerce(
        &test_client(),
        &site,
        &SelectorConfig::default(),
        4,
        &mut session,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(session.row_count(), 0);
}

#[tokio::test]
async fn failed_nested_sitemap_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_xml(
        &server,
        "/sitemap_index.xml",
        sitemap_index(&[
            format!("{base}/product-sitemap1.xml"),
            format!("{base}/product-sitemap2.xml"),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/product-sitemap1.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_xml(
        &server,
        "/product-sitemap2.xml",
        urlset(&[format!("{base}/product/mat/")]),
    )
    .await;
    mount_html(&server, "/product/mat/", product_page("Bath Mat", "$30")).await;

    let site = woo_site(&server);
    let mut session = CrawlSession::new(&site, Arc::new(RateTable::default()));
    crawl_woocommerce(
        &test_client(),
        &site,
        &SelectorConfig::default(),
        4,
        &mut session,
    )
    .await
    .expect("crawl should succeed");

    assert_eq!(session.row_count(), 1);
    assert_eq!(session.rows()[0].name, "Bath Mat");
}
