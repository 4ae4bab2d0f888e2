//! Per-site crawl state and the row emission gate.
//!
//! A [`CrawlSession`] lives exactly as long as one site's crawl. It carries
//! the shop currency, the shared rate table, the operator's category label
//! and the identities already emitted, and collects the rows produced so
//! far. Rows survive a fatal crawl error so the caller can still flush them.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use shopcrawl_core::{ProductRow, RateTable, SiteConfig, DEFAULT_CATEGORY};

use crate::identity::sku_for;

/// Raw per-product fields as an extractor found them.
///
/// Every field is optional; [`CrawlSession::emit`] resolves absent ones to
/// their documented default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProduct {
    /// Synthesized SKU; defaults to a hash of the identity.
    pub sku: Option<String>,
    pub name: Option<String>,
    /// Already sanitized description HTML.
    pub description: Option<String>,
    /// Price in the shop currency, before conversion.
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug)]
pub struct CrawlSession {
    currency: String,
    rates: Arc<RateTable>,
    custom_category: String,
    origin_domain: String,
    seen_identities: HashSet<String>,
    seen_urls: HashSet<String>,
    rows: Vec<ProductRow>,
}

impl CrawlSession {
    /// Starts a session for `site`. The currency defaults to USD until the
    /// extractor learns the shop's own.
    #[must_use]
    pub fn new(site: &SiteConfig, rates: Arc<RateTable>) -> Self {
        Self {
            currency: "USD".to_owned(),
            rates,
            custom_category: site.custom_category(),
            origin_domain: site.host(),
            seen_identities: HashSet::new(),
            seen_urls: HashSet::new(),
            rows: Vec::new(),
        }
    }

    pub fn set_currency(&mut self, code: &str) {
        let code = code.trim();
        if !code.is_empty() {
            self.currency = code.to_ascii_uppercase();
        }
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    #[must_use]
    pub fn custom_category(&self) -> &str {
        &self.custom_category
    }

    #[must_use]
    pub fn origin_domain(&self) -> &str {
        &self.origin_domain
    }

    /// Records a discovered detail URL. Returns `false` if it was already
    /// queued by an earlier sitemap fragment.
    pub fn mark_url(&mut self, url: &str) -> bool {
        self.seen_urls.insert(url.to_owned())
    }

    /// Emits the row for `identity`, or `None` if that identity was already
    /// emitted in this session.
    pub fn emit(&mut self, identity: &str, raw: RawProduct) -> Option<&ProductRow> {
        if !self.seen_identities.insert(identity.to_owned()) {
            return None;
        }

        let row = self.build_row(identity, raw);
        self.rows.push(row);
        self.rows.last()
    }

    fn build_row(&self, identity: &str, raw: RawProduct) -> ProductRow {
        let price = raw.price.unwrap_or(Decimal::ZERO);
        ProductRow {
            sku: raw
                .sku
                .unwrap_or_else(|| sku_for(&self.custom_category, identity, None)),
            name: raw.name.map(|n| n.trim().to_owned()).unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            regular_price: self.rates.convert(price, &self.currency),
            categories: raw
                .category
                .map(|c| c.trim().to_owned())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
            images: raw.image.unwrap_or_default(),
            cf_opingts: String::new(),
            custom_category: self.custom_category.clone(),
            origin_domain: self.origin_domain.clone(),
            distribution_flag: 0,
            language: "en".to_owned(),
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn rows(&self) -> &[ProductRow] {
        &self.rows
    }

    /// Consumes the session, returning the rows emitted so far.
    #[must_use]
    pub fn into_rows(self) -> Vec<ProductRow> {
        self.rows
    }
}
