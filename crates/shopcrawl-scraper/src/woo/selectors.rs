//! Extraction expressions for WooCommerce product pages.
//!
//! Each field holds an ordered list of expressions. An expression is a CSS
//! selector, optionally suffixed with `@attr` to read an attribute instead
//! of the element text: `meta[itemprop='price']@content`.
//!
//! A site can override any field from a JSON file whose keys are the field
//! names and whose values are a string or an array of strings. Fields the
//! file does not mention keep their defaults.

use std::fmt;
use std::path::Path;

use regex::Regex;
use scraper::Selector;
use serde::Deserialize;

use crate::parse::{default_price_regex, DEFAULT_PRICE_PATTERN};

/// One compiled extraction expression.
#[derive(Clone)]
pub struct Expression {
    source: String,
    selector: Selector,
    attr: Option<String>,
}

impl Expression {
    /// Compiles `expr`, or returns `None` if the selector part is invalid.
    #[must_use]
    pub fn parse(expr: &str) -> Option<Self> {
        let expr = expr.trim();
        let (css, attr) = split_attr(expr);
        let selector = Selector::parse(css).ok()?;
        Some(Self {
            source: expr.to_owned(),
            selector,
            attr: attr.map(str::to_owned),
        })
    }

    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Attribute to read; `None` means element text.
    #[must_use]
    pub fn attr(&self) -> Option<&str> {
        self.attr.as_deref()
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expression").field(&self.source).finish()
    }
}

/// Splits a trailing `@attr` off an expression when the suffix is a plain
/// attribute name.
fn split_attr(expr: &str) -> (&str, Option<&str>) {
    if let Some((css, attr)) = expr.rsplit_once('@') {
        let is_attr_name = !attr.is_empty()
            && attr
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'));
        if is_attr_name && !css.trim().is_empty() {
            return (css.trim(), Some(attr));
        }
    }
    (expr, None)
}

const DEFAULT_TITLE: &[&str] = &[
    "h1.product_title.entry-title",
    "h1[class*='product-title']",
    "h1[class*='product_title']",
    "header h1",
    "div[class*='summary'] h1",
];

const DEFAULT_SKU: &[&str] = &[
    "span.sku",
    ".product-meta span.sku",
    "meta[itemprop='sku']@content",
    "dd[class*='variation-SKU']",
];

// Sale price first: a discounted product renders the struck-through
// regular price inside <del> before the current one inside <ins>.
const DEFAULT_PRICE: &[&str] = &[
    "p.price ins .woocommerce-Price-amount bdi",
    "p.price .woocommerce-Price-amount bdi",
    "p.price span.woocommerce-Price-amount.amount",
    "span.woocommerce-Price-amount.amount bdi",
    "div[class*='summary'] p.price bdi",
    "meta[itemprop='price']@content",
];

const DEFAULT_DESCRIPTION: &[&str] = &[
    "div.woocommerce-product-details__short-description",
    ".woocommerce-tabs #tab-description",
    "div[class*='product-short-description']",
    "div[itemprop='description']",
];

const DEFAULT_IMAGES: &[&str] = &[
    "div.woocommerce-product-gallery__image a@href",
    "div.woocommerce-product-gallery__image img@src",
    "figure[class*='woocommerce-product-gallery__wrapper'] img@data-large_image",
    "meta[property='og:image']@content",
    "div[class*='product-images'] img@src",
];

const DEFAULT_BREADCRUMB_LINKS: &[&str] = &[
    "nav[class*='woocommerce-breadcrumb'] a",
    "div[class*='breadcrumbs'] a",
    "ul[class*='breadcrumb'] a",
    "div[class*='breadcrumb'] a",
    "div[class*='woo-breadcrumbs'] a",
    "nav.breadcrumbs a",
    "div.product_meta a[href*='/product-category/']",
];

// Without a `breadcrumb-last` span the trailing link stands in for the
// product, so a trail ending in a category link loses that level.
const DEFAULT_BREADCRUMB_LAST: &[&str] = &[
    "nav[class*='woocommerce-breadcrumb'] span[class*='breadcrumb-last']",
    "nav[class*='woocommerce-breadcrumb'] a:last-child",
];

/// Recognized override keys.
const KNOWN_KEYS: &[&str] = &[
    "title",
    "sku",
    "price",
    "description",
    "images",
    "breadcrumb_links",
    "breadcrumb_last",
    "currency",
    "price_regex",
    "site_map",
];

/// A JSON override value: one string or a list of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

/// Immutable per-site extraction configuration.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    pub title: Vec<Expression>,
    pub sku: Vec<Expression>,
    pub price: Vec<Expression>,
    pub description: Vec<Expression>,
    pub images: Vec<Expression>,
    pub breadcrumb_links: Vec<Expression>,
    pub breadcrumb_last: Vec<Expression>,
    /// Currency every price on the site is quoted in.
    pub currency: String,
    /// Numeric-substring pattern applied to price texts.
    pub price_regex: Regex,
    /// Substrings preferred when choosing nested sitemaps.
    pub site_map: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: compile_defaults(DEFAULT_TITLE),
            sku: compile_defaults(DEFAULT_SKU),
            price: compile_defaults(DEFAULT_PRICE),
            description: compile_defaults(DEFAULT_DESCRIPTION),
            images: compile_defaults(DEFAULT_IMAGES),
            breadcrumb_links: compile_defaults(DEFAULT_BREADCRUMB_LINKS),
            breadcrumb_last: compile_defaults(DEFAULT_BREADCRUMB_LAST),
            currency: "USD".to_owned(),
            price_regex: default_price_regex().clone(),
            site_map: vec!["product".to_owned()],
        }
    }
}

fn compile_defaults(exprs: &[&str]) -> Vec<Expression> {
    exprs.iter().filter_map(|e| Expression::parse(e)).collect()
}

impl SelectorConfig {
    /// Loads the defaults overridden by the JSON file at `path`.
    ///
    /// Never fails: an unreadable or malformed file is logged and the
    /// defaults are returned.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "cannot read selector overrides, using defaults"
                );
                return Self::default();
            }
        };
        Self::from_json(&content).unwrap_or_else(|e| {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "selector overrides are not a JSON object, using defaults"
            );
            Self::default()
        })
    }

    /// Applies the overrides in `content` on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if `content` is not a JSON object.
    /// Individual bad keys or values are logged and skipped.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let overrides: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;
        let mut config = Self::default();

        for (key, value) in overrides {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                tracing::warn!(key = %key, "ignoring unknown selector key");
                continue;
            }
            let values = match serde_json::from_value::<OneOrMany>(value) {
                Ok(v) => v.into_vec(),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "selector value must be a string or list of strings");
                    continue;
                }
            };
            config.apply(&key, values);
        }

        Ok(config)
    }

    fn apply(&mut self, key: &str, values: Vec<String>) {
        match key {
            "currency" => match values.first().map(|c| c.trim()) {
                Some(code) if !code.is_empty() => self.currency = code.to_ascii_uppercase(),
                _ => tracing::warn!(key, "empty currency override ignored"),
            },
            "price_regex" => match values.first().map(|p| Regex::new(p)) {
                Some(Ok(re)) => self.price_regex = re,
                Some(Err(e)) => {
                    tracing::warn!(key, error = %e, default = DEFAULT_PRICE_PATTERN, "invalid price regex ignored");
                }
                None => tracing::warn!(key, "empty price regex override ignored"),
            },
            "site_map" => self.site_map = values,
            _ => {
                let compiled = compile_overrides(key, &values);
                if compiled.is_empty() {
                    tracing::warn!(key, "no usable expressions in override, keeping defaults");
                    return;
                }
                if let Some(slot) = self.expressions_mut(key) {
                    *slot = compiled;
                }
            }
        }
    }

    fn expressions_mut(&mut self, key: &str) -> Option<&mut Vec<Expression>> {
        match key {
            "title" => Some(&mut self.title),
            "sku" => Some(&mut self.sku),
            "price" => Some(&mut self.price),
            "description" => Some(&mut self.description),
            "images" => Some(&mut self.images),
            "breadcrumb_links" => Some(&mut self.breadcrumb_links),
            "breadcrumb_last" => Some(&mut self.breadcrumb_last),
            _ => None,
        }
    }
}

fn compile_overrides(key: &str, values: &[String]) -> Vec<Expression> {
    values
        .iter()
        .filter_map(|raw| {
            let compiled = Expression::parse(raw);
            if compiled.is_none() {
                tracing::warn!(key, expression = %raw, "dropping unparsable expression");
            }
            compiled
        })
        .collect()
}
