//! Field extraction from a WooCommerce product page.
//!
//! Every extractor is independent and best-effort: a missing field becomes
//! `None` and the session applies its default.

use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use super::selectors::{Expression, SelectorConfig};
use crate::identity::sku_for_page;
use crate::parse::{first_positive_price, parse_decimal};
use crate::sanitize::{strip_markup, StripLevel};
use crate::session::RawProduct;

/// Separator between the two category levels kept from a breadcrumb trail.
pub const CATEGORY_SEPARATOR: &str = "|||";

static META_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[itemprop='price']").expect("valid selector"));

/// Extracts the raw product fields from a parsed detail page.
#[must_use]
pub fn extract_product(
    doc: &Html,
    url: &str,
    config: &SelectorConfig,
    custom_category: &str,
) -> RawProduct {
    let native_sku = first_value(doc, &config.sku);
    let description = union_values(doc, &config.description, true);
    let crumbs = union_values(doc, &config.breadcrumb_links, false);
    let last_crumb = first_value(doc, &config.breadcrumb_last);

    RawProduct {
        sku: Some(sku_for_page(
            custom_category,
            &page_slug(url),
            native_sku.as_deref(),
        )),
        name: first_value(doc, &config.title),
        description: (!description.is_empty())
            .then(|| strip_markup(&description.join("\n"), StripLevel::LinksAndMedia)),
        price: extract_price(doc, config),
        category: breadcrumb_category(&crumbs, last_crumb.as_deref()),
        image: first_value(doc, &config.images),
    }
}

/// Price candidates in expression order, then document order; the first
/// strictly positive one wins, with `meta[itemprop=price]` as a last resort.
fn extract_price(doc: &Html, config: &SelectorConfig) -> Option<rust_decimal::Decimal> {
    let candidates: Vec<String> = config
        .price
        .iter()
        .flat_map(|expr| doc.select(expr.selector()).map(move |el| read(el, expr, false)))
        .collect();

    first_positive_price(candidates.iter().map(String::as_str), &config.price_regex).or_else(
        || {
            doc.select(&META_PRICE)
                .filter_map(|el| el.value().attr("content"))
                .find_map(parse_decimal)
        },
    )
}

/// First non-empty value, trying expressions in priority order.
fn first_value(doc: &Html, exprs: &[Expression]) -> Option<String> {
    exprs.iter().find_map(|expr| {
        doc.select(expr.selector())
            .map(|el| read(el, expr, false))
            .find(|v| !v.is_empty())
    })
}

/// All non-empty values of elements matching any expression, in document
/// order. Elements nested inside an already matched element are skipped so
/// their content is read once.
fn union_values(doc: &Html, exprs: &[Expression], as_html: bool) -> Vec<String> {
    let mut matched: Vec<ElementRef<'_>> = Vec::new();
    let mut values = Vec::new();
    for el in doc.root_element().descendants().filter_map(ElementRef::wrap) {
        if el
            .ancestors()
            .any(|a| matched.iter().any(|m| m.id() == a.id()))
        {
            continue;
        }
        let Some(expr) = exprs.iter().find(|expr| expr.selector().matches(&el)) else {
            continue;
        };
        matched.push(el);
        let value = read(el, expr, as_html);
        if !value.is_empty() {
            values.push(value);
        }
    }
    values
}

/// Reads an element's attribute, inner HTML or whitespace-collapsed text.
fn read(el: ElementRef<'_>, expr: &Expression, as_html: bool) -> String {
    match expr.attr() {
        Some(attr) => el.value().attr(attr).unwrap_or_default().trim().to_owned(),
        None if as_html => el.inner_html().trim().to_owned(),
        None => el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" "),
    }
}

/// Derives the category from breadcrumb items.
///
/// Items are trimmed and empties dropped, the trailing item is dropped when
/// it repeats the last crumb (the product itself), and "Home" is dropped.
/// Two or more remaining levels keep the first two joined by
/// [`CATEGORY_SEPARATOR`].
#[must_use]
pub fn breadcrumb_category(items: &[String], last_crumb: Option<&str>) -> Option<String> {
    let mut levels: Vec<&str> = items
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect();

    if let Some(last) = last_crumb.map(str::trim).filter(|l| !l.is_empty()) {
        if levels.last() == Some(&last) {
            levels.pop();
        }
    }
    levels.retain(|l| !l.eq_ignore_ascii_case("home"));

    match levels.as_slice() {
        [] => None,
        [only] => Some((*only).to_owned()),
        [first, second, ..] => Some(format!("{first}{CATEGORY_SEPARATOR}{second}")),
    }
}

/// Last path segment of a product URL, without query or fragment. The
/// whole URL is used when that segment is empty, which is the case for
/// permalinks ending in a slash.
#[must_use]
pub fn page_slug(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| url.to_owned())
}

#[cfg(test)]
#[path = "detail_test.rs"]
mod tests;
