//! Price parsing for both storefront platforms.
//!
//! Shopify prices arrive as JSON strings or numbers; WooCommerce prices are
//! scraped text such as `"$1,299.00"` or `"Rs. 2,599"`. Every function here
//! returns `None` rather than failing, and callers fall back to zero.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Numeric-substring pattern used when no site override is configured.
pub const DEFAULT_PRICE_PATTERN: &str = r"[\d.,]+";

static DEFAULT_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_PRICE_PATTERN).expect("valid regex"));

/// The compiled [`DEFAULT_PRICE_PATTERN`].
#[must_use]
pub fn default_price_regex() -> &'static Regex {
    &DEFAULT_PRICE_RE
}

/// Parses a decimal string, ignoring surrounding whitespace and `,`
/// thousands separators. Negative values are rejected.
#[must_use]
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;
    (!value.is_sign_negative()).then_some(value)
}

/// Parses a Shopify variant price, which may be a JSON string or number.
#[must_use]
pub fn parse_json_price(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::String(s) => parse_decimal(s),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .filter(|d| !d.is_sign_negative()),
        _ => None,
    }
}

/// Parses the first `pattern` match in scraped price text that is a valid
/// number, so a stray `"."` in `"Rs. 2,599"` does not hide the amount.
#[must_use]
pub fn parse_price_text(text: &str, pattern: &Regex) -> Option<Decimal> {
    pattern
        .find_iter(text)
        .find_map(|found| parse_decimal(found.as_str()))
}

/// Picks the price from an ordered list of scraped candidate texts.
///
/// Candidates are trimmed, empties and repeats dropped, and the first one
/// that parses to a strictly positive value wins.
#[must_use]
pub fn first_positive_price<'a, I>(candidates: I, pattern: &Regex) -> Option<Decimal>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tried: Vec<&str> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.trim();
        if candidate.is_empty() || tried.contains(&candidate) {
            continue;
        }
        tried.push(candidate);
        if let Some(price) = parse_price_text(candidate, pattern) {
            if price > Decimal::ZERO {
                return Some(price);
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
