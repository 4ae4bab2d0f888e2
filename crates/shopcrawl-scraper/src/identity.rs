//! Deterministic SKU synthesis.
//!
//! Every exported SKU is `PREFIX-HASH[-SUFFIX]`: the category prefix from
//! [`shopcrawl_core::prefix_for`], a truncated SHA-256 of the upstream
//! identity, and an optional variant descriptor or native-SKU hash. The
//! result only ever contains `[A-Za-z0-9_-]` and is at most
//! [`MAX_SKU_LEN`] characters.

use std::fmt::{Display, Write as _};

use sha2::{Digest, Sha256};
use shopcrawl_core::prefix_for;

/// Longest SKU the export accepts.
pub const MAX_SKU_LEN: usize = 50;

/// Returns an uppercase hex code of exactly `length` characters derived from
/// the SHA-256 digest of `value`'s string form.
///
/// Codes longer than the 64-character digest are zero-padded on the right.
/// An empty value yields `length` zeros.
#[must_use]
pub fn code_for(value: impl Display, length: usize) -> String {
    let text = value.to_string();
    if text.is_empty() {
        return "0".repeat(length);
    }

    let digest = Sha256::digest(text.as_bytes());
    let mut code = digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        let _ = write!(acc, "{b:02X}");
        acc
    });
    if code.len() >= length {
        code.truncate(length);
    } else {
        code.push_str(&"0".repeat(length - code.len()));
    }
    code
}

/// Normalizes a raw SKU: spaces become underscores, anything outside
/// `[A-Za-z0-9_-]` is dropped, the result is cut to [`MAX_SKU_LEN`] and
/// stripped of leading and trailing `_`/`-`.
#[must_use]
pub fn clean_sku(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(MAX_SKU_LEN)
        .collect();
    kept.trim_matches(|c| c == '_' || c == '-').to_owned()
}

/// SKU for one Shopify variant: `PREFIX-XXXXXX[-Descriptor]`.
#[must_use]
pub fn sku_for(category_label: &str, identity: impl Display, descriptor: Option<&str>) -> String {
    let mut raw = format!("{}-{}", prefix_for(category_label), code_for(identity, 6));
    if let Some(descriptor) = descriptor.map(str::trim).filter(|d| !d.is_empty()) {
        raw.push('-');
        raw.push_str(&descriptor.replace(' ', "_"));
    }
    clean_sku(&raw)
}

/// SKU for one WooCommerce detail page: `PREFIX-XXXXXXXX[-YYYY]`, hashing the
/// URL slug and, when the page shows one, the store's own SKU.
#[must_use]
pub fn sku_for_page(category_label: &str, slug: &str, native_sku: Option<&str>) -> String {
    let mut raw = format!("{}-{}", prefix_for(category_label), code_for(slug, 8));
    if let Some(native) = native_sku.map(str::trim).filter(|s| !s.is_empty()) {
        raw.push('-');
        raw.push_str(&code_for(native, 4));
    }
    clean_sku(&raw)
}
