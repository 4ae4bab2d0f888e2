//! Flattening of Shopify products into per-variant [`RawProduct`]s.
//!
//! Price parsing is delegated to [`crate::parse`] and description cleanup to
//! [`crate::sanitize`]; this module owns naming, descriptor and image rules.

use crate::identity::{clean_sku, sku_for};
use crate::parse::parse_json_price;
use crate::sanitize::{strip_markup, StripLevel};
use crate::session::RawProduct;
use crate::types::{ShopifyProduct, ShopifyVariant};

/// Option value Shopify reports for single-variant products.
const DEFAULT_TITLE: &str = "Default Title";

/// One exportable unit: the dedup identity and its raw fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub identity: String,
    pub raw: RawProduct,
}

/// Flattens `product` into one record per variant, in listing order.
#[must_use]
pub fn flatten_product(product: &ShopifyProduct, custom_category: &str) -> Vec<VariantRecord> {
    let description = product
        .body_html
        .as_deref()
        .map(|html| strip_markup(html, StripLevel::Links));
    let category = product
        .product_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(title_case);

    product
        .variants
        .iter()
        .map(|variant| {
            let descriptor = variant_descriptor(variant);
            let price = parse_json_price(&variant.price);
            if price.is_none() {
                tracing::warn!(
                    product_id = product.id,
                    variant_id = variant.id,
                    price = %variant.price,
                    "unparsable variant price, exporting 0.00"
                );
            }

            VariantRecord {
                identity: variant.id.to_string(),
                raw: RawProduct {
                    sku: Some(sku_for(custom_category, variant.id, descriptor.as_deref())),
                    name: Some(variant_name(&product.title, descriptor.as_deref())),
                    description: description.clone(),
                    price,
                    category: category.clone(),
                    image: variant_image(product, variant),
                },
            }
        })
        .collect()
}

/// Joins the variant's real option values with spaces, dropping empty
/// values and the `"None"`/`"Default Title"` placeholders. `None` when
/// nothing is left.
#[must_use]
pub fn variant_descriptor(variant: &ShopifyVariant) -> Option<String> {
    let parts: Vec<&str> = variant
        .options()
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "None" && *o != DEFAULT_TITLE)
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Product title plus the descriptor normalized by [`clean_sku`]
/// (`"Red / Large"` → `"Red__Large"`), title-cased, never carrying the
/// `"Default Title"` placeholder or stray whitespace.
#[must_use]
pub fn variant_name(title: &str, descriptor: Option<&str>) -> String {
    let full = match descriptor.map(clean_sku) {
        Some(d) => format!("{title} {d}"),
        None => title.to_owned(),
    };
    let cleaned = full.replace(DEFAULT_TITLE, " ");
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    title_case(&words.join(" "))
}

/// Picks the variant image: its `featured_image`, else a gallery image
/// listing the variant, else the gallery image matching `image_id`, else
/// the first gallery image.
#[must_use]
pub fn variant_image(product: &ShopifyProduct, variant: &ShopifyVariant) -> Option<String> {
    let non_empty = |src: &str| (!src.trim().is_empty()).then(|| src.trim().to_owned());

    variant
        .featured_image
        .as_ref()
        .and_then(|img| non_empty(&img.src))
        .or_else(|| {
            product
                .images
                .iter()
                .find(|img| img.variant_ids.contains(&variant.id))
                .and_then(|img| non_empty(&img.src))
        })
        .or_else(|| {
            let image_id = variant.image_id?;
            product
                .images
                .iter()
                .find(|img| img.id == Some(image_id))
                .and_then(|img| non_empty(&img.src))
        })
        .or_else(|| product.images.first().and_then(|img| non_empty(&img.src)))
}

/// Capitalizes the first letter of every run of letters and lowercases the
/// rest: `"VITAMIN c-serum 30ml"` → `"Vitamin C-Serum 30Ml"`.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
