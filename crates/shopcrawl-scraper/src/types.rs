//! Shopify storefront response types for `meta.json` and `products.json`.
//!
//! ## Observed shape
//!
//! ### Listing pages
//! A page is `{"products": [...]}`. Products are decoded one at a time from
//! raw JSON values so a single odd product cannot sink the whole page.
//!
//! ### `price`
//! Usually a decimal string (`"30.00"`), but some storefront apps rewrite
//! it as a bare number. [`ShopifyVariant::price`] keeps the raw JSON value
//! and parsing is done in [`crate::parse`].
//!
//! ### Options
//! `option1`..`option3` are `null` when unused. Single-variant products
//! report `option1 = "Default Title"`; a few themes emit the literal string
//! `"None"`. Both are placeholders, not descriptors.
//!
//! ### Images
//! A variant may carry a `featured_image` object, or only an `image_id`
//! referencing an entry of the product gallery; gallery images in turn list
//! the `variant_ids` they illustrate.

use serde::Deserialize;

/// Body of `GET /meta.json`. Only the currency is used.
#[derive(Debug, Deserialize)]
pub struct ShopifyMeta {
    #[serde(default)]
    pub currency: Option<String>,
}

/// Top-level response from `GET /products.json`, products still undecoded.
#[derive(Debug, Deserialize)]
pub struct ShopifyProductsPage {
    pub products: Vec<serde_json::Value>,
}

/// A single product from the Shopify storefront.
#[derive(Debug, Deserialize)]
pub struct ShopifyProduct {
    /// Shopify numeric product ID (e.g., `6789012345678`).
    pub id: i64,

    /// Display name of the product.
    #[serde(default)]
    pub title: String,

    /// Raw HTML product description. May be `null` or absent.
    #[serde(default)]
    pub body_html: Option<String>,

    /// Product category string; frequently empty.
    #[serde(default)]
    pub product_type: Option<String>,

    /// Full image gallery for the product.
    #[serde(default)]
    pub images: Vec<ShopifyImage>,

    /// All purchasable variants for this product.
    #[serde(default)]
    pub variants: Vec<ShopifyVariant>,
}

/// A single purchasable variant of a [`ShopifyProduct`].
#[derive(Debug, Deserialize)]
pub struct ShopifyVariant {
    /// Shopify numeric variant ID; the dedup identity of the exported row.
    pub id: i64,

    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub option2: Option<String>,
    #[serde(default)]
    pub option3: Option<String>,

    /// Current price, string or number. `Null` when absent.
    #[serde(default)]
    pub price: serde_json::Value,

    /// Image picked for this variant by the merchant.
    #[serde(default)]
    pub featured_image: Option<ShopifyImage>,

    /// Gallery image ID assigned to the variant.
    #[serde(default)]
    pub image_id: Option<i64>,
}

impl ShopifyVariant {
    /// Option values that are present, in order.
    pub fn options(&self) -> impl Iterator<Item = &str> {
        [&self.option1, &self.option2, &self.option3]
            .into_iter()
            .filter_map(|o| o.as_deref())
    }
}

/// A product image from Shopify `products.json`.
#[derive(Debug, Deserialize)]
pub struct ShopifyImage {
    /// Shopify numeric image ID.
    #[serde(default)]
    pub id: Option<i64>,
    /// Canonical CDN URL.
    #[serde(default)]
    pub src: String,
    /// Variant IDs associated with this image.
    #[serde(default)]
    pub variant_ids: Vec<i64>,
}
