pub mod client;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod pagination;
pub mod parse;
mod rate_limit;
pub mod sanitize;
pub mod session;
pub mod shopify;
pub mod types;
pub mod woo;

pub use client::{site_origin, StoreClient};
pub use error::ScraperError;
pub use identity::{clean_sku, code_for, sku_for, sku_for_page};
pub use sanitize::{strip_markup, StripLevel};
pub use session::{CrawlSession, RawProduct};
pub use shopify::crawl_shopify;
pub use woo::{crawl_woocommerce, SelectorConfig};
