//! Page-number pagination over Shopify's `products.json`.
//!
//! The storefront has no "last page" marker: a page shorter than the
//! requested `limit` (including an empty one) is the last. Stores that
//! ignore the `page` parameter would repeat page 1 forever, so the walk is
//! capped at [`MAX_LISTING_PAGES`].

/// Hard cap on listing pages per site.
pub const MAX_LISTING_PAGES: u32 = 400;

/// Consecutive unparsable responses tolerated for one page.
pub const MAX_PAGE_PARSE_ATTEMPTS: u32 = 3;

/// Returns `true` when a page holding `product_count` products means the
/// next page must be fetched.
#[must_use]
pub fn has_next_page(product_count: usize, limit: u32) -> bool {
    product_count > 0 && u32::try_from(product_count).is_ok_and(|n| n >= limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_page_continues() {
        assert!(has_next_page(250, 250));
    }

    #[test]
    fn short_or_empty_page_terminates() {
        for count in 0..250 {
            assert!(!has_next_page(count, 250), "count {count}");
        }
    }

    #[test]
    fn oversized_page_continues() {
        // Some storefront apps ignore `limit` and return more.
        assert!(has_next_page(300, 250));
    }

    #[test]
    fn zero_limit_never_loops_on_empty_pages() {
        assert!(!has_next_page(0, 0));
    }
}
