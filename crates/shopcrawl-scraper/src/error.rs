use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("malformed sitemap {url}: {source}")]
    Sitemap {
        url: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("listing page {page} from {domain} unparsable after {attempts} attempts")]
    ListingUnparsable {
        domain: String,
        page: u32,
        attempts: u32,
    },

    #[error("invalid site URL \"{url}\": {reason}")]
    InvalidSiteUrl { url: String, reason: String },
}
