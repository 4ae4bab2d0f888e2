use std::path::PathBuf;

/// Runtime settings, read from `SHOPCRAWL_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub sites_path: PathBuf,
    /// JSON map of currency code to USD multiplier. Missing file is allowed.
    pub rates_path: PathBuf,
    pub output_dir: PathBuf,
    /// Write each export into a sub-directory named after the site's custom category.
    pub group_by_category: bool,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_concurrent_sites: usize,
    /// In-flight WooCommerce detail-page requests per site.
    pub scraper_detail_concurrency: usize,
    pub scraper_inter_request_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
}
