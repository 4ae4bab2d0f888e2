//! Per-site crawl orchestration shared by every subcommand.
//!
//! Each site gets its own [`CrawlSession`]; only the HTTP client and the
//! rate table are shared. A site that fails still exports the rows it
//! collected before the failure, and one site's failure never stops the
//! others.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use shopcrawl_core::{AppConfig, Platform, RateTable, SiteConfig};
use shopcrawl_export::{export_site, ExportOptions};
use shopcrawl_scraper::{
    crawl_shopify, crawl_woocommerce, CrawlSession, ScraperError, SelectorConfig, StoreClient,
};

/// Result of crawling and exporting one site.
#[derive(Debug)]
pub(crate) struct SiteReport {
    pub domain: String,
    pub rows_exported: usize,
    /// False when the crawl hit a fatal error or the export could not be
    /// written, even if some rows were exported.
    pub succeeded: bool,
}

/// Aggregated totals returned by [`Crawler::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunTotals {
    pub sites: usize,
    pub failed_sites: usize,
    pub rows_exported: usize,
}

pub(crate) struct Crawler {
    client: StoreClient,
    rates: Arc<RateTable>,
    export: ExportOptions,
    detail_concurrency: usize,
    max_concurrent_sites: usize,
}

impl Crawler {
    /// Builds the shared HTTP client and loads the rate table.
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = StoreClient::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?
        .with_request_delay(config.scraper_inter_request_delay_ms);

        let rates = RateTable::load(&config.rates_path);
        tracing::debug!(
            path = %config.rates_path.display(),
            currencies = rates.len(),
            "loaded exchange rates"
        );

        Ok(Self {
            client,
            rates: Arc::new(rates),
            export: ExportOptions {
                output_dir: config.output_dir.clone(),
                group_by_category: config.group_by_category,
            },
            detail_concurrency: config.scraper_detail_concurrency,
            max_concurrent_sites: config.scraper_max_concurrent_sites,
        })
    }

    /// Crawls `sites`, at most `max_concurrent_sites` at a time.
    ///
    /// # Errors
    ///
    /// Returns an error when `sites` is empty or when every site failed.
    pub(crate) async fn run(&self, sites: &[SiteConfig]) -> anyhow::Result<RunTotals> {
        if sites.is_empty() {
            anyhow::bail!("no sites to crawl");
        }

        let reports: Vec<SiteReport> = stream::iter(sites)
            .map(|site| self.crawl_site(site))
            .buffer_unordered(self.max_concurrent_sites.max(1))
            .collect()
            .await;

        let totals = RunTotals {
            sites: reports.len(),
            failed_sites: reports.iter().filter(|r| !r.succeeded).count(),
            rows_exported: reports.iter().map(|r| r.rows_exported).sum(),
        };

        if totals.failed_sites > 0 {
            let failed: Vec<&str> = reports
                .iter()
                .filter(|r| !r.succeeded)
                .map(|r| r.domain.as_str())
                .collect();
            tracing::warn!(
                failed_sites = totals.failed_sites,
                total_sites = totals.sites,
                failed = ?failed,
                "some sites failed during crawl"
            );
        }

        if totals.failed_sites == totals.sites {
            anyhow::bail!("all {} sites failed", totals.failed_sites);
        }

        Ok(totals)
    }

    /// Crawls one site into a fresh session and exports whatever rows it
    /// produced.
    pub(crate) async fn crawl_site(&self, site: &SiteConfig) -> SiteReport {
        let mut session = CrawlSession::new(site, Arc::clone(&self.rates));
        let domain = session.origin_domain().to_owned();

        let crawled = self.dispatch(site, &mut session).await;
        let succeeded = match crawled {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    site = %site.domain,
                    rows = session.row_count(),
                    error = %e,
                    "site crawl failed; exporting partial rows"
                );
                false
            }
        };

        let rows = session.into_rows();
        match export_site(&self.export, site, &rows) {
            Ok(Some(summary)) => {
                if !succeeded {
                    tracing::warn!(
                        site = %site.domain,
                        path = %summary.path.display(),
                        rows = summary.rows_written,
                        "export is partial"
                    );
                }
                SiteReport {
                    domain,
                    rows_exported: summary.rows_written,
                    succeeded,
                }
            }
            Ok(None) => SiteReport {
                domain,
                rows_exported: 0,
                succeeded,
            },
            Err(e) => {
                tracing::error!(site = %site.domain, error = %e, "export failed");
                SiteReport {
                    domain,
                    rows_exported: 0,
                    succeeded: false,
                }
            }
        }
    }

    async fn dispatch(
        &self,
        site: &SiteConfig,
        session: &mut CrawlSession,
    ) -> Result<(), ScraperError> {
        match site.platform {
            Platform::Shopify => crawl_shopify(&self.client, site, session).await,
            Platform::Woocommerce => {
                let selectors = site
                    .selectors
                    .as_deref()
                    .map_or_else(SelectorConfig::default, SelectorConfig::load);
                crawl_woocommerce(
                    &self.client,
                    site,
                    &selectors,
                    self.detail_concurrency,
                    session,
                )
                .await
            }
        }
    }
}

#[cfg(test)]
#[path = "crawl_test.rs"]
mod tests;
