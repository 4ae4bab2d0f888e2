use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shopcrawl_core::{load_app_config, load_sites, validate_site, Platform, SiteConfig};
use tracing_subscriber::EnvFilter;

mod crawl;

#[derive(Debug, Parser)]
#[command(name = "shopcrawl")]
#[command(about = "Export Shopify and WooCommerce product catalogs to CSV")]
struct Cli {
    /// Directory the CSV exports are written to.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Currency rate file (JSON object of code to USD multiplier).
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl one Shopify storefront.
    Shopify {
        /// Storefront root URL, e.g. `https://www.shop.com`.
        #[arg(long)]
        domain: String,
        /// Custom category label for every exported row.
        #[arg(long)]
        category: Option<String>,
    },
    /// Crawl one WooCommerce store from its root sitemap.
    Woo {
        /// Root sitemap URL, e.g. `https://shop.com/sitemap_index.xml`.
        #[arg(long)]
        sitemap: String,
        #[arg(long)]
        category: Option<String>,
        /// JSON file overriding the default field selectors.
        #[arg(long)]
        selectors: Option<PathBuf>,
    },
    /// Crawl every site listed in a YAML sites file.
    Batch {
        #[arg(long)]
        sites: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_app_config().context("failed to load configuration")?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(rates) = cli.rates {
        config.rates_path = rates;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let sites = sites_for(cli.command, &config.sites_path)?;
    tracing::info!(
        sites = sites.len(),
        output_dir = %config.output_dir.display(),
        "starting crawl"
    );

    let crawler = crawl::Crawler::from_config(&config)?;
    let totals = crawler.run(&sites).await?;

    tracing::info!(
        sites = totals.sites,
        failed_sites = totals.failed_sites,
        rows = totals.rows_exported,
        "crawl finished"
    );
    Ok(())
}

/// Resolves the target sites of a command. Single-site commands are
/// validated the same way as entries of a sites file.
fn sites_for(
    command: Commands,
    default_sites_path: &std::path::Path,
) -> anyhow::Result<Vec<SiteConfig>> {
    let single = |site: SiteConfig| -> anyhow::Result<Vec<SiteConfig>> {
        validate_site(&site).with_context(|| format!("invalid site '{}'", site.domain))?;
        Ok(vec![site])
    };

    match command {
        Commands::Shopify { domain, category } => {
            single(SiteConfig::new(domain, category, Platform::Shopify))
        }
        Commands::Woo {
            sitemap,
            category,
            selectors,
        } => {
            let mut site = SiteConfig::new(sitemap, category, Platform::Woocommerce);
            site.selectors = selectors;
            single(site)
        }
        Commands::Batch { sites } => {
            let path = sites.unwrap_or_else(|| default_sites_path.to_path_buf());
            let file = load_sites(&path)
                .with_context(|| format!("failed to load sites from {}", path.display()))?;
            Ok(file.sites)
        }
    }
}
