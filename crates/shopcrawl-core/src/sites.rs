use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::products::UNKNOWN_CUSTOM_CATEGORY;
use crate::ConfigError;

/// Storefront platform of a target site; selects the extractor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Shopify,
    #[serde(alias = "woo")]
    Woocommerce,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Shopify => write!(f, "shopify"),
            Platform::Woocommerce => write!(f, "woocommerce"),
        }
    }
}

/// One target site of a crawl run.
///
/// For Shopify `domain` is the storefront root; for WooCommerce it is the
/// root sitemap URL (e.g. `https://shop.example/sitemap_index.xml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub domain: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub platform: Platform,
    /// Selector override file, WooCommerce only.
    #[serde(default)]
    pub selectors: Option<PathBuf>,
}

impl SiteConfig {
    #[must_use]
    pub fn new(domain: impl Into<String>, category: Option<String>, platform: Platform) -> Self {
        Self {
            domain: domain.into(),
            category,
            platform,
            selectors: None,
        }
    }

    /// The custom category label, defaulted to "未知分类" when blank.
    #[must_use]
    pub fn custom_category(&self) -> String {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_CUSTOM_CATEGORY)
            .to_owned()
    }

    /// Host component of `domain` (`"www.shop.com"` for
    /// `"https://www.shop.com/sitemap.xml"`), with a non-default port kept
    /// as `host:port` and any credentials dropped. Falls back to the raw
    /// value when `domain` is not a URL with a host.
    #[must_use]
    pub fn host(&self) -> String {
        self.parsed_host()
            .unwrap_or_else(|| self.domain.trim().to_owned())
    }

    fn parsed_host(&self) -> Option<String> {
        let url = Url::parse(self.domain.trim()).ok()?;
        let host = url.host_str().filter(|h| !h.is_empty())?;
        Some(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        })
    }

    /// File stem for this site's export: the host with dots replaced by
    /// underscores, `www.shop.com` → `www_shop_com`. Port separators are
    /// replaced too so the stem is a valid file name everywhere.
    #[must_use]
    pub fn export_stem(&self) -> String {
        self.host().replace(['.', ':'], "_")
    }
}

#[derive(Debug, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteConfig>,
}

/// Load and validate the batch sites list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sites_file: SitesFile = serde_yaml::from_str(&content)?;

    validate_sites(&sites_file)?;

    Ok(sites_file)
}

/// Rejects sites whose domain is not an absolute http(s) URL, and
/// duplicate domains, which would overwrite each other's export.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] describing the first offending entry.
pub fn validate_site(site: &SiteConfig) -> Result<(), ConfigError> {
    let domain = site.domain.trim();
    if !(domain.starts_with("http://") || domain.starts_with("https://")) {
        return Err(ConfigError::Validation(format!(
            "domain '{domain}' must be a full URL starting with http:// or https://"
        )));
    }
    if site.parsed_host().is_none() {
        return Err(ConfigError::Validation(format!(
            "domain '{domain}' has no host"
        )));
    }
    if site.selectors.is_some() && site.platform != Platform::Woocommerce {
        return Err(ConfigError::Validation(format!(
            "site '{domain}' sets selectors but is not a woocommerce site"
        )));
    }
    Ok(())
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for site in &sites_file.sites {
        validate_site(site)?;

        let key = site.domain.trim().trim_end_matches('/').to_lowercase();
        if !seen.insert(key) {
            return Err(ConfigError::Validation(format!(
                "duplicate site domain: '{}'",
                site.domain
            )));
        }
    }

    Ok(())
}
