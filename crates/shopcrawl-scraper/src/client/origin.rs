//! URL origin and host extraction.

use crate::error::ScraperError;

/// Extracts the scheme+host origin from a site URL.
///
/// Given `"https://shop.example.com/collections/all"`, returns
/// `"https://shop.example.com"`, so storefront endpoints are always resolved
/// against the site root whatever path the operator configured.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSiteUrl`] if `site_url` is not an absolute
/// URL with a host.
pub fn site_origin(site_url: &str) -> Result<String, ScraperError> {
    let url = reqwest::Url::parse(site_url.trim()).map_err(|e| ScraperError::InvalidSiteUrl {
        url: site_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.host_str().unwrap_or_default().is_empty() {
        return Err(ScraperError::InvalidSiteUrl {
            url: site_url.to_owned(),
            reason: "URL has no host".to_owned(),
        });
    }
    Ok(url.origin().ascii_serialization())
}

/// Extracts the hostname from a URL for use in errors and log fields.
///
/// Falls back to the full URL string if parsing fails.
pub(crate) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
