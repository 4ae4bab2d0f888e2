use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a usable
/// config. Decoupled from the real environment so tests can pass a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got \"{other}\""),
            }),
        }
    };

    let log_level = or_default("SHOPCRAWL_LOG_LEVEL", "info");
    let sites_path = PathBuf::from(or_default("SHOPCRAWL_SITES_PATH", "./config/sites.yaml"));
    let rates_path = PathBuf::from(or_default(
        "SHOPCRAWL_RATES_PATH",
        "./config/exchange_rates.json",
    ));
    let output_dir = PathBuf::from(or_default("SHOPCRAWL_OUTPUT_DIR", "./exports"));
    let group_by_category = parse_bool("SHOPCRAWL_GROUP_BY_CATEGORY", "false")?;

    let scraper_request_timeout_secs: u64 =
        parse_var(&or_default, "SHOPCRAWL_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("SHOPCRAWL_USER_AGENT", "shopcrawl/0.1 (catalog-export)");
    let scraper_max_concurrent_sites: usize =
        parse_var(&or_default, "SHOPCRAWL_MAX_CONCURRENT_SITES", "4")?;
    let scraper_detail_concurrency: usize =
        parse_var(&or_default, "SHOPCRAWL_DETAIL_CONCURRENCY", "8")?;
    let scraper_inter_request_delay_ms: u64 =
        parse_var(&or_default, "SHOPCRAWL_INTER_REQUEST_DELAY_MS", "0")?;
    let scraper_max_retries: u32 = parse_var(&or_default, "SHOPCRAWL_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_secs: u64 =
        parse_var(&or_default, "SHOPCRAWL_RETRY_BACKOFF_BASE_SECS", "1")?;

    Ok(AppConfig {
        log_level,
        sites_path,
        rates_path,
        output_dir,
        group_by_category,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_concurrent_sites,
        scraper_detail_concurrency,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
    })
}

/// Parses `var` (or its `default`) as a number.
fn parse_var<T>(
    or_default: &impl Fn(&str, &str) -> String,
    var: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    or_default(var, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        build_app_config(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
                .ok_or(std::env::VarError::NotPresent)
        })
    }

    fn invalid_var(result: Result<AppConfig, ConfigError>) -> String {
        match result {
            Err(ConfigError::InvalidEnvVar { var, .. }) => var,
            other => panic!("expected InvalidEnvVar, got {other:?}"),
        }
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.sites_path, Path::new("./config/sites.yaml"));
        assert_eq!(cfg.rates_path, Path::new("./config/exchange_rates.json"));
        assert_eq!(cfg.output_dir, Path::new("./exports"));
        assert!(!cfg.group_by_category);
        assert_eq!(cfg.scraper_request_timeout_secs, 30);
        assert_eq!(cfg.scraper_user_agent, "shopcrawl/0.1 (catalog-export)");
        assert_eq!(cfg.scraper_max_concurrent_sites, 4);
        assert_eq!(cfg.scraper_detail_concurrency, 8);
        assert_eq!(cfg.scraper_inter_request_delay_ms, 0);
        assert_eq!(cfg.scraper_max_retries, 3);
        assert_eq!(cfg.scraper_retry_backoff_base_secs, 1);
    }

    #[test]
    fn variables_override_defaults() {
        let cfg = config_from(&[
            ("SHOPCRAWL_OUTPUT_DIR", "/tmp/out"),
            ("SHOPCRAWL_GROUP_BY_CATEGORY", "YES"),
            ("SHOPCRAWL_MAX_CONCURRENT_SITES", "16"),
            ("SHOPCRAWL_DETAIL_CONCURRENCY", " 32 "),
            ("SHOPCRAWL_USER_AGENT", "catalog-bot/2.0"),
        ])
        .unwrap();
        assert_eq!(cfg.output_dir, Path::new("/tmp/out"));
        assert!(cfg.group_by_category);
        assert_eq!(cfg.scraper_max_concurrent_sites, 16);
        assert_eq!(cfg.scraper_detail_concurrency, 32);
        assert_eq!(cfg.scraper_user_agent, "catalog-bot/2.0");
    }

    #[test]
    fn malformed_values_name_the_variable() {
        assert_eq!(
            invalid_var(config_from(&[("SHOPCRAWL_MAX_RETRIES", "three")])),
            "SHOPCRAWL_MAX_RETRIES"
        );
        assert_eq!(
            invalid_var(config_from(&[("SHOPCRAWL_INTER_REQUEST_DELAY_MS", "-5")])),
            "SHOPCRAWL_INTER_REQUEST_DELAY_MS"
        );
        assert_eq!(
            invalid_var(config_from(&[("SHOPCRAWL_GROUP_BY_CATEGORY", "maybe")])),
            "SHOPCRAWL_GROUP_BY_CATEGORY"
        );
    }
}
