//! CSV export of canonical product rows.
//!
//! One file per site, named after the site host (`www.shop.com` →
//! `www_shop_com.csv`), optionally inside a per-category directory. Files
//! are UTF-8 with a byte-order mark so spreadsheet tools detect the encoding
//! of the Chinese header cells, and rows are deduplicated by SKU keeping the
//! first occurrence.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use shopcrawl_core::{ProductRow, SiteConfig};
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create export directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode CSV for {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Where and how exports are written.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    /// Write each site into a sub-directory named after its custom category.
    pub group_by_category: bool,
}

/// Outcome of one written export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows_written: usize,
    pub duplicates_dropped: usize,
}

/// Target file for `site` under `options`.
#[must_use]
pub fn export_path(options: &ExportOptions, site: &SiteConfig) -> PathBuf {
    let mut dir = options.output_dir.clone();
    if options.group_by_category {
        dir.push(directory_name(&site.custom_category()));
    }
    dir.join(format!("{}.csv", site.export_stem()))
}

/// Category labels such as "五金/硬件" contain path separators.
fn directory_name(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// Writes `rows` for `site`. Returns `None` without touching the filesystem
/// when there are no rows.
///
/// # Errors
///
/// Returns [`ExportError`] if the directory or file cannot be written.
pub fn export_site(
    options: &ExportOptions,
    site: &SiteConfig,
    rows: &[ProductRow],
) -> Result<Option<ExportSummary>, ExportError> {
    if rows.is_empty() {
        tracing::info!(domain = %site.domain, "no rows collected, skipping export");
        return Ok(None);
    }

    let path = export_path(options, site);
    let summary = write_rows(&path, rows)?;
    tracing::info!(
        domain = %site.domain,
        path = %summary.path.display(),
        rows = summary.rows_written,
        duplicates = summary.duplicates_dropped,
        "export written"
    );
    Ok(Some(summary))
}

/// Writes `rows` to `path` as BOM-prefixed CSV, creating parent
/// directories and dropping rows whose SKU was already written.
///
/// # Errors
///
/// Returns [`ExportError`] if the directory or file cannot be written.
pub fn write_rows(path: &Path, rows: &[ProductRow]) -> Result<ExportSummary, ExportError> {
    let display = path.display().to_string();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let io_err = |source: std::io::Error| ExportError::Io {
        path: display.clone(),
        source,
    };
    let mut file = BufWriter::new(File::create(path).map_err(io_err)?);
    file.write_all(UTF8_BOM).map_err(io_err)?;

    let mut writer = csv::Writer::from_writer(file);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows_written = 0usize;
    for row in rows {
        if !seen.insert(row.sku.as_str()) {
            continue;
        }
        writer.serialize(row).map_err(|source| ExportError::Csv {
            path: display.clone(),
            source,
        })?;
        rows_written += 1;
    }
    writer.flush().map_err(io_err)?;

    Ok(ExportSummary {
        path: path.to_path_buf(),
        rows_written,
        duplicates_dropped: rows.len() - rows_written,
    })
}

#[cfg(test)]
mod tests {
    use shopcrawl_core::Platform;

    use super::*;

    fn site(domain: &str, category: Option<&str>) -> SiteConfig {
        SiteConfig::new(domain, category.map(str::to_owned), Platform::Shopify)
    }

    #[test]
    fn path_is_named_after_host() {
        let options = ExportOptions {
            output_dir: PathBuf::from("/out"),
            group_by_category: false,
        };
        assert_eq!(
            export_path(&options, &site("https://www.shop.com/collections/all", None)),
            PathBuf::from("/out/www_shop_com.csv")
        );
    }

    #[test]
    fn grouped_path_uses_sanitized_category() {
        let options = ExportOptions {
            output_dir: PathBuf::from("/out"),
            group_by_category: true,
        };
        assert_eq!(
            export_path(&options, &site("https://tools.example", Some("五金/硬件"))),
            PathBuf::from("/out/五金_硬件/tools_example.csv")
        );
        assert_eq!(
            export_path(&options, &site("https://tools.example", None)),
            PathBuf::from("/out/未知分类/tools_example.csv")
        );
    }
}
