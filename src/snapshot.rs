//! Snapshot persistence.
//!
//! The artifact is a single JSON document that is fully replaced on every
//! crawl. Replacement is atomic from the reader's perspective: the new
//! content lands in a temp file in the destination directory and is
//! renamed over the old artifact. There is no partial-write recovery.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use crate::models::{CrawlResult, ProductRecord};

/// Serialize the result and replace the artifact at `path`.
pub fn write_snapshot(path: &Path, result: &CrawlResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result).context("failed to serialize snapshot")?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create snapshot directory {}", dir.display()))?;

    // Temp file must live in the destination directory so the rename stays
    // on one filesystem.
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .context("failed to create temporary snapshot file")?;
    tmp.write_all(json.as_bytes())
        .context("failed to write snapshot content")?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace snapshot at {}", path.display()))?;

    info!(
        "Wrote snapshot with {} products to {}",
        result.products.len(),
        path.display()
    );
    Ok(())
}

/// Read the current snapshot.
///
/// A missing artifact is an empty catalog, not an error. The legacy
/// bare-array shape (products only, no metadata) is still accepted on
/// read even though it is no longer produced.
pub fn read_snapshot(path: &Path) -> anyhow::Result<CrawlResult> {
    if !path.exists() {
        return Ok(CrawlResult::empty());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;

    if let Ok(result) = serde_json::from_str::<CrawlResult>(&raw) {
        return Ok(result);
    }

    let products: Vec<ProductRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("snapshot {} has an unknown shape", path.display()))?;
    Ok(CrawlResult {
        offer_period: String::new(),
        last_updated: Utc::now(),
        products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(title: &str) -> CrawlResult {
        CrawlResult {
            offer_period: "Mo. 02.02. – Sa. 07.02.".to_string(),
            last_updated: Utc.with_ymd_and_hms(2026, 2, 2, 6, 0, 0).unwrap(),
            products: vec![ProductRecord {
                brand: Some("Milfina".to_string()),
                title: Some(title.to_string()),
                price: Some("0,99 €".to_string()),
                original_price: Some("1,29 €".to_string()),
                image_url: None,
                link: None,
            }],
        }
    }

    #[test]
    fn test_write_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.json");

        write_snapshot(&path, &sample("Milk 1L")).unwrap();
        let read = read_snapshot(&path).unwrap();

        assert_eq!(read.offer_period, "Mo. 02.02. – Sa. 07.02.");
        assert_eq!(read.products.len(), 1);
        assert_eq!(read.products[0].title.as_deref(), Some("Milk 1L"));
    }

    #[test]
    fn test_write_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.json");

        write_snapshot(&path, &sample("Old")).unwrap();
        write_snapshot(&path, &sample("New")).unwrap();

        let read = read_snapshot(&path).unwrap();
        assert_eq!(read.products.len(), 1);
        assert_eq!(read.products[0].title.as_deref(), Some("New"));
    }

    #[test]
    fn test_write_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/offers.json");

        write_snapshot(&path, &sample("Milk 1L")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_missing_snapshot_is_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let read = read_snapshot(&dir.path().join("absent.json")).unwrap();
        assert!(read.products.is_empty());
        assert!(read.offer_period.is_empty());
    }

    #[test]
    fn test_legacy_bare_array_still_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.json");
        fs::write(
            &path,
            r#"[{"brand":null,"title":"Milk 1L","price":"0,99 €","originalPrice":null,"imageUrl":null,"link":null}]"#,
        )
        .unwrap();

        let read = read_snapshot(&path).unwrap();
        assert_eq!(read.products.len(), 1);
        assert_eq!(read.products[0].title.as_deref(), Some("Milk 1L"));
    }

    #[test]
    fn test_artifact_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.json");

        write_snapshot(&path, &sample("Milk 1L")).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"offerPeriod\""));
        assert!(raw.contains("\"lastUpdated\""));
        assert!(raw.contains("\"originalPrice\""));
    }
}
