//! Data model for crawl results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One extracted product offer.
///
/// Every field is best-effort: extraction misses resolve to `None` rather
/// than failing the tile. Prices stay as the locale-formatted text the site
/// renders (e.g. `"0,99 €"`); numeric parsing is a downstream concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub brand: Option<String>,
    pub title: Option<String>,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
}

impl ProductRecord {
    /// Whether this record carries enough data to be worth keeping.
    ///
    /// Policy: a non-empty title OR a non-empty price that is not literally
    /// "0". Tiles failing both are layout artifacts (spacers, teasers).
    pub fn is_retainable(&self) -> bool {
        let has_title = self.title.as_deref().is_some_and(|t| !t.is_empty());
        let has_price = self
            .price
            .as_deref()
            .is_some_and(|p| !p.is_empty() && p != "0");
        has_title || has_price
    }
}

/// A completed crawl: the full product list plus snapshot metadata.
///
/// Serialized with camelCase keys (`offerPeriod`, `lastUpdated`, ...) for
/// compatibility with existing snapshot consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    /// Human-readable validity window, e.g. "Mo. 02.02. – Sa. 07.02.".
    pub offer_period: String,
    /// Wall-clock time the snapshot was produced.
    pub last_updated: DateTime<Utc>,
    pub products: Vec<ProductRecord>,
}

impl CrawlResult {
    /// An empty catalog, used when no snapshot exists yet.
    pub fn empty() -> Self {
        Self {
            offer_period: String::new(),
            last_updated: Utc::now(),
            products: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: Option<&str>, price: Option<&str>) -> ProductRecord {
        ProductRecord {
            brand: None,
            title: title.map(str::to_string),
            price: price.map(str::to_string),
            original_price: None,
            image_url: None,
            link: None,
        }
    }

    #[test]
    fn test_retention_title_only() {
        assert!(record(Some("Milk 1L"), None).is_retainable());
    }

    #[test]
    fn test_retention_price_only() {
        assert!(record(None, Some("2,49 €")).is_retainable());
    }

    #[test]
    fn test_retention_rejects_empty_and_zero() {
        assert!(!record(None, None).is_retainable());
        assert!(!record(Some(""), Some("")).is_retainable());
        assert!(!record(None, Some("0")).is_retainable());
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let result = CrawlResult {
            offer_period: "Mo. 02.02. – Sa. 07.02.".to_string(),
            last_updated: Utc::now(),
            products: vec![record(Some("Milk"), Some("0,99 €"))],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"offerPeriod\""));
        assert!(json.contains("\"lastUpdated\""));
        assert!(json.contains("\"originalPrice\""));
        assert!(json.contains("\"imageUrl\""));
        assert!(!json.contains("offer_period"));
    }
}
