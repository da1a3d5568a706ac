//! Crawler configuration.
//!
//! Loaded from an optional TOML file; every field has a default tuned to
//! the one observed target, so an empty config is fully functional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub browser: BrowserEngineConfig,

    #[serde(default)]
    pub limits: LimitConfig,

    #[serde(default)]
    pub offer_week: OfferWeekConfig,

    /// Snapshot artifact location.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            browser: BrowserEngineConfig::default(),
            limits: LimitConfig::default(),
            offer_week: OfferWeekConfig::default(),
            output: default_output(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, or defaults when the path is
    /// `None` or the file does not exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// What the target site looks like. Any change to these conventions on the
/// site's side degrades extraction silently rather than failing loudly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Entry URL. Pointing this directly at the full offer list skips the
    /// show-all affordance lookup (it simply won't be found).
    #[serde(default = "default_entry_url")]
    pub entry_url: String,

    /// Visible text of the consent-confirmation control.
    #[serde(default = "default_consent_label")]
    pub consent_label: String,

    /// Selector for the "show all offers" affordance on the landing view.
    #[serde(default = "default_show_all_selector")]
    pub show_all_selector: String,

    /// Selector matching one product tile.
    #[serde(default = "default_tile_selector")]
    pub tile_selector: String,

    /// Selector matching pagination controls (page-number links/buttons).
    #[serde(default = "default_pagination_selector")]
    pub pagination_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            entry_url: default_entry_url(),
            consent_label: default_consent_label(),
            show_all_selector: default_show_all_selector(),
            tile_selector: default_tile_selector(),
            pagination_selector: default_pagination_selector(),
        }
    }
}

/// Browser engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    /// Set to false to watch the crawl for debugging.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit Chrome/Chromium executable. Discovered automatically when
    /// unset.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Browser window width in pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Browser window height in pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Navigation timeout in seconds.
    #[serde(default = "default_nav_timeout")]
    pub nav_timeout_secs: u64,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            executable: None,
            chrome_args: Vec::new(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            nav_timeout_secs: default_nav_timeout(),
        }
    }
}

/// Bounds on every wait and loop in the pipeline. These are safety valves
/// against an uncooperative or effectively infinite target, not tuning
/// knobs for correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    /// Maximum number of listing pages to visit.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// How long to wait for the consent control before proceeding without it.
    #[serde(default = "default_consent_timeout")]
    pub consent_timeout_ms: u64,

    /// How long to wait for the show-all affordance before falling back to
    /// the landing view.
    #[serde(default = "default_show_all_timeout")]
    pub show_all_timeout_ms: u64,

    /// How long to wait for product tiles to appear on a page.
    #[serde(default = "default_tile_timeout")]
    pub tile_timeout_ms: u64,

    /// Scroll increment per step, in pixels.
    #[serde(default = "default_scroll_step")]
    pub scroll_step_px: u32,

    /// Pause between scroll steps.
    #[serde(default = "default_scroll_pause")]
    pub scroll_pause_ms: u64,

    /// Hard cap on cumulative scroll distance, in pixels. Guarantees the
    /// scroll loop terminates even when the page's reported scroll height
    /// never stabilizes.
    #[serde(default = "default_scroll_cap")]
    pub scroll_cap_px: u32,

    /// Settle delay after scrolling, for late image loads.
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            consent_timeout_ms: default_consent_timeout(),
            show_all_timeout_ms: default_show_all_timeout(),
            tile_timeout_ms: default_tile_timeout(),
            scroll_step_px: default_scroll_step(),
            scroll_pause_ms: default_scroll_pause(),
            scroll_cap_px: default_scroll_cap(),
            settle_ms: default_settle(),
        }
    }
}

/// Policy for the computed offer-period fallback.
///
/// The observed target runs its offer week Monday through Saturday, but
/// that is a guessed business rule, so it stays configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferWeekConfig {
    /// First day of the offer week: "monday" .. "sunday" (or the 3-letter
    /// English abbreviation).
    #[serde(default = "default_week_start")]
    pub start_day: String,

    /// Length of the offer window in days beyond the start day
    /// (5 means a Monday start ends on Saturday).
    #[serde(default = "default_week_span")]
    pub span_days: u8,
}

impl Default for OfferWeekConfig {
    fn default() -> Self {
        Self {
            start_day: default_week_start(),
            span_days: default_week_span(),
        }
    }
}

fn default_entry_url() -> String {
    "https://www.aldi-sued.de/angebote".to_string()
}

fn default_consent_label() -> String {
    "Alle bestätigen".to_string()
}

fn default_show_all_selector() -> String {
    r#"a[aria-label^="Alle anzeigen"], a.product-teaser-list__link-content"#.to_string()
}

fn default_tile_selector() -> String {
    ".product-tile".to_string()
}

fn default_pagination_selector() -> String {
    ".base-pagination a, .base-pagination button".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    1024
}

fn default_nav_timeout() -> u64 {
    60
}

fn default_max_pages() -> u32 {
    5
}

fn default_consent_timeout() -> u64 {
    10_000
}

fn default_show_all_timeout() -> u64 {
    10_000
}

fn default_tile_timeout() -> u64 {
    15_000
}

fn default_scroll_step() -> u32 {
    250
}

fn default_scroll_pause() -> u64 {
    100
}

fn default_scroll_cap() -> u32 {
    15_000
}

fn default_settle() -> u64 {
    3_000
}

fn default_week_start() -> String {
    "monday".to_string()
}

fn default_week_span() -> u8 {
    5
}

fn default_output() -> PathBuf {
    PathBuf::from("data/offers.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.browser.headless);
        assert_eq!(config.limits.max_pages, 5);
        assert_eq!(config.site.tile_selector, ".product-tile");
        assert_eq!(config.offer_week.start_day, "monday");
        assert_eq!(config.output, PathBuf::from("data/offers.json"));
    }

    #[test]
    fn test_partial_override() {
        let config: Config = toml::from_str(
            r#"
            [limits]
            max_pages = 2
            scroll_cap_px = 5000

            [browser]
            headless = false
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.max_pages, 2);
        assert_eq!(config.limits.scroll_cap_px, 5000);
        assert!(!config.browser.headless);
        // Untouched sections keep their defaults.
        assert_eq!(config.limits.scroll_step_px, 250);
        assert_eq!(config.site.consent_label, "Alle bestätigen");
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let config = Config::load(Some(Path::new("/nonexistent/offersnap.toml"))).unwrap();
        assert_eq!(config.limits.max_pages, 5);
    }
}
