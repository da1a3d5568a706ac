//! The crawl pipeline.
//!
//! One browser session, one page, strictly sequential: consent gate, then
//! navigation to the offer view, then per-page scroll/extract/paginate
//! until the listing ends or the page budget runs out. Only browser launch
//! and snapshot write can fail the invocation; every UI irregularity
//! degrades to a smaller result set.

pub mod consent;
pub mod navigate;
pub mod paginate;
pub mod scroll;

use std::time::{Duration, Instant};

use anyhow::Context;
use chromiumoxide::Page;
use chrono::Utc;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::CrawlError;
use crate::extract;
use crate::models::CrawlResult;
use crate::period;
use crate::snapshot;

/// Poll interval while waiting for tiles to appear.
const TILE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Settle delay after the initial navigation.
const INITIAL_NAV_PAUSE: Duration = Duration::from_millis(500);

/// Outcome of a completed crawl invocation.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub result: CrawlResult,
    /// Listing pages actually extracted.
    pub pages_visited: u32,
}

/// Run one full crawl and replace the snapshot artifact.
///
/// The browser session is released on every path, including the failure
/// ones; the snapshot write happens only after release.
pub async fn run(config: &Config) -> Result<CrawlOutcome, CrawlError> {
    let session = BrowserSession::launch(&config.browser)
        .await
        .map_err(CrawlError::Launch)?;

    let outcome = drive(&session, config).await;
    session.close().await;

    snapshot::write_snapshot(&config.output, &outcome.result).map_err(|source| {
        CrawlError::Snapshot {
            path: config.output.clone(),
            source,
        }
    })?;

    Ok(outcome)
}

/// The pipeline proper. Infallible past launch: irregularities are logged
/// and absorbed.
async fn drive(session: &BrowserSession, config: &Config) -> CrawlOutcome {
    let page = session.page();
    let limits = &config.limits;
    let nav_timeout = Duration::from_secs(config.browser.nav_timeout_secs);

    if let Err(e) = goto_entry(page, &config.site.entry_url, nav_timeout).await {
        warn!("Initial navigation failed: {}", e);
    }

    consent::dismiss_consent(
        page,
        &config.site.consent_label,
        Duration::from_millis(limits.consent_timeout_ms),
    )
    .await;

    let view = navigate::reach_offer_view(page, &config.site, limits, nav_timeout).await;

    let tile_selector = match Selector::parse(&config.site.tile_selector) {
        Ok(selector) => selector,
        Err(_) => {
            warn!(
                "Invalid tile selector \"{}\", using \".product-tile\"",
                config.site.tile_selector
            );
            Selector::parse(".product-tile").unwrap()
        }
    };

    let mut products = Vec::new();
    let mut detected_period: Option<String> = None;
    let mut current_page: u32 = 1;
    let mut pages_visited: u32 = 0;

    loop {
        if !wait_for_tiles(
            page,
            &config.site.tile_selector,
            Duration::from_millis(limits.tile_timeout_ms),
        )
        .await
        {
            warn!("No product tiles found on page {}", current_page);
            break;
        }

        scroll::force_render(page, limits).await;

        let html = match page.content().await {
            Ok(html) => html,
            Err(e) => {
                warn!("Could not read page {} content: {}", current_page, e);
                break;
            }
        };
        pages_visited = current_page;

        let url = navigate::current_url(page, &view.url).await;
        let base = parse_base(&url, &config.site.entry_url);

        let records = extract::extract_products(&html, &base, &tile_selector);
        info!(
            "Captured {} products from page {} (total {})",
            records.len(),
            current_page,
            products.len() + records.len()
        );
        products.extend(records);

        if detected_period.is_none() {
            detected_period = period::detect_offer_period(&visible_text(&html));
        }

        if !paginate::next_page(
            page,
            current_page,
            limits.max_pages,
            &config.site.pagination_selector,
            nav_timeout,
        )
        .await
        {
            break;
        }
        current_page += 1;
    }

    let offer_period = detected_period.unwrap_or_else(|| {
        period::compute_offer_period(Utc::now().date_naive(), &config.offer_week)
    });

    info!(
        "Crawl finished: {} products over {} page(s), offer period \"{}\"",
        products.len(),
        pages_visited,
        offer_period
    );

    CrawlOutcome {
        result: CrawlResult {
            offer_period,
            last_updated: Utc::now(),
            products,
        },
        pages_visited,
    }
}

/// Navigate to the entry URL and give the load a bounded wait.
async fn goto_entry(page: &Page, url: &str, nav_timeout: Duration) -> anyhow::Result<()> {
    info!("Navigating to {}", url);
    page.goto(url).await.context("goto failed")?;

    match tokio::time::timeout(nav_timeout, page.wait_for_navigation()).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("Load completion not observed: {}", e),
        Err(_) => warn!("Timed out waiting for initial page load"),
    }
    tokio::time::sleep(INITIAL_NAV_PAUSE).await;
    Ok(())
}

/// Poll until at least one product tile is present, or give up.
async fn wait_for_tiles(page: &Page, tile_selector: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if page.find_element(tile_selector).await.is_ok() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(TILE_POLL_INTERVAL).await;
    }
}

/// Base URL for resolving relative links, falling back to the entry URL.
fn parse_base(current: &str, entry: &str) -> Url {
    Url::parse(current)
        .or_else(|_| Url::parse(entry))
        .unwrap_or_else(|_| Url::parse("https://localhost/").unwrap())
}

/// Concatenated visible text of a document, for period detection.
fn visible_text(html: &str) -> String {
    Html::parse_document(html)
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_prefers_current_url() {
        let base = parse_base(
            "https://www.aldi-sued.de/produkte/wochenangebote.html",
            "https://www.aldi-sued.de/angebote",
        );
        assert_eq!(base.path(), "/produkte/wochenangebote.html");
    }

    #[test]
    fn test_parse_base_falls_back_to_entry() {
        let base = parse_base("not a url", "https://www.aldi-sued.de/angebote");
        assert_eq!(base.as_str(), "https://www.aldi-sued.de/angebote");
    }

    #[test]
    fn test_visible_text_skips_markup() {
        let text = visible_text("<html><body><p>Mo. 02.02.</p><span>– Sa. 07.02.</span></body></html>");
        assert!(text.contains("Mo. 02.02."));
        assert!(text.contains("Sa. 07.02."));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_period_detection_over_document_text() {
        let html = "<html><body><h2>Angebote Mo. 02.02. – Sa. 07.02.</h2></body></html>";
        assert_eq!(
            period::detect_offer_period(&visible_text(html)).as_deref(),
            Some("Mo. 02.02. – Sa. 07.02.")
        );
    }
}
