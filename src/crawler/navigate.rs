//! Navigation from the landing view to the full offer list.
//!
//! A small state machine: on the landing URL, try the "show all offers"
//! affordance within a bounded wait; on any miss, click failure, or
//! navigation timeout, fall back to the landing view itself. This always
//! terminates in an offer view and never raises past this point.

use std::time::{Duration, Instant};

use chromiumoxide::Page;
use tracing::{debug, info, warn};

use crate::config::{LimitConfig, SiteConfig};

/// Poll interval while waiting for the affordance.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Settle delay after a click-triggered navigation.
const POST_NAV_PAUSE: Duration = Duration::from_millis(1000);

/// How the offer view was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViaRoute {
    /// The show-all affordance was followed.
    ShowAll,
    /// No affordance (or navigation failed); the landing view stands in.
    Landing,
}

/// Terminal state of the navigation controller.
#[derive(Debug, Clone)]
pub struct OfferView {
    /// Best URL reached.
    pub url: String,
    pub via: ViaRoute,
}

/// Drive the page from the landing view to the canonical offer list.
/// `nav_timeout` bounds the click-triggered navigation wait.
pub async fn reach_offer_view(
    page: &Page,
    site: &SiteConfig,
    limits: &LimitConfig,
    nav_timeout: Duration,
) -> OfferView {
    let landing_url = current_url(page, &site.entry_url).await;

    let clicked = click_affordance(
        page,
        &site.show_all_selector,
        Duration::from_millis(limits.show_all_timeout_ms),
    )
    .await;

    if !clicked {
        debug!("Show-all affordance not found, staying on landing view");
        return OfferView {
            url: landing_url,
            via: ViaRoute::Landing,
        };
    }

    info!("Following show-all affordance to full offer list");
    match tokio::time::timeout(nav_timeout, page.wait_for_navigation()).await {
        Ok(Ok(_)) => {
            tokio::time::sleep(POST_NAV_PAUSE).await;
            let url = current_url(page, &landing_url).await;
            info!("Reached offer view at {}", url);
            OfferView {
                url,
                via: ViaRoute::ShowAll,
            }
        }
        Ok(Err(e)) => {
            warn!("Navigation after show-all failed: {}", e);
            OfferView {
                url: current_url(page, &landing_url).await,
                via: ViaRoute::Landing,
            }
        }
        Err(_) => {
            warn!("Timed out waiting for show-all navigation");
            OfferView {
                url: current_url(page, &landing_url).await,
                via: ViaRoute::Landing,
            }
        }
    }
}

/// Poll for the affordance and click it when it shows up. False when the
/// deadline passes without a match.
async fn click_affordance(page: &Page, selector: &str, timeout: Duration) -> bool {
    let script = click_selector_script(selector);
    let deadline = Instant::now() + timeout;

    loop {
        match page.evaluate(script.clone()).await {
            Ok(result) => {
                if result.into_value::<bool>().unwrap_or(false) {
                    return true;
                }
            }
            Err(e) => debug!("Affordance probe failed: {}", e),
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// JS that clicks the first match for a selector, reporting whether
/// anything was clicked.
fn click_selector_script(selector: &str) -> String {
    format!(
        r#"(() => {{
            const hit = document.querySelector({});
            if (hit) {{ hit.click(); return true; }}
            return false;
        }})()"#,
        serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string()),
    )
}

/// Best-known current URL, with the configured entry URL as fallback.
pub async fn current_url(page: &Page, fallback: &str) -> String {
    match page.url().await {
        Ok(Some(url)) => url.to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_embeds_selector_as_json_string() {
        let script =
            click_selector_script(r#"a[aria-label^="Alle anzeigen"], a.product-teaser-list__link-content"#);
        assert!(script.contains(r#"a[aria-label^=\"Alle anzeigen\"]"#));
        assert!(script.contains("querySelector"));
    }
}
