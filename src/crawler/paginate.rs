//! Pagination across the offer listing.
//!
//! The target numbers its pages; the control for page N+1 carries the
//! visible label "N+1". `max_pages` caps total work against very deep or
//! unbounded pagination. A missing control is the normal end of the
//! listing, not an error.

use std::time::Duration;

use chromiumoxide::Page;
use tracing::{debug, info, warn};

/// Whether another page may be attempted under the page budget.
pub fn within_budget(current_page: u32, max_pages: u32) -> bool {
    current_page < max_pages
}

/// Advance to the next listing page if a control for it exists and the
/// budget allows. Returns true only when navigation completed.
pub async fn next_page(
    page: &Page,
    current_page: u32,
    max_pages: u32,
    pagination_selector: &str,
    nav_timeout: Duration,
) -> bool {
    if !within_budget(current_page, max_pages) {
        debug!("Page budget reached at page {}", current_page);
        return false;
    }

    let label = (current_page + 1).to_string();
    let script = click_page_label_script(pagination_selector, &label);

    let clicked = match page.evaluate(script).await {
        Ok(result) => result.into_value::<bool>().unwrap_or(false),
        Err(e) => {
            warn!("Pagination probe failed: {}", e);
            false
        }
    };

    if !clicked {
        debug!("No pagination control labeled \"{}\" found", label);
        return false;
    }

    info!("Moving to page {}", label);
    match tokio::time::timeout(nav_timeout, page.wait_for_navigation()).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            warn!("Navigation to page {} failed: {}", label, e);
            false
        }
        Err(_) => {
            warn!("Timed out navigating to page {}", label);
            false
        }
    }
}

/// JS that clicks the pagination control whose trimmed text equals the
/// label, reporting whether anything was clicked.
fn click_page_label_script(selector: &str, label: &str) -> String {
    format!(
        r#"(() => {{
            const label = {};
            const controls = Array.from(document.querySelectorAll({}));
            const hit = controls.find(el => el.innerText && el.innerText.trim() === label);
            if (hit) {{ hit.click(); return true; }}
            return false;
        }})()"#,
        serde_json::to_string(label).unwrap_or_else(|_| "\"\"".to_string()),
        serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_allows_up_to_max() {
        assert!(within_budget(1, 5));
        assert!(within_budget(4, 5));
        assert!(!within_budget(5, 5));
        assert!(!within_budget(6, 5));
    }

    #[test]
    fn test_budget_of_one_page() {
        // max_pages = 1 means: extract page 1, never paginate.
        assert!(!within_budget(1, 1));
    }

    #[test]
    fn test_script_targets_next_label() {
        let script = click_page_label_script(".base-pagination a", "3");
        assert!(script.contains(r#"const label = "3";"#));
        assert!(script.contains(r#"".base-pagination a""#));
    }
}
