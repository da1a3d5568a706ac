//! Consent-gate handling.
//!
//! The target fronts the catalog with a cookie banner. Absence of the
//! banner is a normal outcome (already accepted, different market, A/B
//! variant), so this never errors and never blocks past its deadline.

use std::time::{Duration, Instant};

use chromiumoxide::Page;
use tracing::{debug, info};

/// Poll interval while waiting for the consent control.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Pause after clicking, to let the overlay clear.
const DISMISS_PAUSE: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentOutcome {
    /// The control was found and activated.
    Dismissed,
    /// No control appeared within the deadline.
    Absent,
}

/// Look for a button or link whose visible text equals `label` and click
/// it. Gives up quietly after `timeout`.
pub async fn dismiss_consent(page: &Page, label: &str, timeout: Duration) -> ConsentOutcome {
    let script = click_by_text_script(label);
    let deadline = Instant::now() + timeout;

    loop {
        match page.evaluate(script.clone()).await {
            Ok(result) => {
                if result.into_value::<bool>().unwrap_or(false) {
                    info!("Consent control \"{}\" dismissed", label);
                    tokio::time::sleep(DISMISS_PAUSE).await;
                    return ConsentOutcome::Dismissed;
                }
            }
            Err(e) => {
                // Evaluation can fail during page transitions; keep polling.
                debug!("Consent probe failed: {}", e);
            }
        }

        if Instant::now() >= deadline {
            debug!("Consent control \"{}\" not found, proceeding", label);
            return ConsentOutcome::Absent;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// JS that clicks the first button/anchor whose trimmed text equals the
/// label, reporting whether anything was clicked.
fn click_by_text_script(label: &str) -> String {
    format!(
        r#"(() => {{
            const label = {};
            const candidates = Array.from(document.querySelectorAll('button, a'));
            const hit = candidates.find(el => el.innerText && el.innerText.trim() === label);
            if (hit) {{ hit.click(); return true; }}
            return false;
        }})()"#,
        serde_json::to_string(label).unwrap_or_else(|_| "\"\"".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_embeds_label_as_json_string() {
        let script = click_by_text_script("Alle bestätigen");
        assert!(script.contains(r#"const label = "Alle bestätigen";"#));
    }

    #[test]
    fn test_script_escapes_quotes() {
        let script = click_by_text_script(r#"say "yes""#);
        assert!(script.contains(r#"const label = "say \"yes\"";"#));
    }
}
