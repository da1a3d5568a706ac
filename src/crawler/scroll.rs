//! Lazy-content rendering via bounded incremental scrolling.
//!
//! The listing virtualizes images: real sources populate only once a tile
//! scrolls into view. Scrolling proceeds in fixed increments until the
//! cumulative distance covers the page's reported scrollable remainder or
//! hits a hard cap. The cap makes termination unconditional: pages whose
//! scroll height never stabilizes (effectively infinite scroll surfaces)
//! cannot stall the crawl.

use std::time::Duration;

use chromiumoxide::Page;
use tracing::debug;

use crate::config::LimitConfig;

/// Upper bound on scroll iterations for a step size and distance cap.
/// The loop can never run more often than this, regardless of what the
/// page reports.
pub fn max_scroll_steps(step_px: u32, cap_px: u32) -> u32 {
    if step_px == 0 {
        return 1;
    }
    cap_px.div_ceil(step_px).max(1)
}

/// Scroll the page to force progressive rendering, then settle.
pub async fn force_render(page: &Page, limits: &LimitConfig) {
    let step = limits.scroll_step_px.max(1);
    let steps = max_scroll_steps(step, limits.scroll_cap_px);
    let pause = Duration::from_millis(limits.scroll_pause_ms);
    let mut total: u64 = 0;

    for _ in 0..steps {
        let script = format!(
            r#"(() => {{
                window.scrollBy(0, {step});
                return Math.max(0, document.body.scrollHeight - window.innerHeight);
            }})()"#
        );

        let remainder = match page.evaluate(script).await {
            Ok(result) => result.into_value::<f64>().unwrap_or(f64::MAX),
            Err(e) => {
                debug!("Scroll step failed, stopping early: {}", e);
                break;
            }
        };

        total += u64::from(step);
        if total as f64 >= remainder {
            break;
        }
        tokio::time::sleep(pause).await;
    }

    debug!("Scrolled {} px total", total);

    // Final async image loads need a moment after the last scroll.
    tokio::time::sleep(Duration::from_millis(limits.settle_ms)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_bound_matches_cap() {
        assert_eq!(max_scroll_steps(250, 15_000), 60);
        assert_eq!(max_scroll_steps(200, 15_000), 75);
    }

    #[test]
    fn test_step_bound_rounds_up() {
        assert_eq!(max_scroll_steps(400, 1_000), 3);
    }

    #[test]
    fn test_step_bound_is_never_zero() {
        assert_eq!(max_scroll_steps(250, 0), 1);
        assert_eq!(max_scroll_steps(0, 15_000), 1);
    }

    #[test]
    fn test_step_bound_with_oversized_step() {
        assert_eq!(max_scroll_steps(20_000, 15_000), 1);
    }
}
