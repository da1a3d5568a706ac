//! Offer-period derivation.
//!
//! Two deterministic strategies, tried in order:
//! - a date-range pattern found in the page's visible text
//! - a computed range from the current date and the configured offer week
//!
//! The computed fallback assumes nothing beyond the configured policy; the
//! Monday–Saturday default matches the one observed target.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;
use std::sync::LazyLock;

use crate::config::OfferWeekConfig;

/// Date-range pattern as the target renders it: `DD.MM.` to `DD.MM.` with
/// optional German weekday prefixes, joined by a dash or en dash.
static PERIOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?:Mo|Di|Mi|Do|Fr|Sa|So)\.\s*)?\d{1,2}\.\d{1,2}\.\s*[–-]\s*(?:(?:Mo|Di|Mi|Do|Fr|Sa|So)\.\s*)?\d{1,2}\.\d{1,2}\.",
    )
    .unwrap()
});

/// Find an offer-period label in on-page text. Returns the first match,
/// whitespace-normalized.
pub fn detect_offer_period(text: &str) -> Option<String> {
    PERIOD_RE
        .find(text)
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Compute the offer period containing `today` under the given week policy.
///
/// The window starts on the most recent occurrence of the configured start
/// day (today itself when it matches) and spans `span_days` beyond it.
pub fn compute_offer_period(today: NaiveDate, policy: &OfferWeekConfig) -> String {
    let start_day = parse_weekday(&policy.start_day).unwrap_or(Weekday::Mon);
    let offset = (today.weekday().num_days_from_monday() + 7
        - start_day.num_days_from_monday())
        % 7;
    let start = today - Duration::days(i64::from(offset));
    let end = start + Duration::days(i64::from(policy.span_days));

    format!(
        "{} {:02}.{:02}. – {} {:02}.{:02}.",
        weekday_abbrev(start.weekday()),
        start.day(),
        start.month(),
        weekday_abbrev(end.weekday()),
        end.day(),
        end.month(),
    )
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.trim().to_ascii_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// German weekday abbreviation, as the target prints them.
fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mo.",
        Weekday::Tue => "Di.",
        Weekday::Wed => "Mi.",
        Weekday::Thu => "Do.",
        Weekday::Fri => "Fr.",
        Weekday::Sat => "Sa.",
        Weekday::Sun => "So.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_policy() -> OfferWeekConfig {
        OfferWeekConfig {
            start_day: "monday".to_string(),
            span_days: 5,
        }
    }

    #[test]
    fn test_detect_with_weekday_prefixes() {
        let text = "Gültig Mo. 02.02. – Sa. 07.02. in allen Filialen";
        assert_eq!(
            detect_offer_period(text).as_deref(),
            Some("Mo. 02.02. – Sa. 07.02.")
        );
    }

    #[test]
    fn test_detect_bare_range_with_hyphen() {
        let text = "Angebote 10.03. - 15.03. solange der Vorrat reicht";
        assert_eq!(detect_offer_period(text).as_deref(), Some("10.03. - 15.03."));
    }

    #[test]
    fn test_detect_absent() {
        assert_eq!(detect_offer_period("Keine Daten hier"), None);
    }

    #[test]
    fn test_compute_midweek() {
        // Wednesday 2026-02-04 belongs to the week of Monday 2026-02-02.
        let wednesday = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();
        assert_eq!(
            compute_offer_period(wednesday, &default_policy()),
            "Mo. 02.02. – Sa. 07.02."
        );
    }

    #[test]
    fn test_compute_on_start_day() {
        let monday = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        assert_eq!(
            compute_offer_period(monday, &default_policy()),
            "Mo. 02.02. – Sa. 07.02."
        );
    }

    #[test]
    fn test_compute_sunday_belongs_to_preceding_week() {
        let sunday = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        assert_eq!(
            compute_offer_period(sunday, &default_policy()),
            "Mo. 02.02. – Sa. 07.02."
        );
    }

    #[test]
    fn test_compute_crosses_month_boundary() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert_eq!(
            compute_offer_period(day, &default_policy()),
            "Mo. 30.03. – Sa. 04.04."
        );
    }

    #[test]
    fn test_compute_custom_policy() {
        // Thursday-start week spanning a full 6 days ends on Wednesday.
        let policy = OfferWeekConfig {
            start_day: "thu".to_string(),
            span_days: 6,
        };
        let friday = NaiveDate::from_ymd_opt(2026, 2, 6).unwrap();
        assert_eq!(
            compute_offer_period(friday, &policy),
            "Do. 05.02. – Mi. 11.02."
        );
    }

    #[test]
    fn test_unknown_start_day_falls_back_to_monday() {
        let policy = OfferWeekConfig {
            start_day: "someday".to_string(),
            span_days: 5,
        };
        let wednesday = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();
        assert_eq!(
            compute_offer_period(wednesday, &policy),
            "Mo. 02.02. – Sa. 07.02."
        );
    }
}
