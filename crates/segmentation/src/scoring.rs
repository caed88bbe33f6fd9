//! Engagement scoring: opens and clicks per day of list membership.

use chrono::{DateTime, Utc};
use mailreach_core::types::Contact;

pub const OPEN_WEIGHT: f64 = 0.6;
pub const CLICK_WEIGHT: f64 = 0.4;

/// Relative engagement signal, `0.6 * opens/day + 0.4 * clicks/day`, where
/// days since creation is floored and never less than 1. Only meaningful
/// for ranking contacts against each other.
pub fn engagement_score(contact: &Contact, now: DateTime<Utc>) -> f64 {
    let days_since_created = (now - contact.created_at).num_days().max(1) as f64;
    let open_rate = contact.open_count as f64 / days_since_created;
    let click_rate = contact.click_count as f64 / days_since_created;
    OPEN_WEIGHT * open_rate + CLICK_WEIGHT * click_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn contact(age: Duration, opens: u64, clicks: u64) -> Contact {
        let mut c = Contact::new("c-1", "a@example.com", now() - age);
        c.open_count = opens;
        c.click_count = clicks;
        c
    }

    #[test]
    fn test_weighted_rates() {
        let score = engagement_score(&contact(Duration::days(10), 5, 2), now());
        assert!((score - (0.6 * 0.5 + 0.4 * 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_partial_days_floor() {
        // 2.9 days counts as 2.
        let score = engagement_score(&contact(Duration::hours(70), 2, 0), now());
        assert!((score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_new_and_future_contacts_use_one_day() {
        let fresh = engagement_score(&contact(Duration::hours(3), 1, 1), now());
        assert!((fresh - 1.0).abs() < 1e-12);

        let future = engagement_score(&contact(Duration::days(-4), 1, 0), now());
        assert!((future - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_no_activity_scores_zero() {
        assert_eq!(engagement_score(&contact(Duration::days(400), 0, 0), now()), 0.0);
    }
}
