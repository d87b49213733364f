//! Time window filtering of stargazers.

use chrono::{DateTime, Duration, Utc};

use crate::github::RawStargazer;

/// Keep only stargazers who starred at or after `cutoff`, preserving order.
///
/// Records without a `starred_at` timestamp are dropped: they cannot be
/// placed inside any window.
pub fn filter_since(records: Vec<RawStargazer>, cutoff: DateTime<Utc>) -> Vec<RawStargazer> {
    records
        .into_iter()
        .filter(|r| r.starred_at.is_some_and(|at| at >= cutoff))
        .collect()
}

/// Cutoff for a trailing window ending at `now`.
pub fn cutoff_for_window(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now - window
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::StargazerUser;

    fn star(login: &str, at: Option<DateTime<Utc>>) -> RawStargazer {
        RawStargazer {
            user: StargazerUser {
                login: login.to_string(),
                html_url: format!("https://github.com/{login}"),
            },
            starred_at: at,
        }
    }

    #[test]
    fn keeps_records_inside_trailing_day_in_order() {
        let t = Utc::now();
        let records = vec![
            star("two-days", Some(t - Duration::days(2))),
            star("twelve-hours", Some(t - Duration::hours(12))),
            star("thirty-minutes", Some(t - Duration::minutes(30))),
        ];

        let kept = filter_since(records, cutoff_for_window(t, Duration::days(1)));
        let logins: Vec<&str> = kept.iter().map(|r| r.login()).collect();
        assert_eq!(logins, vec!["twelve-hours", "thirty-minutes"]);
    }

    #[test]
    fn cutoff_is_inclusive() {
        let cutoff = Utc::now();
        let kept = filter_since(vec![star("edge", Some(cutoff))], cutoff);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn records_without_timestamp_are_dropped() {
        let t = Utc::now();
        let kept = filter_since(
            vec![star("unknown", None), star("recent", Some(t))],
            t - Duration::hours(1),
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].login(), "recent");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(filter_since(Vec::new(), Utc::now()).is_empty());
    }
}
