//! Derived metrics computed from raw GitHub data

use crate::types::{LanguageCount, LanguageShare, MaintenanceStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Classify maintenance activity from the last commit timestamp
pub fn maintenance_status(last_commit: &str) -> MaintenanceStatus {
    maintenance_status_at(last_commit, Utc::now())
}

/// Classify maintenance activity relative to an explicit point in time
pub fn maintenance_status_at(last_commit: &str, now: DateTime<Utc>) -> MaintenanceStatus {
    let commit_date = match DateTime::parse_from_rfc3339(last_commit) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => return MaintenanceStatus::Unknown,
    };

    let days_since = now.signed_duration_since(commit_date).num_days();

    if days_since < 30 {
        MaintenanceStatus::Active
    } else if days_since < 90 {
        MaintenanceStatus::RecentlyUpdated
    } else if days_since < 365 {
        MaintenanceStatus::Sporadic
    } else {
        MaintenanceStatus::Inactive
    }
}

/// Compute per-language percentages from byte counts.
///
/// Percentages are rounded to one decimal and always sum to at most 100.
/// When independent rounding overshoots, the entries rounded up the most
/// give back a tenth each. Entries at or below 1% after that adjustment are
/// dropped. The result is sorted by percentage, largest first, keeping the
/// input order for equal shares.
pub fn language_breakdown(languages: &[(String, u64)]) -> Vec<LanguageShare> {
    let total: u128 = languages.iter().map(|(_, bytes)| u128::from(*bytes)).sum();
    if total == 0 {
        return Vec::new();
    }

    // Shares in tenths of a percent, rounded half-up
    let mut tenths: Vec<u128> = languages
        .iter()
        .map(|(_, bytes)| (u128::from(*bytes) * 2_000 / total + 1) / 2)
        .collect();

    let mut excess = tenths.iter().sum::<u128>().saturating_sub(1_000);
    if excess > 0 {
        // Rounding error scaled by `total`; positive means rounded up
        let overshoot: Vec<i128> = languages
            .iter()
            .zip(&tenths)
            .map(|((_, bytes), t)| (t * total) as i128 - (u128::from(*bytes) * 1_000) as i128)
            .collect();
        let mut order: Vec<usize> = (0..languages.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(overshoot[i]));

        for i in order {
            if excess == 0 || overshoot[i] <= 0 {
                break;
            }
            tenths[i] -= 1;
            excess -= 1;
        }
    }

    let mut shares: Vec<(u128, &str)> = tenths
        .into_iter()
        .zip(languages)
        .filter(|(t, _)| *t > 10)
        .map(|(t, (name, _))| (t, name.as_str()))
        .collect();
    shares.sort_by_key(|(t, _)| std::cmp::Reverse(*t));

    shares
        .into_iter()
        .map(|(t, name)| LanguageShare {
            name: name.to_string(),
            percent: t as f64 / 10.0,
        })
        .collect()
}

/// Format a count for display: `950`, `1.5K`, `2.3M`
pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Rank primary languages by how many repositories use them, keeping `limit`
pub fn top_languages<'a>(
    languages: impl IntoIterator<Item = Option<&'a str>>,
    limit: usize,
) -> Vec<LanguageCount> {
    let mut counts: Vec<LanguageCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for language in languages.into_iter().flatten() {
        match index.get(language) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(language, counts.len());
                counts.push(LanguageCount {
                    name: language.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Truncate an ISO-8601 timestamp to its `YYYY-MM-DD` day
pub fn day_of(timestamp: &str) -> String {
    timestamp.get(..10).unwrap_or(timestamp).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn days_ago(now: DateTime<Utc>, days: i64) -> String {
        (now - Duration::days(days)).to_rfc3339()
    }

    #[test]
    fn test_maintenance_status_buckets() {
        let now = Utc::now();

        assert_eq!(maintenance_status_at(&days_ago(now, 10), now), MaintenanceStatus::Active);
        assert_eq!(
            maintenance_status_at(&days_ago(now, 45), now),
            MaintenanceStatus::RecentlyUpdated
        );
        assert_eq!(maintenance_status_at(&days_ago(now, 200), now), MaintenanceStatus::Sporadic);
        assert_eq!(maintenance_status_at(&days_ago(now, 400), now), MaintenanceStatus::Inactive);
    }

    #[test]
    fn test_maintenance_status_boundaries() {
        let now = Utc::now();

        assert_eq!(maintenance_status_at(&days_ago(now, 29), now), MaintenanceStatus::Active);
        assert_eq!(
            maintenance_status_at(&days_ago(now, 30), now),
            MaintenanceStatus::RecentlyUpdated
        );
        assert_eq!(maintenance_status_at(&days_ago(now, 90), now), MaintenanceStatus::Sporadic);
        assert_eq!(maintenance_status_at(&days_ago(now, 365), now), MaintenanceStatus::Inactive);
    }

    #[test]
    fn test_maintenance_status_github_format() {
        let now = DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            maintenance_status_at("2024-02-20T08:15:00Z", now),
            MaintenanceStatus::Active
        );
    }

    #[test]
    fn test_maintenance_status_unparseable() {
        assert_eq!(maintenance_status("not a date"), MaintenanceStatus::Unknown);
        assert_eq!(maintenance_status(""), MaintenanceStatus::Unknown);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(950), "950");
        assert_eq!(format_number(1500), "1.5K");
        assert_eq!(format_number(2_300_000), "2.3M");
    }

    #[test]
    fn test_language_breakdown() {
        let languages = vec![
            ("Python".to_string(), 2_000),
            ("Rust".to_string(), 7_500),
            ("Shell".to_string(), 50),
            ("C".to_string(), 450),
        ];

        let shares = language_breakdown(&languages);
        let names: Vec<&str> = shares.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["Rust", "Python", "C"]);
        assert_eq!(shares[0].percent, 75.0);
        assert_eq!(shares[1].percent, 20.0);
        assert_eq!(shares[2].percent, 4.5);

        let total: f64 = shares.iter().map(|s| s.percent).sum();
        assert!(total <= 100.0);
        assert!(shares.iter().all(|s| s.percent > 1.0));
        assert!(shares.windows(2).all(|w| w[0].percent >= w[1].percent));
    }

    #[test]
    fn test_language_breakdown_rounding_overshoot() {
        // 1.05 + 1.05 + 97.9 rounds to 100.1 when each share is rounded alone
        let languages = vec![
            ("A".to_string(), 105),
            ("B".to_string(), 105),
            ("C".to_string(), 9_790),
        ];

        let shares = language_breakdown(&languages);
        let names: Vec<&str> = shares.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["C", "B"]);
        assert_eq!(shares[0].percent, 97.9);
        assert_eq!(shares[1].percent, 1.1);

        let total: f64 = shares.iter().map(|s| s.percent).sum();
        assert!(total <= 100.0);
        assert!(shares.iter().all(|s| s.percent > 1.0));
    }

    #[test]
    fn test_language_breakdown_never_exceeds_hundred() {
        for a in (0..=10_000u64).step_by(35) {
            for b in (0..=10_000 - a).step_by(35) {
                let languages = vec![
                    ("A".to_string(), a),
                    ("B".to_string(), b),
                    ("C".to_string(), 10_000 - a - b),
                ];
                let shares = language_breakdown(&languages);

                let tenths: u64 = shares.iter().map(|s| (s.percent * 10.0).round() as u64).sum();
                assert!(tenths <= 1_000, "{:?} sums to {} tenths", languages, tenths);
                assert!(shares.iter().all(|s| s.percent > 1.0));
                assert!(shares.windows(2).all(|w| w[0].percent >= w[1].percent));
            }
        }
    }

    #[test]
    fn test_language_breakdown_keeps_order_on_ties() {
        let languages = vec![
            ("Go".to_string(), 500),
            ("Java".to_string(), 500),
        ];
        let shares = language_breakdown(&languages);
        assert_eq!(shares[0].name, "Go");
        assert_eq!(shares[1].name, "Java");
    }

    #[test]
    fn test_language_breakdown_empty() {
        assert!(language_breakdown(&[]).is_empty());
        assert!(language_breakdown(&[("Rust".to_string(), 0)]).is_empty());
    }

    #[test]
    fn test_top_languages() {
        let repos = vec![
            Some("Rust"),
            None,
            Some("Go"),
            Some("Rust"),
            Some("Python"),
            Some("Go"),
            Some("C"),
            Some("Zig"),
            Some("Rust"),
            Some("Haskell"),
        ];

        let top = top_languages(repos, 5);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0], LanguageCount { name: "Rust".to_string(), count: 3 });
        assert_eq!(top[1], LanguageCount { name: "Go".to_string(), count: 2 });
        // Single-repo languages keep first-appearance order
        assert_eq!(top[2].name, "Python");
        assert_eq!(top[3].name, "C");
        assert_eq!(top[4].name, "Zig");
    }

    #[test]
    fn test_day_of() {
        assert_eq!(day_of("2023-05-17T10:00:00Z"), "2023-05-17");
        assert_eq!(day_of("2023"), "2023");
    }
}
