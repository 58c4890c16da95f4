//! Created-vs-resolved series over fixed time buckets. Daily buckets are
//! 24-hour windows anchored at the reference instant; weekly buckets are
//! ISO weeks starting Monday.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::duration::{mean, response_hours};
use crate::models::{IssueRecord, IssueStatus, TrendBucket, WeeklyResponseBucket};
use crate::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketUnit {
    Day,
    Week,
}

impl FromStr for BucketUnit {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "day" | "daily" => Ok(BucketUnit::Day),
            "week" | "weekly" => Ok(BucketUnit::Week),
            other => Err(EngineError::UnknownBucketUnit(other.to_string())),
        }
    }
}

/// A record counts as `created` in the bucket holding its creation instant
/// and as `resolved` in the bucket holding its verified completion; the two
/// are independent and routinely land in different buckets.
pub fn build_trend(
    records: &[IssueRecord],
    window_days: i64,
    unit: BucketUnit,
    now: DateTime<Utc>,
) -> Result<Vec<TrendBucket>, EngineError> {
    if window_days <= 0 {
        return Err(EngineError::InvalidWindow(window_days));
    }
    Ok(match unit {
        BucketUnit::Day => daily_buckets(records, window_days, now),
        BucketUnit::Week => weekly_buckets(records, window_days, now),
    })
}

fn daily_buckets(records: &[IssueRecord], window_days: i64, now: DateTime<Utc>) -> Vec<TrendBucket> {
    let window_start = now - Duration::hours(24 * window_days);
    let mut buckets: Vec<TrendBucket> = (0..window_days)
        .map(|i| {
            let start = window_start + Duration::hours(24 * i);
            TrendBucket {
                label: start.date_naive().to_string(),
                start,
                created: 0,
                resolved: 0,
            }
        })
        .collect();

    let slot_of = |instant: DateTime<Utc>| -> Option<usize> {
        if instant < window_start || instant >= now {
            return None;
        }
        Some(((instant - window_start).num_seconds() / 86_400) as usize)
    };

    for record in records {
        if let Some(slot) = slot_of(record.created_at) {
            buckets[slot].created += 1;
        }
        if record.is_resolved() {
            if let Some(slot) = record.completed_at.and_then(|completed| slot_of(completed)) {
                buckets[slot].resolved += 1;
            }
        }
    }

    buckets
}

fn weekly_buckets(records: &[IssueRecord], window_days: i64, now: DateTime<Utc>) -> Vec<TrendBucket> {
    let window_start = now - Duration::days(window_days);
    let first_monday = monday_of(window_start.date_naive());

    let mut week_starts = Vec::new();
    let mut monday = first_monday;
    while monday <= now.date_naive() {
        week_starts.push(monday);
        monday = monday + Duration::days(7);
    }

    let mut buckets: Vec<TrendBucket> = week_starts
        .iter()
        .map(|monday| TrendBucket {
            label: week_label(*monday),
            start: monday.and_time(NaiveTime::MIN).and_utc(),
            created: 0,
            resolved: 0,
        })
        .collect();

    let total = buckets.len();
    let slot_of = |instant: DateTime<Utc>| -> Option<usize> {
        let offset = (instant.date_naive() - first_monday).num_days();
        if offset < 0 {
            return None;
        }
        let slot = (offset / 7) as usize;
        (slot < total).then_some(slot)
    };

    for record in records {
        if let Some(slot) = slot_of(record.created_at) {
            buckets[slot].created += 1;
        }
        if record.is_resolved() {
            if let Some(slot) = record.completed_at.and_then(|completed| slot_of(completed)) {
                buckets[slot].resolved += 1;
            }
        }
    }

    buckets
}

/// Mean first-response hours per ISO week. Weeks with no samples are
/// omitted, not zero-filled.
pub fn weekly_response_trend(
    records: &[IssueRecord],
    window_days: i64,
    now: DateTime<Utc>,
    first_touch: IssueStatus,
) -> Result<Vec<WeeklyResponseBucket>, EngineError> {
    if window_days <= 0 {
        return Err(EngineError::InvalidWindow(window_days));
    }
    let cutoff = now - Duration::days(window_days);

    let mut by_week: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for record in records {
        if record.created_at < cutoff {
            continue;
        }
        if let Some(hours) = response_hours(record, first_touch) {
            let week = record.created_at.iso_week();
            by_week
                .entry((week.year(), week.week()))
                .or_default()
                .push(hours);
        }
    }

    Ok(by_week
        .into_iter()
        .filter_map(|((year, week), samples)| {
            mean(&samples).map(|avg| WeeklyResponseBucket {
                week: format!("{year}-W{week:02}"),
                avg_response_hours: avg,
                samples: samples.len(),
            })
        })
        .collect())
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_label(monday: NaiveDate) -> String {
    let week = monday.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusChange;
    use crate::testutil::{issue, reference_now, resolved_issue};

    #[test]
    fn daily_window_yields_exactly_d_contiguous_buckets() {
        let buckets = build_trend(&[], 7, BucketUnit::Day, reference_now()).unwrap();
        assert_eq!(buckets.len(), 7);
        for pair in buckets.windows(2) {
            assert_eq!(pair[1].start - pair[0].start, Duration::hours(24));
        }
        assert_eq!(
            buckets.last().map(|b| b.start + Duration::hours(24)),
            Some(reference_now())
        );
    }

    #[test]
    fn creation_and_resolution_fall_into_their_own_buckets() {
        // created five days back, resolved two days later
        let record = resolved_issue("Electrical", 5, 48);
        let buckets = build_trend(&[record], 7, BucketUnit::Day, reference_now()).unwrap();

        assert_eq!(buckets[2].created, 1);
        assert_eq!(buckets[2].resolved, 0);
        assert_eq!(buckets[4].created, 0);
        assert_eq!(buckets[4].resolved, 1);
    }

    #[test]
    fn unresolved_records_only_count_as_created() {
        let record = issue("Electrical", IssueStatus::InProgress, 3);
        let buckets = build_trend(&[record], 7, BucketUnit::Day, reference_now()).unwrap();
        let created: usize = buckets.iter().map(|b| b.created).sum();
        let resolved: usize = buckets.iter().map(|b| b.resolved).sum();
        assert_eq!(created, 1);
        assert_eq!(resolved, 0);
    }

    #[test]
    fn records_outside_the_window_are_ignored() {
        let record = issue("Electrical", IssueStatus::Pending, 40);
        let buckets = build_trend(&[record], 7, BucketUnit::Day, reference_now()).unwrap();
        assert!(buckets.iter().all(|b| b.created == 0));
    }

    #[test]
    fn weekly_buckets_cover_the_window_oldest_first() {
        let buckets = build_trend(&[], 30, BucketUnit::Week, reference_now()).unwrap();
        assert!(buckets.len() >= 5);
        for pair in buckets.windows(2) {
            assert_eq!(pair[1].start - pair[0].start, Duration::days(7));
        }
        assert!(buckets[0].label.starts_with("2026-W"));
    }

    #[test]
    fn weekly_counts_group_by_iso_week() {
        let records = vec![
            issue("Electrical", IssueStatus::Pending, 2),
            issue("Electrical", IssueStatus::Pending, 2),
            issue("Electrical", IssueStatus::Pending, 16),
        ];
        let buckets = build_trend(&records, 30, BucketUnit::Week, reference_now()).unwrap();
        let created: Vec<usize> = buckets.iter().map(|b| b.created).collect();
        assert_eq!(created.iter().sum::<usize>(), 3);
        assert_eq!(buckets.last().map(|b| b.created), Some(2));
    }

    #[test]
    fn response_weeks_without_samples_are_omitted() {
        let mut touched = issue("Electrical", IssueStatus::InProgress, 20);
        touched.status_history = vec![StatusChange {
            status: IssueStatus::Assigned,
            changed_at: touched.created_at + Duration::hours(8),
        }];
        let untouched = issue("Electrical", IssueStatus::Pending, 2);

        let weeks =
            weekly_response_trend(&[touched, untouched], 30, reference_now(), IssueStatus::Assigned)
                .unwrap();
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].avg_response_hours, 8.0);
        assert_eq!(weeks[0].samples, 1);
    }

    #[test]
    fn invalid_configuration_is_a_hard_error() {
        assert!(matches!(
            build_trend(&[], 0, BucketUnit::Day, reference_now()),
            Err(EngineError::InvalidWindow(0))
        ));
        assert!(matches!(
            "fortnight".parse::<BucketUnit>(),
            Err(EngineError::UnknownBucketUnit(_))
        ));
        assert_eq!("week".parse::<BucketUnit>(), Ok(BucketUnit::Week));
    }
}
