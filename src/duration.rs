//! Elapsed-time statistics. All durations are expressed in hours; records
//! without a usable pair of timestamps contribute nothing to any average.

use chrono::{DateTime, Utc};

use crate::models::{
    CategoryDuration, IssueRecord, IssueStatus, LongestResolution, ResolutionStats,
};

pub(crate) fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Creation-to-verified-completion time. `None` unless the record is
/// resolved, carries a completion timestamp, and that timestamp does not
/// precede creation; a clock running backwards makes the record unresolved
/// for duration purposes, not an error.
pub fn resolution_hours(record: &IssueRecord) -> Option<f64> {
    if !record.is_resolved() {
        return None;
    }
    let completed = record.completed_at?;
    if completed < record.created_at {
        return None;
    }
    Some(hours_between(record.created_at, completed))
}

/// Creation-to-first-touch time, where first touch is the earliest history
/// transition into `first_touch`. Records that never saw that transition
/// are excluded rather than counted as zero.
pub fn response_hours(record: &IssueRecord, first_touch: IssueStatus) -> Option<f64> {
    let entry = record
        .sorted_history()
        .into_iter()
        .find(|entry| entry.status == first_touch)?;
    if entry.changed_at < record.created_at {
        return None;
    }
    Some(hours_between(record.created_at, entry.changed_at))
}

pub fn average_response_hours(records: &[IssueRecord], first_touch: IssueStatus) -> Option<f64> {
    let samples: Vec<f64> = records
        .iter()
        .filter_map(|record| response_hours(record, first_touch))
        .collect();
    mean(&samples)
}

/// Overall mean, the longest `longest_n` resolutions with their supporting
/// metadata, and per-category means sorted slowest first.
pub fn compute_resolution_stats(records: &[IssueRecord], longest_n: usize) -> ResolutionStats {
    let mut durations: Vec<f64> = Vec::new();
    let mut longest: Vec<LongestResolution> = Vec::new();

    for record in records {
        if let Some(hours) = resolution_hours(record) {
            durations.push(hours);
            longest.push(LongestResolution {
                issue_id: record.id,
                category: record.category_label().to_string(),
                location: record.location_label().to_string(),
                assigned_actor_id: record.assigned_actor_id,
                hours,
            });
        }
    }

    longest.sort_by(|a, b| b.hours.total_cmp(&a.hours));
    longest.truncate(longest_n);

    ResolutionStats {
        resolved: durations.len(),
        avg_hours: mean(&durations).unwrap_or(0.0),
        longest,
        by_category: category_durations(records),
    }
}

fn category_durations(records: &[IssueRecord]) -> Vec<CategoryDuration> {
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut groups: Vec<(String, usize, f64)> = Vec::new();

    for record in records {
        let Some(hours) = resolution_hours(record) else {
            continue;
        };
        let key = record.category_label().to_string();
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, 0, 0.0));
                groups.len() - 1
            }
        };
        groups[slot].1 += 1;
        groups[slot].2 += hours;
    }

    let mut results: Vec<CategoryDuration> = groups
        .into_iter()
        .map(|(category, resolved, sum)| CategoryDuration {
            category,
            resolved,
            avg_hours: sum / resolved as f64,
        })
        .collect();

    results.sort_by(|a, b| b.avg_hours.total_cmp(&a.avg_hours));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::testutil::{issue, resolved_issue, transition};

    #[test]
    fn resolution_hours_requires_verified_completion() {
        let mut record = issue("Electrical", IssueStatus::Completed, 5);
        record.completed_at = Some(record.created_at + Duration::hours(10));
        assert_eq!(resolution_hours(&record), None);

        let record = resolved_issue("Electrical", 5, 10);
        assert_eq!(resolution_hours(&record), Some(10.0));
    }

    #[test]
    fn backwards_timestamps_exclude_the_record() {
        let mut record = resolved_issue("Electrical", 5, 10);
        record.completed_at = Some(record.created_at - Duration::hours(1));
        assert_eq!(resolution_hours(&record), None);

        let stats = compute_resolution_stats(&[record], 5);
        assert_eq!(stats.resolved, 0);
        assert_eq!(stats.avg_hours, 0.0);
    }

    #[test]
    fn average_skips_unresolved_records_entirely() {
        let records = vec![
            resolved_issue("Electrical", 10, 12),
            resolved_issue("Electrical", 9, 36),
            issue("Electrical", IssueStatus::InProgress, 2),
        ];
        let stats = compute_resolution_stats(&records, 5);
        assert_eq!(stats.resolved, 2);
        assert!((stats.avg_hours - 24.0).abs() < 1e-9);
    }

    #[test]
    fn response_time_uses_first_matching_transition_after_sorting() {
        let mut record = issue("Electrical", IssueStatus::InProgress, 5);
        // history intentionally out of order
        record.status_history = vec![
            transition(&record, IssueStatus::Assigned, 20),
            transition(&record, IssueStatus::Assigned, 4),
            transition(&record, IssueStatus::InProgress, 30),
        ];
        assert_eq!(response_hours(&record, IssueStatus::Assigned), Some(4.0));
        assert_eq!(response_hours(&record, IssueStatus::InProgress), Some(30.0));
    }

    #[test]
    fn response_time_excludes_records_without_the_transition() {
        let record = issue("Electrical", IssueStatus::Pending, 5);
        assert_eq!(response_hours(&record, IssueStatus::Assigned), None);
        assert_eq!(average_response_hours(&[record], IssueStatus::Assigned), None);
    }

    #[test]
    fn longest_resolutions_come_back_slowest_first() {
        let records = vec![
            resolved_issue("Electrical", 20, 24),
            resolved_issue("Plumbing", 20, 120),
            resolved_issue("HVAC", 20, 72),
        ];
        let stats = compute_resolution_stats(&records, 2);
        assert_eq!(stats.longest.len(), 2);
        assert_eq!(stats.longest[0].category, "Plumbing");
        assert_eq!(stats.longest[0].hours, 120.0);
        assert_eq!(stats.longest[1].category, "HVAC");
    }

    #[test]
    fn per_category_averages_sort_slowest_first() {
        let records = vec![
            resolved_issue("Electrical", 20, 10),
            resolved_issue("Electrical", 20, 20),
            resolved_issue("Plumbing", 20, 100),
        ];
        let stats = compute_resolution_stats(&records, 5);
        assert_eq!(stats.by_category[0].category, "Plumbing");
        assert!((stats.by_category[0].avg_hours - 100.0).abs() < 1e-9);
        assert_eq!(stats.by_category[1].category, "Electrical");
        assert!((stats.by_category[1].avg_hours - 15.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_produces_zeroed_stats() {
        let stats = compute_resolution_stats(&[], 5);
        assert_eq!(stats.resolved, 0);
        assert_eq!(stats.avg_hours, 0.0);
        assert!(stats.longest.is_empty());
        assert!(stats.by_category.is_empty());
    }
}
