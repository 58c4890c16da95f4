use std::collections::HashMap;

use crate::duration::resolution_hours;
use crate::models::{AggregationResult, IssueRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Category,
    Location,
    Actor,
}

impl GroupField {
    /// Grouping key for a record. Missing categories and locations collapse
    /// onto their documented fallback labels; unassigned records have no
    /// actor key and drop out of actor groupings.
    fn key_of(&self, record: &IssueRecord) -> Option<String> {
        match self {
            GroupField::Category => Some(record.category_label().to_string()),
            GroupField::Location => Some(record.location_label().to_string()),
            GroupField::Actor => record.assigned_actor_id.map(|id| id.to_string()),
        }
    }
}

/// Group records by an arbitrary key, descending by count. Ties keep the
/// order in which keys first appeared in the input; map iteration order is
/// never allowed to leak into the result.
pub fn group_records<F>(records: &[IssueRecord], key_fn: F) -> Vec<AggregationResult>
where
    F: Fn(&IssueRecord) -> Option<String>,
{
    struct Accum {
        key: String,
        count: usize,
        resolved: usize,
        duration_sum: f64,
        duration_samples: usize,
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Accum> = Vec::new();

    for record in records {
        let Some(key) = key_fn(record) else { continue };
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Accum {
                    key,
                    count: 0,
                    resolved: 0,
                    duration_sum: 0.0,
                    duration_samples: 0,
                });
                groups.len() - 1
            }
        };

        let entry = &mut groups[slot];
        entry.count += 1;
        if record.is_resolved() {
            entry.resolved += 1;
        }
        if let Some(hours) = resolution_hours(record) {
            entry.duration_sum += hours;
            entry.duration_samples += 1;
        }
    }

    let mut results: Vec<AggregationResult> = groups
        .into_iter()
        .map(|group| AggregationResult {
            resolution_rate: resolution_rate(group.resolved, group.count),
            avg_resolution_hours: if group.duration_samples == 0 {
                0.0
            } else {
                group.duration_sum / group.duration_samples as f64
            },
            key: group.key,
            count: group.count,
            resolved_count: group.resolved,
        })
        .collect();

    // sort_by is stable, so equal counts preserve first-seen order
    results.sort_by(|a, b| b.count.cmp(&a.count));
    results
}

pub fn aggregate_by_field(
    records: &[IssueRecord],
    field: GroupField,
    top_n: usize,
) -> Vec<AggregationResult> {
    let mut results = group_records(records, |record| field.key_of(record));
    results.truncate(top_n);
    results
}

/// Keeps only groups seen at least `min_count` times. A threshold of 2 finds
/// repeat offenders, 3 the genuine problem areas.
pub fn repeat_groups(
    records: &[IssueRecord],
    field: GroupField,
    min_count: usize,
) -> Vec<AggregationResult> {
    group_records(records, |record| field.key_of(record))
        .into_iter()
        .filter(|group| group.count >= min_count)
        .collect()
}

fn resolution_rate(resolved: usize, count: usize) -> u32 {
    if count == 0 {
        0
    } else {
        (resolved as f64 / count as f64 * 100.0).round() as u32
    }
}
