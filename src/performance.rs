//! Composite quality scoring and tier classification per actor.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::duration::{mean, resolution_hours, response_hours};
use crate::models::{Actor, IssueRecord, IssueStatus, PerformanceProfile, Tier};

/// Every threshold the scorer applies, in one overridable place. Weights
/// blend completion, documentation and conduct into the 0-100 quality
/// score; tier bounds pair a minimum completion rate with a maximum mean
/// resolution time in days.
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    pub completion_weight: f64,
    pub documentation_weight: f64,
    pub conduct_weight: f64,
    pub rejection_penalty_factor: f64,
    pub excellent_min_rate: f64,
    pub excellent_max_days: f64,
    pub good_min_rate: f64,
    pub good_max_days: f64,
    pub average_min_rate: f64,
    pub average_max_days: f64,
    pub first_touch: IssueStatus,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig {
            completion_weight: 0.5,
            documentation_weight: 0.3,
            conduct_weight: 0.2,
            rejection_penalty_factor: 30.0,
            excellent_min_rate: 90.0,
            excellent_max_days: 3.0,
            good_min_rate: 75.0,
            good_max_days: 5.0,
            average_min_rate: 50.0,
            average_max_days: 8.0,
            first_touch: IssueStatus::Assigned,
        }
    }
}

/// One profile per roster actor, keyed by actor id. Records assigned to ids
/// missing from the roster have no name to report under and are skipped.
pub fn compute_profiles(
    records: &[IssueRecord],
    actors: &[Actor],
    config: &ScorerConfig,
) -> BTreeMap<Uuid, PerformanceProfile> {
    let mut by_actor: HashMap<Uuid, Vec<&IssueRecord>> = HashMap::new();
    for record in records {
        if let Some(actor_id) = record.assigned_actor_id {
            by_actor.entry(actor_id).or_default().push(record);
        }
    }

    let mut profiles = BTreeMap::new();
    for actor in actors {
        let assigned: &[&IssueRecord] = by_actor
            .get(&actor.id)
            .map(|records| records.as_slice())
            .unwrap_or(&[]);
        profiles.insert(actor.id, profile_for(actor, assigned, config));
    }
    profiles
}

fn profile_for(actor: &Actor, records: &[&IssueRecord], config: &ScorerConfig) -> PerformanceProfile {
    let assigned = records.len();
    let resolved = records.iter().filter(|r| r.is_resolved()).count();
    let rejected = records
        .iter()
        .filter(|r| r.status == IssueStatus::Rejected)
        .count();
    let documented = records.iter().filter(|r| r.has_documentation).count();

    let completion_rate = if assigned == 0 {
        0.0
    } else {
        resolved as f64 / assigned as f64 * 100.0
    };
    // nothing assigned means nothing left undocumented
    let documentation_rate = if assigned == 0 {
        100.0
    } else {
        documented as f64 / assigned as f64 * 100.0
    };
    let rejection_penalty = if assigned == 0 {
        0.0
    } else {
        rejected as f64 / assigned as f64 * config.rejection_penalty_factor
    };

    let raw_score = completion_rate * config.completion_weight
        + documentation_rate * config.documentation_weight
        + (100.0 - rejection_penalty) * config.conduct_weight;
    let quality_score = raw_score.round().clamp(0.0, 100.0) as u32;

    let resolution_samples: Vec<f64> = records
        .iter()
        .filter_map(|record| resolution_hours(record))
        .collect();
    let response_samples: Vec<f64> = records
        .iter()
        .filter_map(|record| response_hours(record, config.first_touch))
        .collect();
    let avg_resolution_hours = mean(&resolution_samples);
    let avg_response_hours = mean(&response_samples);

    let tier = if assigned == 0 {
        None
    } else {
        Some(classify_tier(completion_rate, avg_resolution_hours, config))
    };

    PerformanceProfile {
        actor_id: actor.id,
        display_name: actor.display_name.clone(),
        assigned,
        resolved,
        rejected,
        documented,
        completion_rate,
        documentation_rate,
        rejection_penalty,
        quality_score,
        avg_response_hours,
        avg_resolution_hours,
        tier,
    }
}

/// Top-down classification, first match wins. An actor with no resolved
/// work has no mean resolution time and cannot satisfy any speed bound.
pub fn classify_tier(
    completion_rate: f64,
    avg_resolution_hours: Option<f64>,
    config: &ScorerConfig,
) -> Tier {
    let days = avg_resolution_hours.map(|hours| hours / 24.0);
    let within = |limit: f64| days.is_some_and(|d| d <= limit);

    if completion_rate >= config.excellent_min_rate && within(config.excellent_max_days) {
        Tier::Excellent
    } else if completion_rate >= config.good_min_rate && within(config.good_max_days) {
        Tier::Good
    } else if completion_rate >= config.average_min_rate && within(config.average_max_days) {
        Tier::Average
    } else {
        Tier::Poor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::testutil::{actor, issue, resolved_issue};

    fn assign(records: &mut [IssueRecord], actor: &Actor) {
        for record in records {
            record.assigned_actor_id = Some(actor.id);
        }
    }

    #[test]
    fn composite_score_matches_weighted_blend() {
        let worker = actor("Avery Cole");
        let mut records: Vec<IssueRecord> = Vec::new();
        for _ in 0..9 {
            let mut record = resolved_issue("Electrical", 10, 24);
            record.has_documentation = true;
            records.push(record);
        }
        let mut open = issue("Electrical", IssueStatus::InProgress, 2);
        open.has_documentation = true;
        records.push(open);
        assign(&mut records, &worker);

        let profiles = compute_profiles(&records, &[worker.clone()], &ScorerConfig::default());
        let profile = &profiles[&worker.id];

        assert_eq!(profile.assigned, 10);
        assert_eq!(profile.resolved, 9);
        assert!((profile.completion_rate - 90.0).abs() < 1e-9);
        assert!((profile.documentation_rate - 100.0).abs() < 1e-9);
        assert_eq!(profile.rejection_penalty, 0.0);
        // round(90*0.5 + 100*0.3 + 100*0.2)
        assert_eq!(profile.quality_score, 95);
        // resolved in a day each, comfortably inside the excellent bound
        assert_eq!(profile.tier, Some(Tier::Excellent));
    }

    #[test]
    fn slow_resolutions_drop_the_tier_not_the_score() {
        let worker = actor("Avery Cole");
        let mut records: Vec<IssueRecord> = Vec::new();
        for _ in 0..9 {
            let mut record = resolved_issue("Electrical", 30, 96);
            record.has_documentation = true;
            records.push(record);
        }
        let mut open = issue("Electrical", IssueStatus::InProgress, 2);
        open.has_documentation = true;
        records.push(open);
        assign(&mut records, &worker);

        let profiles = compute_profiles(&records, &[worker.clone()], &ScorerConfig::default());
        let profile = &profiles[&worker.id];
        assert_eq!(profile.quality_score, 95);
        // four-day average misses excellent but lands inside good
        assert_eq!(profile.tier, Some(Tier::Good));
    }

    #[test]
    fn zero_assigned_actor_is_absent_not_poor() {
        let worker = actor("Idle Hand");
        let profiles = compute_profiles(&[], &[worker.clone()], &ScorerConfig::default());
        let profile = &profiles[&worker.id];

        assert_eq!(profile.assigned, 0);
        assert_eq!(profile.completion_rate, 0.0);
        assert_eq!(profile.documentation_rate, 100.0);
        assert_eq!(profile.rejection_penalty, 0.0);
        assert_eq!(profile.tier, None);
    }

    #[test]
    fn quality_score_stays_in_range_under_full_rejection() {
        let worker = actor("Rough Patch");
        let mut records: Vec<IssueRecord> = (0..10)
            .map(|_| issue("Electrical", IssueStatus::Rejected, 5))
            .collect();
        assign(&mut records, &worker);

        let profiles = compute_profiles(&records, &[worker.clone()], &ScorerConfig::default());
        let profile = &profiles[&worker.id];

        assert_eq!(profile.completion_rate, 0.0);
        assert!((profile.rejection_penalty - 30.0).abs() < 1e-9);
        // round(0*0.5 + 0*0.3 + 70*0.2)
        assert_eq!(profile.quality_score, 14);
        assert_eq!(profile.tier, Some(Tier::Poor));
    }

    #[test]
    fn unresolved_work_cannot_reach_a_speed_gated_tier() {
        let worker = actor("Backlog Owner");
        let mut records: Vec<IssueRecord> = (0..4)
            .map(|_| issue("Electrical", IssueStatus::InProgress, 5))
            .collect();
        assign(&mut records, &worker);

        let profiles = compute_profiles(&records, &[worker.clone()], &ScorerConfig::default());
        assert_eq!(profiles[&worker.id].tier, Some(Tier::Poor));
    }

    #[test]
    fn response_average_comes_from_history_transitions() {
        let worker = actor("Prompt Responder");
        let mut record = resolved_issue("Electrical", 10, 48);
        record.status_history = vec![crate::models::StatusChange {
            status: IssueStatus::Assigned,
            changed_at: record.created_at + Duration::hours(6),
        }];
        let mut records = vec![record];
        assign(&mut records, &worker);

        let profiles = compute_profiles(&records, &[worker.clone()], &ScorerConfig::default());
        assert_eq!(profiles[&worker.id].avg_response_hours, Some(6.0));
    }

    #[test]
    fn records_for_unknown_actors_are_skipped() {
        let worker = actor("On Roster");
        let mut stray = issue("Electrical", IssueStatus::Pending, 1);
        stray.assigned_actor_id = Some(Uuid::new_v4());

        let profiles = compute_profiles(&[stray], &[worker.clone()], &ScorerConfig::default());
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[&worker.id].assigned, 0);
    }
}
