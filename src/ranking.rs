//! Leaderboard ordering, percentile bands and achievement badges.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::models::{Achievement, PercentileBand, PerformanceProfile, RankedActor, Tier};

pub const MAX_BADGES: usize = 6;

/// Actors ordered by completion rate, then resolved count, then display
/// name. The name tie-break makes two runs over identical input return
/// identical order, whatever the map iteration happened to be.
pub fn rank_actors(profiles: &BTreeMap<Uuid, PerformanceProfile>) -> Vec<RankedActor> {
    let mut eligible: Vec<&PerformanceProfile> =
        profiles.values().filter(|p| p.assigned > 0).collect();

    eligible.sort_by(|a, b| {
        b.completion_rate
            .total_cmp(&a.completion_rate)
            .then_with(|| b.resolved.cmp(&a.resolved))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    let total = eligible.len();
    let top10_cutoff = percentile_cutoff(total, 0.10);
    let top25_cutoff = percentile_cutoff(total, 0.25);

    eligible
        .into_iter()
        .enumerate()
        .map(|(index, profile)| {
            let rank = index + 1;
            let percentile = if rank <= top10_cutoff {
                PercentileBand::Top10
            } else if rank <= top25_cutoff {
                PercentileBand::Top25
            } else {
                PercentileBand::Other
            };
            RankedActor {
                rank,
                actor_id: profile.actor_id,
                display_name: profile.display_name.clone(),
                completion_rate: profile.completion_rate,
                resolved: profile.resolved,
                quality_score: profile.quality_score,
                tier: profile.tier.unwrap_or(Tier::Poor),
                percentile,
                badges: achievements_for(profile, rank),
            }
        })
        .collect()
}

fn percentile_cutoff(total: usize, fraction: f64) -> usize {
    (total as f64 * fraction).ceil() as usize
}

/// Fixed rule list, declaration order, at most one badge per rule and at
/// most `MAX_BADGES` in total.
pub fn achievements_for(profile: &PerformanceProfile, rank: usize) -> Vec<Achievement> {
    let mut badges = Vec::new();

    if profile.completion_rate >= 95.0 {
        badges.push(Achievement::ReliableFinisher);
    }
    if profile.avg_resolution_hours.is_some_and(|h| h <= 4.0) {
        badges.push(Achievement::RapidResolver);
    }
    if profile.quality_score >= 90 {
        badges.push(Achievement::QualityLeader);
    }
    if rank == 1 {
        badges.push(Achievement::TopPerformer);
    }
    if profile.resolved >= 100 {
        badges.push(Achievement::CenturyClub);
    }
    if profile.rejected == 0 && profile.assigned >= 10 {
        badges.push(Achievement::CleanRecord);
    }
    if profile.assigned >= 5 && profile.documented == profile.assigned {
        badges.push(Achievement::FullyDocumented);
    }

    badges.truncate(MAX_BADGES);
    badges
}
