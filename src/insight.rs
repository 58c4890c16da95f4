//! Rule-based findings over the aggregate outputs. Rules are independent,
//! fire in declaration order, and never suppress one another; a rule with
//! nothing to say emits nothing.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::models::{
    AggregationResult, Insight, PerformanceProfile, ResolutionStats, Severity, Tier,
};

/// Thresholds for every rule, gathered here rather than buried inline.
#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// Share of all issues the top category must exceed before it counts
    /// as dominating.
    pub volume_share: f64,
    /// Dominating categories above this absolute count escalate to high.
    pub volume_high_count: usize,
    pub slow_days: f64,
    pub very_slow_days: f64,
    /// More poor-tier actors than this escalates to high.
    pub poor_high_count: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        InsightConfig {
            volume_share: 0.30,
            volume_high_count: 10,
            slow_days: 5.0,
            very_slow_days: 10.0,
            poor_high_count: 2,
        }
    }
}

/// `categories` must be the full, untruncated category grouping so the
/// volume rule can see the real total.
pub fn generate_insights(
    categories: &[AggregationResult],
    stats: &ResolutionStats,
    profiles: &BTreeMap<Uuid, PerformanceProfile>,
    config: &InsightConfig,
) -> Vec<Insight> {
    let mut insights = Vec::new();
    if let Some(insight) = high_volume_category(categories, config) {
        insights.push(insight);
    }
    if let Some(insight) = slow_resolution(stats, config) {
        insights.push(insight);
    }
    if let Some(insight) = underperformance(profiles, config) {
        insights.push(insight);
    }
    if let Some(insight) = excellence(profiles) {
        insights.push(insight);
    }
    insights
}

fn high_volume_category(
    categories: &[AggregationResult],
    config: &InsightConfig,
) -> Option<Insight> {
    let top = categories.first()?;
    let total: usize = categories.iter().map(|c| c.count).sum();
    if total == 0 {
        return None;
    }
    let share = top.count as f64 / total as f64;
    if share <= config.volume_share {
        return None;
    }

    let severity = if top.count > config.volume_high_count {
        Severity::High
    } else {
        Severity::Medium
    };
    Some(Insight {
        kind: "category_volume".to_string(),
        title: format!("{} dominates new blockers", top.key),
        description: format!(
            "{} accounts for {} of {} issues ({:.0}%) in this window.",
            top.key,
            top.count,
            total,
            share * 100.0
        ),
        recommendation: format!(
            "Walk the affected areas with the {} trade lead and agree on a prevention checklist.",
            top.key
        ),
        severity,
    })
}

fn slow_resolution(stats: &ResolutionStats, config: &InsightConfig) -> Option<Insight> {
    // by_category arrives slowest first
    let slowest = stats.by_category.first()?;
    let days = slowest.avg_hours / 24.0;
    if days <= config.slow_days {
        return None;
    }

    let severity = if days > config.very_slow_days {
        Severity::High
    } else {
        Severity::Medium
    };
    Some(Insight {
        kind: "slow_resolution".to_string(),
        title: format!("Slow resolutions in {}", slowest.category),
        description: format!(
            "{} blockers take {:.1} days on average to reach verified completion.",
            slowest.category, days
        ),
        recommendation: format!(
            "Review long-running {} issues for missing materials, access constraints, or pending sign-offs.",
            slowest.category
        ),
        severity,
    })
}

fn underperformance(
    profiles: &BTreeMap<Uuid, PerformanceProfile>,
    config: &InsightConfig,
) -> Option<Insight> {
    let poor = profiles
        .values()
        .filter(|p| p.tier == Some(Tier::Poor))
        .count();
    if poor == 0 {
        return None;
    }

    let severity = if poor > config.poor_high_count {
        Severity::High
    } else {
        Severity::Medium
    };
    Some(Insight {
        kind: "underperformance".to_string(),
        title: "Assignees falling behind".to_string(),
        description: format!(
            "{} of {} scored assignees are below the expected resolution pace.",
            poor,
            profiles.values().filter(|p| p.tier.is_some()).count()
        ),
        recommendation:
            "Pair the lowest scorers with a supervisor and rebalance their open assignments."
                .to_string(),
        severity,
    })
}

fn excellence(profiles: &BTreeMap<Uuid, PerformanceProfile>) -> Option<Insight> {
    let excellent = profiles
        .values()
        .filter(|p| p.tier == Some(Tier::Excellent))
        .count();
    if excellent == 0 {
        return None;
    }

    Some(Insight {
        kind: "excellence".to_string(),
        title: "Top-tier resolution performance".to_string(),
        description: format!(
            "{excellent} assignees are resolving blockers at the highest tier."
        ),
        recommendation:
            "Recognize the top performers and have them share their turnaround workflow."
                .to_string(),
        severity: Severity::Positive,
    })
}
