use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::compare::{compare_subpopulation, DEFAULT_COMPARISON};
use crate::duration::compute_resolution_stats;
use crate::frequency::{aggregate_by_field, repeat_groups, GroupField};
use crate::insight::{generate_insights, InsightConfig};
use crate::models::{Actor, IssueRecord};
use crate::performance::{compute_profiles, ScorerConfig};
use crate::ranking::rank_actors;
use crate::trend::{build_trend, BucketUnit};
use crate::EngineError;

const REPORT_TOP_CATEGORIES: usize = 8;
const REPORT_LONGEST: usize = 5;
const REPORT_LEADERBOARD: usize = 10;
const PROBLEM_AREA_THRESHOLD: usize = 3;

/// Render the full analytics pipeline as a markdown report. `records` are
/// expected to be pre-filtered to the window; when `population` carries the
/// unscoped record set, the report compares the scoped records against it.
pub fn build_report(
    scope: Option<&str>,
    window_days: i64,
    cutoff: DateTime<Utc>,
    records: &[IssueRecord],
    population: Option<&[IssueRecord]>,
    actors: &[Actor],
    now: DateTime<Utc>,
) -> Result<String, EngineError> {
    let scorer = ScorerConfig::default();
    let categories = aggregate_by_field(records, GroupField::Category, usize::MAX);
    let locations = repeat_groups(records, GroupField::Location, PROBLEM_AREA_THRESHOLD);
    let stats = compute_resolution_stats(records, REPORT_LONGEST);
    let profiles = compute_profiles(records, actors, &scorer);
    let leaderboard = rank_actors(&profiles);
    let weekly = build_trend(records, window_days, BucketUnit::Week, now)?;
    let insights = generate_insights(&categories, &stats, &profiles, &InsightConfig::default());

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all projects");

    let _ = writeln!(output, "# Site Blocker Report");
    let _ = writeln!(
        output,
        "Generated for {} (issues since {})",
        scope_label,
        cutoff.date_naive()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Issue Mix");

    if categories.is_empty() {
        let _ = writeln!(output, "No issues recorded for this window.");
    } else {
        for category in categories.iter().take(REPORT_TOP_CATEGORIES) {
            let _ = writeln!(
                output,
                "- {}: {} issues ({}% resolved)",
                category.key, category.count, category.resolution_rate
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Problem Locations");

    if locations.is_empty() {
        let _ = writeln!(output, "No recurring problem locations in this window.");
    } else {
        for location in locations.iter() {
            let _ = writeln!(
                output,
                "- {}: {} recurring issues",
                location.key, location.count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Resolution Performance");

    if stats.resolved == 0 {
        let _ = writeln!(output, "No issues reached verified completion in this window.");
    } else {
        let _ = writeln!(
            output,
            "Average resolution time: {:.1} hours across {} resolved issues.",
            stats.avg_hours, stats.resolved
        );
        for entry in stats.longest.iter() {
            let _ = writeln!(
                output,
                "- {} at {}: {:.1} days to close",
                entry.category,
                entry.location,
                entry.hours / 24.0
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Assignee Leaderboard");

    if leaderboard.is_empty() {
        let _ = writeln!(output, "No assignees with work in this window.");
    } else {
        for ranked in leaderboard.iter().take(REPORT_LEADERBOARD) {
            let badges = if ranked.badges.is_empty() {
                String::new()
            } else {
                let labels: Vec<&str> = ranked.badges.iter().map(|b| b.label()).collect();
                format!(" ({})", labels.join(", "))
            };
            let _ = writeln!(
                output,
                "- #{} {} [{}]: {:.0}% completion, {} resolved, quality {}{}",
                ranked.rank,
                ranked.display_name,
                ranked.tier.as_str(),
                ranked.completion_rate,
                ranked.resolved,
                ranked.quality_score,
                badges
            );
        }
    }

    if let Some(full) = population {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Against All Projects");
        for metric in compare_subpopulation(records, full, &DEFAULT_COMPARISON) {
            let _ = writeln!(
                output,
                "- {}: {:.1} {} vs {:.1} {} overall ({})",
                metric.metric,
                metric.sub_value,
                metric.unit,
                metric.population_value,
                metric.unit,
                metric.direction.as_str()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Activity");

    if records.is_empty() {
        let _ = writeln!(output, "No activity recorded for this window.");
    } else {
        for bucket in weekly.iter() {
            let _ = writeln!(
                output,
                "- {}: {} created / {} resolved",
                bucket.label, bucket.created, bucket.resolved
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Insights");

    if insights.is_empty() {
        let _ = writeln!(output, "Nothing notable in this window.");
    } else {
        for insight in insights.iter() {
            let _ = writeln!(
                output,
                "- [{}] {}: {} {}",
                insight.severity.as_str(),
                insight.title,
                insight.description,
                insight.recommendation
            );
        }
    }

    Ok(output)
}
