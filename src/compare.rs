//! Sub-population metrics against the full population, with a per-metric
//! direction. Which way is "better" is declared on the metric itself, never
//! inferred from the numbers.

use crate::duration::{mean, resolution_hours};
use crate::models::{ComparativeMetric, Direction, IssueRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    CompletionRate,
    AvgResolutionHours,
    TotalResolved,
}

pub const DEFAULT_COMPARISON: [MetricKind; 3] = [
    MetricKind::CompletionRate,
    MetricKind::AvgResolutionHours,
    MetricKind::TotalResolved,
];

impl MetricKind {
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::CompletionRate => "completion_rate",
            MetricKind::AvgResolutionHours => "avg_resolution_hours",
            MetricKind::TotalResolved => "total_resolved",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::CompletionRate => "%",
            MetricKind::AvgResolutionHours => "hours",
            MetricKind::TotalResolved => "issues",
        }
    }

    /// Declared polarity: durations improve downward, everything else up.
    pub fn higher_is_better(&self) -> bool {
        !matches!(self, MetricKind::AvgResolutionHours)
    }

    fn value_of(&self, records: &[IssueRecord]) -> f64 {
        let resolved = records.iter().filter(|r| r.is_resolved()).count();
        match self {
            MetricKind::CompletionRate => {
                if records.is_empty() {
                    0.0
                } else {
                    resolved as f64 / records.len() as f64 * 100.0
                }
            }
            MetricKind::AvgResolutionHours => {
                let samples: Vec<f64> =
                    records.iter().filter_map(resolution_hours).collect();
                mean(&samples).unwrap_or(0.0)
            }
            MetricKind::TotalResolved => resolved as f64,
        }
    }
}

pub fn compare_subpopulation(
    sub: &[IssueRecord],
    all: &[IssueRecord],
    metrics: &[MetricKind],
) -> Vec<ComparativeMetric> {
    metrics
        .iter()
        .map(|metric| {
            let sub_value = metric.value_of(sub);
            let population_value = metric.value_of(all);
            let direction = if sub_value == population_value {
                Direction::Even
            } else if (sub_value > population_value) == metric.higher_is_better() {
                Direction::Improving
            } else {
                Direction::Lagging
            };
            ComparativeMetric {
                metric: metric.name().to_string(),
                sub_value,
                population_value,
                unit: metric.unit(),
                direction,
            }
        })
        .collect()
}
