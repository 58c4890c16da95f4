use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const FALLBACK_CATEGORY: &str = "Other";
pub const FALLBACK_LOCATION: &str = "Unknown Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    VerifiedComplete,
    Rejected,
    Cancelled,
}

impl IssueStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(IssueStatus::Pending),
            "assigned" => Some(IssueStatus::Assigned),
            "in_progress" => Some(IssueStatus::InProgress),
            "completed" => Some(IssueStatus::Completed),
            "verified_complete" => Some(IssueStatus::VerifiedComplete),
            "rejected" => Some(IssueStatus::Rejected),
            "cancelled" => Some(IssueStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::Assigned => "assigned",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Completed => "completed",
            IssueStatus::VerifiedComplete => "verified_complete",
            IssueStatus::Rejected => "rejected",
            IssueStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: IssueStatus,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IssueRecord {
    pub id: Uuid,
    pub category: Option<String>,
    pub priority: Priority,
    pub status: IssueStatus,
    pub location: Option<String>,
    pub project_id: Uuid,
    pub project_location: Option<String>,
    pub assigned_actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status_history: Vec<StatusChange>,
    pub has_documentation: bool,
}

impl IssueRecord {
    pub fn category_label(&self) -> &str {
        match self.category.as_deref() {
            Some(value) if !value.trim().is_empty() => value,
            _ => FALLBACK_CATEGORY,
        }
    }

    /// Issue location, falling back to the owning project's location.
    pub fn location_label(&self) -> &str {
        if let Some(value) = self.location.as_deref() {
            if !value.trim().is_empty() {
                return value;
            }
        }
        if let Some(value) = self.project_location.as_deref() {
            if !value.trim().is_empty() {
                return value;
            }
        }
        FALLBACK_LOCATION
    }

    pub fn is_resolved(&self) -> bool {
        self.status == IssueStatus::VerifiedComplete
    }

    /// History in ascending timestamp order. The store is expected to keep
    /// transitions sorted, but the engine never relies on that.
    pub fn sorted_history(&self) -> Vec<&StatusChange> {
        let mut entries: Vec<&StatusChange> = self.status_history.iter().collect();
        entries.sort_by_key(|entry| entry.changed_at);
        entries
    }
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub display_name: String,
    pub role: String,
    pub team_id: Option<Uuid>,
    pub last_active_at: Option<DateTime<Utc>>,
}

/// Per-group counts and resolution statistics.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationResult {
    pub key: String,
    pub count: usize,
    pub resolved_count: usize,
    pub avg_resolution_hours: f64,
    /// resolved / count * 100, rounded; 0 when the group is empty.
    pub resolution_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Excellent,
    Good,
    Average,
    Poor,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Excellent => "excellent",
            Tier::Good => "good",
            Tier::Average => "average",
            Tier::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceProfile {
    pub actor_id: Uuid,
    pub display_name: String,
    pub assigned: usize,
    pub resolved: usize,
    pub rejected: usize,
    pub documented: usize,
    pub completion_rate: f64,
    pub documentation_rate: f64,
    pub rejection_penalty: f64,
    pub quality_score: u32,
    pub avg_response_hours: Option<f64>,
    pub avg_resolution_hours: Option<f64>,
    /// None for actors with nothing assigned in the window; they stay out
    /// of tiering and leaderboards rather than being classified as poor.
    pub tier: Option<Tier>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentileBand {
    Top10,
    Top25,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    ReliableFinisher,
    RapidResolver,
    QualityLeader,
    TopPerformer,
    CenturyClub,
    CleanRecord,
    FullyDocumented,
}

impl Achievement {
    pub fn label(&self) -> &'static str {
        match self {
            Achievement::ReliableFinisher => "Reliable Finisher",
            Achievement::RapidResolver => "Rapid Resolver",
            Achievement::QualityLeader => "Quality Leader",
            Achievement::TopPerformer => "Top Performer",
            Achievement::CenturyClub => "Century Club",
            Achievement::CleanRecord => "Clean Record",
            Achievement::FullyDocumented => "Fully Documented",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedActor {
    pub rank: usize,
    pub actor_id: Uuid,
    pub display_name: String,
    pub completion_rate: f64,
    pub resolved: usize,
    pub quality_score: u32,
    pub tier: Tier,
    pub percentile: PercentileBand,
    pub badges: Vec<Achievement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendBucket {
    pub label: String,
    pub start: DateTime<Utc>,
    pub created: usize,
    pub resolved: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyResponseBucket {
    pub week: String,
    pub avg_response_hours: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LongestResolution {
    pub issue_id: Uuid,
    pub category: String,
    pub location: String,
    pub assigned_actor_id: Option<Uuid>,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDuration {
    pub category: String,
    pub resolved: usize,
    pub avg_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionStats {
    pub resolved: usize,
    pub avg_hours: f64,
    pub longest: Vec<LongestResolution>,
    pub by_category: Vec<CategoryDuration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Improving,
    Lagging,
    Even,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Improving => "improving",
            Direction::Lagging => "lagging",
            Direction::Even => "even",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparativeMetric {
    pub metric: String,
    pub sub_value: f64,
    pub population_value: f64,
    pub unit: &'static str,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Positive,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Positive => "positive",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    pub kind: String,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub severity: Severity,
}
