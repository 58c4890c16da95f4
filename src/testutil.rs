use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{Actor, IssueRecord, IssueStatus, Priority, StatusChange};

pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
}

pub fn issue(category: &str, status: IssueStatus, created_days_ago: i64) -> IssueRecord {
    let now = reference_now();
    IssueRecord {
        id: Uuid::new_v4(),
        category: Some(category.to_string()),
        priority: Priority::Medium,
        status,
        location: None,
        project_id: Uuid::new_v4(),
        project_location: None,
        assigned_actor_id: None,
        created_at: now - Duration::days(created_days_ago),
        completed_at: None,
        status_history: Vec::new(),
        has_documentation: false,
    }
}

pub fn resolved_issue(category: &str, created_days_ago: i64, hours_to_resolve: i64) -> IssueRecord {
    let mut record = issue(category, IssueStatus::VerifiedComplete, created_days_ago);
    record.completed_at = Some(record.created_at + Duration::hours(hours_to_resolve));
    record
}

pub fn actor(name: &str) -> Actor {
    Actor {
        id: Uuid::new_v4(),
        display_name: name.to_string(),
        role: "worker".to_string(),
        team_id: None,
        last_active_at: None,
    }
}

pub fn transition(record: &IssueRecord, status: IssueStatus, hours_after_creation: i64) -> StatusChange {
    StatusChange {
        status,
        changed_at: record.created_at + Duration::hours(hours_after_creation),
    }
}
