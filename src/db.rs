use std::collections::HashMap;

use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Actor, IssueRecord, IssueStatus, Priority, StatusChange};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let project_id = Uuid::parse_str("7b1d2f60-8a41-4c24-9a6b-55b0e2f4c1aa")?;
    sqlx::query(
        r#"
        INSERT INTO blocker_analytics.projects (id, name, location)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET location = EXCLUDED.location
        "#,
    )
    .bind(project_id)
    .bind("North Tower")
    .bind("Riverside Site")
    .execute(pool)
    .await?;

    let actors = vec![
        (
            Uuid::parse_str("3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2")?,
            "Dana Reyes",
            "dana.reyes@example.com",
            "electrician",
        ),
        (
            Uuid::parse_str("0c22f1f1-9184-4fd4-9b21-28c68a6a89dc")?,
            "Marco Silva",
            "marco.silva@example.com",
            "plumber",
        ),
        (
            Uuid::parse_str("d5a0a1a2-2a3c-44c2-8f73-60b7897a9dd2")?,
            "Priya Shah",
            "priya.shah@example.com",
            "supervisor",
        ),
    ];

    for (id, name, email, role) in actors {
        sqlx::query(
            r#"
            INSERT INTO blocker_analytics.actors (id, display_name, email, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET display_name = EXCLUDED.display_name, role = EXCLUDED.role
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(role)
        .execute(pool)
        .await?;
    }

    let issues = vec![
        (
            "seed-001",
            Some("Electrical"),
            "high",
            "verified_complete",
            Some("Level 3 riser"),
            Some("dana.reyes@example.com"),
            timestamp(2026, 7, 20, 8)?,
            Some(timestamp(2026, 7, 21, 16)?),
            true,
        ),
        (
            "seed-002",
            Some("Plumbing"),
            "critical",
            "in_progress",
            Some("Basement pump room"),
            Some("marco.silva@example.com"),
            timestamp(2026, 7, 25, 9)?,
            None,
            false,
        ),
        (
            "seed-003",
            Some("Electrical"),
            "medium",
            "verified_complete",
            Some("Level 3 riser"),
            Some("dana.reyes@example.com"),
            timestamp(2026, 7, 26, 10)?,
            Some(timestamp(2026, 7, 28, 12)?),
            true,
        ),
        (
            "seed-004",
            None,
            "low",
            "pending",
            None,
            None,
            timestamp(2026, 7, 30, 14)?,
            None,
            false,
        ),
    ];

    for (source_key, category, priority, status, location, email, created_at, completed_at, documented) in
        issues
    {
        let actor_id: Option<Uuid> = match email {
            Some(email) => Some(
                sqlx::query("SELECT id FROM blocker_analytics.actors WHERE email = $1")
                    .bind(email)
                    .fetch_one(pool)
                    .await?
                    .get("id"),
            ),
            None => None,
        };

        let issue_id = Uuid::new_v4();
        let inserted = sqlx::query(
            r#"
            INSERT INTO blocker_analytics.issues
            (id, project_id, category, priority, status, location, assigned_actor_id,
             created_at, completed_at, has_documentation, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(issue_id)
        .bind(project_id)
        .bind(category)
        .bind(priority)
        .bind(status)
        .bind(location)
        .bind(actor_id)
        .bind(created_at)
        .bind(completed_at)
        .bind(documented)
        .bind(source_key)
        .execute(pool)
        .await?;

        if inserted.rows_affected() == 0 {
            continue;
        }

        if actor_id.is_some() {
            insert_status_change(
                pool,
                issue_id,
                "assigned",
                created_at + chrono::Duration::hours(2),
            )
            .await?;
        }
        if let Some(completed) = completed_at {
            insert_status_change(pool, issue_id, "verified_complete", completed).await?;
        }
    }

    Ok(())
}

fn timestamp(year: i32, month: u32, day: u32, hour: u32) -> anyhow::Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .context("invalid timestamp")
}

async fn insert_status_change(
    pool: &PgPool,
    issue_id: Uuid,
    status: &str,
    changed_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO blocker_analytics.status_changes (id, issue_id, status, changed_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(issue_id)
    .bind(status)
    .bind(changed_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_issues(
    pool: &PgPool,
    since: DateTime<Utc>,
    project: Option<&str>,
) -> anyhow::Result<Vec<IssueRecord>> {
    let mut query = String::from(
        "SELECT i.id, i.category, i.priority, i.status, i.location, i.project_id, \
         p.location AS project_location, i.assigned_actor_id, i.created_at, \
         i.completed_at, i.has_documentation \
         FROM blocker_analytics.issues i \
         JOIN blocker_analytics.projects p ON p.id = i.project_id \
         WHERE i.created_at >= $1",
    );
    if project.is_some() {
        query.push_str(" AND p.name = $2");
    }

    let mut rows = sqlx::query(&query).bind(since);
    if let Some(name) = project {
        rows = rows.bind(name);
    }
    let rows = rows.fetch_all(pool).await?;

    let mut history = fetch_status_changes(pool, since, project).await?;
    let mut issues = Vec::with_capacity(rows.len());

    for row in rows {
        let id: Uuid = row.get("id");
        let priority_raw: String = row.get("priority");
        let status_raw: String = row.get("status");
        issues.push(IssueRecord {
            id,
            category: row.get("category"),
            priority: parse_priority(&priority_raw, id),
            status: parse_status(&status_raw, id),
            location: row.get("location"),
            project_id: row.get("project_id"),
            project_location: row.get("project_location"),
            assigned_actor_id: row.get("assigned_actor_id"),
            created_at: row.get("created_at"),
            completed_at: row.get("completed_at"),
            status_history: history.remove(&id).unwrap_or_default(),
            has_documentation: row.get("has_documentation"),
        });
    }

    info!(count = issues.len(), "fetched issue snapshot");
    Ok(issues)
}

async fn fetch_status_changes(
    pool: &PgPool,
    since: DateTime<Utc>,
    project: Option<&str>,
) -> anyhow::Result<HashMap<Uuid, Vec<StatusChange>>> {
    let mut query = String::from(
        "SELECT sc.issue_id, sc.status, sc.changed_at \
         FROM blocker_analytics.status_changes sc \
         JOIN blocker_analytics.issues i ON i.id = sc.issue_id \
         JOIN blocker_analytics.projects p ON p.id = i.project_id \
         WHERE i.created_at >= $1",
    );
    if project.is_some() {
        query.push_str(" AND p.name = $2");
    }
    query.push_str(" ORDER BY sc.changed_at");

    let mut rows = sqlx::query(&query).bind(since);
    if let Some(name) = project {
        rows = rows.bind(name);
    }

    let mut history: HashMap<Uuid, Vec<StatusChange>> = HashMap::new();
    for row in rows.fetch_all(pool).await? {
        let issue_id: Uuid = row.get("issue_id");
        let status_raw: String = row.get("status");
        history.entry(issue_id).or_default().push(StatusChange {
            status: parse_status(&status_raw, issue_id),
            changed_at: row.get("changed_at"),
        });
    }
    Ok(history)
}

pub async fn fetch_actors(pool: &PgPool) -> anyhow::Result<Vec<Actor>> {
    let rows = sqlx::query(
        "SELECT id, display_name, role, team_id, last_active_at \
         FROM blocker_analytics.actors ORDER BY display_name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Actor {
            id: row.get("id"),
            display_name: row.get("display_name"),
            role: row.get("role"),
            team_id: row.get("team_id"),
            last_active_at: row.get("last_active_at"),
        })
        .collect())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        project: String,
        project_location: Option<String>,
        category: Option<String>,
        priority: Option<String>,
        status: Option<String>,
        location: Option<String>,
        assignee_name: Option<String>,
        assignee_email: Option<String>,
        created_at: DateTime<Utc>,
        assigned_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
        has_documentation: Option<bool>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;

        let project_id: Uuid = sqlx::query(
            r#"
            INSERT INTO blocker_analytics.projects (id, name, location)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
            SET location = COALESCE(EXCLUDED.location, blocker_analytics.projects.location)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.project)
        .bind(&row.project_location)
        .fetch_one(pool)
        .await?
        .get("id");

        let actor_id: Option<Uuid> = match (&row.assignee_email, &row.assignee_name) {
            (Some(email), name) => Some(
                sqlx::query(
                    r#"
                    INSERT INTO blocker_analytics.actors (id, display_name, email)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (email) DO UPDATE
                    SET display_name = EXCLUDED.display_name
                    RETURNING id
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(name.as_deref().unwrap_or(email))
                .bind(email)
                .fetch_one(pool)
                .await?
                .get("id"),
            ),
            _ => None,
        };

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));
        let issue_id = Uuid::new_v4();

        let result = sqlx::query(
            r#"
            INSERT INTO blocker_analytics.issues
            (id, project_id, category, priority, status, location, assigned_actor_id,
             created_at, completed_at, has_documentation, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(issue_id)
        .bind(project_id)
        .bind(&row.category)
        .bind(row.priority.as_deref().unwrap_or("medium"))
        .bind(row.status.as_deref().unwrap_or("pending"))
        .bind(&row.location)
        .bind(actor_id)
        .bind(row.created_at)
        .bind(row.completed_at)
        .bind(row.has_documentation.unwrap_or(false))
        .bind(&source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            continue;
        }
        inserted += 1;

        if let Some(assigned_at) = row.assigned_at {
            insert_status_change(pool, issue_id, "assigned", assigned_at).await?;
        }
        if let Some(completed_at) = row.completed_at {
            insert_status_change(pool, issue_id, "verified_complete", completed_at).await?;
        }
    }

    info!(inserted, "csv import finished");
    Ok(inserted)
}

fn parse_priority(raw: &str, issue_id: Uuid) -> Priority {
    Priority::parse(raw).unwrap_or_else(|| {
        warn!(%issue_id, raw, "unknown priority, treating as medium");
        Priority::Medium
    })
}

fn parse_status(raw: &str, issue_id: Uuid) -> IssueStatus {
    IssueStatus::parse(raw).unwrap_or_else(|| {
        warn!(%issue_id, raw, "unknown status, treating as pending");
        IssueStatus::Pending
    })
}
