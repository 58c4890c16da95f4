use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

use blocker_analytics::compare::{compare_subpopulation, DEFAULT_COMPARISON};
use blocker_analytics::db;
use blocker_analytics::duration::compute_resolution_stats;
use blocker_analytics::frequency::{aggregate_by_field, repeat_groups, GroupField};
use blocker_analytics::insight::{generate_insights, InsightConfig};
use blocker_analytics::performance::{compute_profiles, ScorerConfig};
use blocker_analytics::ranking::rank_actors;
use blocker_analytics::report;
use blocker_analytics::trend::{build_trend, weekly_response_trend, BucketUnit};
use blocker_analytics::window::window_cutoff;

#[derive(Parser)]
#[command(name = "blocker-analytics")]
#[command(about = "Operational analytics for construction-site blockers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import issues from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Category and location breakdown with resolution statistics
    Summary {
        #[arg(long)]
        project: Option<String>,
        #[arg(long, default_value_t = 30)]
        since_days: i64,
        #[arg(long, default_value_t = 8)]
        top: usize,
        #[arg(long)]
        json: bool,
    },
    /// Score assignees and print the leaderboard
    Performance {
        #[arg(long)]
        project: Option<String>,
        #[arg(long, default_value_t = 30)]
        since_days: i64,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Created vs resolved counts per bucket
    Trend {
        #[arg(long)]
        project: Option<String>,
        #[arg(long, default_value_t = 30)]
        since_days: i64,
        #[arg(long, default_value = "day")]
        unit: String,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        project: Option<String>,
        #[arg(long, default_value_t = 30)]
        since_days: i64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    let now = Utc::now();

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} issues from {}.", csv.display());
        }
        Commands::Summary {
            project,
            since_days,
            top,
            json,
        } => {
            let cutoff = window_cutoff(since_days, now)?;
            let records = db::fetch_issues(&pool, cutoff, project.as_deref()).await?;

            let categories = aggregate_by_field(&records, GroupField::Category, top);
            let locations = repeat_groups(&records, GroupField::Location, 3);
            let stats = compute_resolution_stats(&records, 5);

            if json {
                let payload = serde_json::json!({
                    "categories": categories,
                    "problem_locations": locations,
                    "resolution": stats,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            if records.is_empty() {
                println!("No issues found for this window.");
                return Ok(());
            }

            println!("Top categories:");
            for category in categories.iter() {
                println!(
                    "- {}: {} issues ({}% resolved)",
                    category.key, category.count, category.resolution_rate
                );
            }

            if !locations.is_empty() {
                println!("Problem locations:");
                for location in locations.iter() {
                    println!("- {}: {} recurring issues", location.key, location.count);
                }
            }

            if stats.resolved > 0 {
                println!(
                    "Average resolution: {:.1} hours across {} resolved issues.",
                    stats.avg_hours, stats.resolved
                );
            }
        }
        Commands::Performance {
            project,
            since_days,
            limit,
            json,
        } => {
            let cutoff = window_cutoff(since_days, now)?;
            let records = db::fetch_issues(&pool, cutoff, project.as_deref()).await?;
            let actors = db::fetch_actors(&pool).await?;

            let profiles = compute_profiles(&records, &actors, &ScorerConfig::default());
            let ranked = rank_actors(&profiles);
            let insights = generate_insights(
                &aggregate_by_field(&records, GroupField::Category, usize::MAX),
                &compute_resolution_stats(&records, 5),
                &profiles,
                &InsightConfig::default(),
            );

            if json {
                let payload = serde_json::json!({
                    "leaderboard": ranked.iter().take(limit).collect::<Vec<_>>(),
                    "insights": insights,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            if ranked.is_empty() {
                println!("No assignees with work in this window.");
                return Ok(());
            }

            println!("Assignee leaderboard:");
            for actor in ranked.iter().take(limit) {
                let badges = if actor.badges.is_empty() {
                    String::new()
                } else {
                    let labels: Vec<&str> = actor.badges.iter().map(|b| b.label()).collect();
                    format!(" ({})", labels.join(", "))
                };
                println!(
                    "- #{} {} [{}]: {:.0}% completion, {} resolved, quality {}{}",
                    actor.rank,
                    actor.display_name,
                    actor.tier.as_str(),
                    actor.completion_rate,
                    actor.resolved,
                    actor.quality_score,
                    badges
                );
            }

            for insight in insights.iter() {
                println!(
                    "[{}] {}: {}",
                    insight.severity.as_str(),
                    insight.title,
                    insight.description
                );
            }

            if project.is_some() {
                let all = db::fetch_issues(&pool, cutoff, None).await?;
                println!("Against all projects:");
                for metric in compare_subpopulation(&records, &all, &DEFAULT_COMPARISON) {
                    println!(
                        "- {}: {:.1} {} vs {:.1} {} ({})",
                        metric.metric,
                        metric.sub_value,
                        metric.unit,
                        metric.population_value,
                        metric.unit,
                        metric.direction.as_str()
                    );
                }
            }
        }
        Commands::Trend {
            project,
            since_days,
            unit,
        } => {
            let bucket_unit: BucketUnit = unit.parse()?;
            let cutoff = window_cutoff(since_days, now)?;
            let records = db::fetch_issues(&pool, cutoff, project.as_deref()).await?;

            for bucket in build_trend(&records, since_days, bucket_unit, now)? {
                println!(
                    "{}: {} created / {} resolved",
                    bucket.label, bucket.created, bucket.resolved
                );
            }

            if bucket_unit == BucketUnit::Week {
                let weeks = weekly_response_trend(
                    &records,
                    since_days,
                    now,
                    ScorerConfig::default().first_touch,
                )?;
                for week in weeks {
                    println!(
                        "{}: {:.1}h average first response ({} samples)",
                        week.week, week.avg_response_hours, week.samples
                    );
                }
            }
        }
        Commands::Report {
            project,
            since_days,
            out,
        } => {
            let cutoff = window_cutoff(since_days, now)?;
            let records = db::fetch_issues(&pool, cutoff, project.as_deref()).await?;
            let actors = db::fetch_actors(&pool).await?;

            let population = match project {
                Some(_) => Some(db::fetch_issues(&pool, cutoff, None).await?),
                None => None,
            };

            let rendered = report::build_report(
                project.as_deref(),
                since_days,
                cutoff,
                &records,
                population.as_deref(),
                &actors,
                now,
            )?;
            std::fs::write(&out, rendered)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
