//! Aggregation engine for construction-site blocker records.
//!
//! Every function here is a pure batch transform: it takes a snapshot of
//! issue records, an actor roster and an explicit reference instant, and
//! returns self-contained result structures. Nothing reads the clock or
//! touches storage; the `db` module is the collaborator that produces
//! snapshots and `main` is the one that reads `Utc::now()`.
//!
//! Durations are measured in hours throughout. Thresholds expressed in days
//! (tiering, insight rules) convert at the comparison site.

pub mod compare;
pub mod db;
pub mod duration;
pub mod frequency;
pub mod insight;
pub mod models;
pub mod performance;
pub mod ranking;
pub mod report;
pub mod trend;
pub mod window;

#[cfg(test)]
pub(crate) mod testutil;

use thiserror::Error;

/// Invalid configuration is the only condition surfaced as a hard error;
/// malformed records degrade gracefully instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("window length must be a positive number of days, got {0}")]
    InvalidWindow(i64),
    #[error("unknown trend bucket unit '{0}', expected 'day' or 'week'")]
    UnknownBucketUnit(String),
}
