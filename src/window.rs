use chrono::{DateTime, Duration, Utc};

use crate::models::IssueRecord;
use crate::EngineError;

pub fn window_cutoff(window_days: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>, EngineError> {
    if window_days <= 0 {
        return Err(EngineError::InvalidWindow(window_days));
    }
    Ok(now - Duration::days(window_days))
}

/// Records created within the last `window_days` days, measured back from
/// the caller-supplied reference instant.
pub fn filter_window(
    records: &[IssueRecord],
    window_days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<IssueRecord>, EngineError> {
    let cutoff = window_cutoff(window_days, now)?;
    Ok(records
        .iter()
        .filter(|record| record.created_at >= cutoff)
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueStatus;
    use crate::testutil::{issue, reference_now};

    #[test]
    fn keeps_records_inside_the_window() {
        let records = vec![
            issue("Electrical", IssueStatus::Pending, 2),
            issue("Plumbing", IssueStatus::Pending, 40),
        ];

        let filtered = filter_window(&records, 30, reference_now()).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].category.as_deref(), Some("Electrical"));
    }

    #[test]
    fn record_on_the_cutoff_is_included() {
        let records = vec![issue("Electrical", IssueStatus::Pending, 30)];
        let filtered = filter_window(&records, 30, reference_now()).unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let filtered = filter_window(&[], 7, reference_now()).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn non_positive_window_is_rejected() {
        assert!(matches!(
            filter_window(&[], 0, reference_now()),
            Err(EngineError::InvalidWindow(0))
        ));
        assert!(matches!(
            filter_window(&[], -5, reference_now()),
            Err(EngineError::InvalidWindow(-5))
        ));
    }
}
