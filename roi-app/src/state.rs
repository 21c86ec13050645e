//! Session state for the calculator shell.
//!
//! The state is a plain value: each submission takes the current state and
//! returns the next one, so nothing about a session lives in globals.

use std::fmt;

use roi_core::ReportRecord;

/// Outcome of the most recent sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// No sync has been tried for the latest report (none submitted yet,
    /// sync disabled, backend unavailable, or no PDF to upload).
    #[default]
    NotAttempted,
    Succeeded,
    Failed,
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::NotAttempted => "not attempted",
            SyncStatus::Succeeded => "synced",
            SyncStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub sync_status: SyncStatus,
    pub last_report: Option<ReportRecord>,
    /// Successful calculations so far in this session.
    pub submissions: u32,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state after a calculation produced `report`.
    pub fn after_submission(
        &self,
        report: ReportRecord,
        sync_status: SyncStatus,
    ) -> Self {
        Self {
            sync_status,
            last_report: Some(report),
            submissions: self.submissions.saturating_add(1),
        }
    }

    pub fn has_report(&self) -> bool {
        self.last_report.is_some()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use roi_core::time::wib;
    use roi_core::{ReportBuilder, RoiInput};

    use super::*;

    fn report() -> ReportRecord {
        let timestamp = wib().with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        ReportBuilder::new(&RoiInput::default()).build(timestamp).unwrap()
    }

    #[test]
    fn new_session_has_nothing() {
        let state = SessionState::new();

        assert_eq!(state.sync_status, SyncStatus::NotAttempted);
        assert!(!state.has_report());
        assert_eq!(state.submissions, 0);
    }

    #[test]
    fn submission_replaces_report_and_status() {
        let first = SessionState::new().after_submission(report(), SyncStatus::Failed);
        let second = first.after_submission(report(), SyncStatus::Succeeded);

        assert_eq!(first.sync_status, SyncStatus::Failed);
        assert_eq!(second.sync_status, SyncStatus::Succeeded);
        assert_eq!(second.submissions, 2);
        assert!(second.has_report());
    }

    #[test]
    fn previous_state_is_left_untouched() {
        let before = SessionState::new();

        let _after = before.after_submission(report(), SyncStatus::Succeeded);

        assert_eq!(before, SessionState::new());
    }

    #[test]
    fn status_labels() {
        assert_eq!(SyncStatus::NotAttempted.to_string(), "not attempted");
        assert_eq!(SyncStatus::Succeeded.to_string(), "synced");
        assert_eq!(SyncStatus::Failed.to_string(), "failed");
    }
}
