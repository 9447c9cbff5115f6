use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::ClauseProfile;
use crate::comparator::{ClauseViolation, Comparison};
use crate::validator::PerformanceTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Success,
    Fail,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Execution,
    RowCount,
    ColumnNames,
    DataMatch,
    RowOrderMismatch,
    Distinct,
    Having,
    NullHandling,
}

impl From<ClauseViolation> for CheckKind {
    fn from(violation: ClauseViolation) -> Self {
        match violation {
            ClauseViolation::Distinct => Self::Distinct,
            ClauseViolation::Having => Self::Having,
            ClauseViolation::NullHandling => Self::NullHandling,
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Execution => "execution",
            Self::RowCount => "row_count",
            Self::ColumnNames => "column_names",
            Self::DataMatch => "data_match",
            Self::RowOrderMismatch => "row_order_mismatch",
            Self::Distinct => "distinct",
            Self::Having => "having",
            Self::NullHandling => "null_handling",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedCheck {
    pub check: CheckKind,
    pub reason: String,
}

impl FailedCheck {
    pub fn new(check: CheckKind, reason: impl Into<String>) -> Self {
        Self { check, reason: reason.into() }
    }
}

/// Verdict of one validation run, ready to serialize for the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub status: ValidationStatus,
    pub failed_checks: Vec<FailedCheck>,
    /// Non-fatal findings, e.g. a row-order difference under the informational policy.
    pub informational: Vec<FailedCheck>,
    pub performance_metrics: PerformanceTable,
    pub retry_notes: Vec<String>,
    pub clauses: ClauseProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

impl ValidationReport {
    pub fn new(run_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at,
            status: ValidationStatus::Success,
            failed_checks: Vec::new(),
            informational: Vec::new(),
            performance_metrics: PerformanceTable::default(),
            retry_notes: Vec::new(),
            clauses: ClauseProfile::default(),
            comparison: None,
        }
    }

    pub fn fail(&mut self, check: CheckKind, reason: impl Into<String>) {
        self.failed_checks.push(FailedCheck::new(check, reason));
    }

    pub fn note(&mut self, check: CheckKind, reason: impl Into<String>) {
        self.informational.push(FailedCheck::new(check, reason));
    }

    /// Derives `status` from the recorded checks.
    pub fn finalize(&mut self) {
        self.status = if self.failed_checks.iter().any(|c| c.check == CheckKind::Execution) {
            ValidationStatus::Error
        } else if self.failed_checks.is_empty() {
            ValidationStatus::Success
        } else {
            ValidationStatus::Fail
        };
    }

    pub fn is_success(&self) -> bool {
        self.status == ValidationStatus::Success
    }

    pub fn has_check(&self, check: CheckKind) -> bool {
        self.failed_checks.iter().any(|c| c.check == check)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_checks() {
        let mut report = ValidationReport::new("r", Utc::now());
        report.finalize();
        assert_eq!(report.status, ValidationStatus::Success);

        report.note(CheckKind::RowOrderMismatch, "order differs");
        report.finalize();
        assert!(report.is_success());

        report.fail(CheckKind::DataMatch, "x");
        report.finalize();
        assert_eq!(report.status, ValidationStatus::Fail);

        report.fail(CheckKind::Execution, "candidate/original: boom");
        report.finalize();
        assert_eq!(report.status, ValidationStatus::Error);
    }

    #[test]
    fn serializes_snake_case() {
        let mut report = ValidationReport::new("run-1", Utc::now());
        report.fail(CheckKind::NullHandling, "NULL count mismatch: 1 vs 2");
        report.finalize();

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["status"], "fail");
        assert_eq!(json["failed_checks"][0]["check"], "null_handling");
        assert_eq!(json["run_id"], "run-1");
        assert!(json.get("comparison").is_none());
        assert!(json["started_at"].is_string());
    }
}
