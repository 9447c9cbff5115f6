use std::collections::HashSet;

use serde::Serialize;

use crate::analysis::ClauseProfile;
use crate::comparator::Helpers;
use crate::normalizer::NormalizedResultSet;

/// Findings tied to a clause the query uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseViolation {
    /// Duplicate rows although the query says DISTINCT.
    Distinct,
    /// Row counts differ on a query filtered by HAVING.
    Having,
    /// Total NULL counts differ on a query that tests for NULL.
    NullHandling,
}

impl ClauseViolation {
    pub fn reason(&self, left: &NormalizedResultSet, right: &NormalizedResultSet) -> String {
        match self {
            Self::Distinct => "duplicate rows found despite DISTINCT".to_string(),
            Self::Having => format!(
                "row count mismatch after HAVING: {} vs {}",
                left.row_count(),
                right.row_count()
            ),
            Self::NullHandling => format!(
                "NULL count mismatch: {} vs {}",
                left.null_count(),
                right.null_count()
            ),
        }
    }
}

pub struct ClauseChecks;

impl ClauseChecks {
    pub fn run(
        profile: &ClauseProfile,
        left: &NormalizedResultSet,
        right: &NormalizedResultSet,
    ) -> Vec<ClauseViolation> {
        let mut violations = Vec::new();

        if profile.has_outer_distinct && (Self::has_duplicates(left) || Self::has_duplicates(right)) {
            violations.push(ClauseViolation::Distinct);
        }
        if profile.has_having && left.row_count() != right.row_count() {
            violations.push(ClauseViolation::Having);
        }
        if profile.has_null_check && left.null_count() != right.null_count() {
            violations.push(ClauseViolation::NullHandling);
        }

        violations
    }

    pub fn has_duplicates(result_set: &NormalizedResultSet) -> bool {
        let mut seen = HashSet::with_capacity(result_set.row_count());
        result_set.rows.iter().any(|row| !seen.insert(Helpers::canonical_tuple(row)))
    }
}
