use serde::Serialize;

use crate::normalizer::{NormalizedCell, NormalizedResultSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub columns: Vec<String>,
    pub rows: usize,
}

impl Shape {
    pub fn of(result_set: &NormalizedResultSet) -> Self {
        Self { columns: result_set.columns.clone(), rows: result_set.row_count() }
    }
}

/// One differing cell, positioned in the compared (possibly sorted) rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDiff {
    pub row: usize,
    pub column: String,
    pub left: NormalizedCell,
    pub right: NormalizedCell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Comparison {
    Match,
    /// Same rows, different order.
    RowOrderMismatch,
    ShapeMismatch { left: Shape, right: Shape },
    DataMismatch {
        diffs: Vec<CellDiff>,
        mismatched_cells: usize,
        /// Whether rows were sorted before the diff was taken.
        sorted: bool,
    },
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }

    pub fn columns_differ(&self) -> bool {
        matches!(self, Self::ShapeMismatch { left, right } if left.columns != right.columns)
    }

    pub fn rows_differ(&self) -> bool {
        matches!(self, Self::ShapeMismatch { left, right } if left.rows != right.rows)
    }

    pub fn describe_diffs(diffs: &[CellDiff]) -> String {
        diffs
            .iter()
            .map(|d| format!("row {} `{}`: {} vs {}", d.row, d.column, d.left, d.right))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
