use serde::Serialize;

use crate::engine::ResultSet;
use crate::normalizer::NormalizedCell;

/// Lower-cased, trimmed, lexicographically ordered columns with canonical cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<NormalizedCell>>,
}

impl NormalizedResultSet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn null_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_null()).count()
    }

    /// Back to raw JSON cells, so the result can be normalized again.
    pub fn to_result_set(&self) -> ResultSet {
        ResultSet::new(
            self.columns.clone(),
            self.rows.iter().map(|row| row.iter().map(NormalizedCell::to_value).collect()).collect(),
        )
    }
}
