use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Columns plus rows of JSON cells, exactly as an engine returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        Self::new(columns.iter().map(|c| c.as_ref().to_string()).collect(), Vec::new())
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    /// Builds a result set from row objects (`[{"col": v, ...}, ...]`).
    /// Columns are the union of keys in first-seen order; missing keys are null.
    pub fn from_json_rows(rows: &[Value]) -> Self {
        let mut columns: IndexSet<String> = IndexSet::new();
        for row in rows {
            if let Value::Object(map) = row {
                columns.extend(map.keys().cloned());
            }
        }

        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns: columns.into_iter().collect(), rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.rows.iter().flatten().filter(|v| v.is_null()).count()
    }
}
