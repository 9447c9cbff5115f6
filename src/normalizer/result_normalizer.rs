use serde_json::Value;

use crate::engine::ResultSet;
use crate::normalizer::{NormalizedCell, NormalizedResultSet};

pub struct Normalizer;

impl Normalizer {
    /// Column names lower-cased and trimmed, each column typed as a whole
    /// (numeric when every non-null cell is a finite number, text otherwise),
    /// columns stably sorted by name. Row order is untouched.
    pub fn normalize(result_set: &ResultSet) -> NormalizedResultSet {
        let width = result_set.columns.len();

        let columns: Vec<Vec<NormalizedCell>> = (0..width)
            .map(|col| {
                let values: Vec<Value> = result_set
                    .rows
                    .iter()
                    .map(|row| row.get(col).cloned().unwrap_or(Value::Null))
                    .collect();
                let numeric: Option<Vec<NormalizedCell>> = values
                    .iter()
                    .map(|v| match v {
                        Value::Null => Some(NormalizedCell::Null),
                        other => Self::numeric_value(other).map(NormalizedCell::Number),
                    })
                    .collect();
                numeric.unwrap_or_else(|| {
                    values
                        .iter()
                        .map(|v| match v {
                            Value::Null => NormalizedCell::Null,
                            other => NormalizedCell::Text(Self::text_value(other)),
                        })
                        .collect()
                })
            })
            .collect();

        let names: Vec<String> = result_set.columns.iter().map(|c| Self::column_name(c)).collect();
        let mut order: Vec<usize> = (0..width).collect();
        order.sort_by(|a, b| names[*a].cmp(&names[*b]));

        let rows = (0..result_set.rows.len())
            .map(|row| order.iter().map(|&col| columns[col][row].clone()).collect())
            .collect();

        NormalizedResultSet {
            columns: order.iter().map(|&col| names[col].clone()).collect(),
            rows,
        }
    }

    pub fn column_name(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// JSON numbers and numeric strings that land on a finite f64.
    pub fn numeric_value(value: &Value) -> Option<f64> {
        let n = match value {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    pub fn text_value(value: &Value) -> String {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        text.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn rs(columns: &[&str], rows: Vec<Vec<Value>>) -> ResultSet {
        ResultSet::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    #[test]
    fn names_are_folded_and_sorted() {
        let out = Normalizer::normalize(&rs(&[" Total ", "ID", "b"], vec![vec![json!(1), json!(2), json!(3)]]));
        assert_eq!(out.columns, vec!["b", "id", "total"]);
        assert_eq!(
            out.rows[0],
            vec![NormalizedCell::Number(3.0), NormalizedCell::Number(2.0), NormalizedCell::Number(1.0)]
        );
    }

    #[test]
    fn numeric_strings_make_a_numeric_column() {
        let out = Normalizer::normalize(&rs(&["v"], vec![vec![json!(" 1.50 ")], vec![json!(2)], vec![Value::Null]]));
        assert_eq!(
            out.rows.iter().map(|r| r[0].clone()).collect::<Vec<_>>(),
            vec![NormalizedCell::Number(1.5), NormalizedCell::Number(2.0), NormalizedCell::Null]
        );
    }

    #[test]
    fn one_non_numeric_cell_makes_the_column_text() {
        let out = Normalizer::normalize(&rs(
            &["v"],
            vec![vec![json!(1.5)], vec![json!("  ABC ")], vec![json!(true)], vec![json!([1, "X"])], vec![Value::Null]],
        ));
        let cells: Vec<_> = out.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(
            cells,
            vec![
                NormalizedCell::Text("1.5".into()),
                NormalizedCell::Text("abc".into()),
                NormalizedCell::Text("true".into()),
                NormalizedCell::Text("[1,\"x\"]".into()),
                NormalizedCell::Null,
            ]
        );
    }

    #[test]
    fn ragged_rows_are_padded_with_null() {
        let out = Normalizer::normalize(&rs(&["a", "b"], vec![vec![json!(1)]]));
        assert_eq!(out.rows[0], vec![NormalizedCell::Number(1.0), NormalizedCell::Null]);
    }

    #[test]
    fn empty_input_stays_empty() {
        let out = Normalizer::normalize(&ResultSet::empty());
        assert_eq!(out, NormalizedResultSet::default());
    }

    fn cell() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<i32>().prop_map(|n| json!(n)),
            (-1.0e6..1.0e6f64).prop_map(|n| json!(n)),
            any::<bool>().prop_map(Value::Bool),
            "[ a-zA-Z0-9.]{0,6}".prop_map(Value::String),
        ]
    }

    fn result_set() -> impl Strategy<Value = ResultSet> {
        (1..4usize).prop_flat_map(|width| {
            (
                prop::collection::vec("[A-Za-z ]{1,4}", width),
                prop::collection::vec(prop::collection::vec(cell(), width), 0..6),
            )
                .prop_map(|(columns, rows)| ResultSet::new(columns, rows))
        })
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(input in result_set()) {
            let once = Normalizer::normalize(&input);
            let twice = Normalizer::normalize(&once.to_result_set());
            prop_assert_eq!(twice, once);
        }
    }
}
