use crate::analysis::RoundingMap;
use crate::comparator::{CellDiff, Comparison, Helpers, Shape};
use crate::normalizer::{NormalizedCell, NormalizedResultSet};

pub const DEFAULT_ABS_TOLERANCE: f64 = 1e-9;
pub const DEFAULT_REL_TOLERANCE: f64 = 1e-9;
pub const DEFAULT_MAX_REPORTED_DIFFS: usize = 5;

/// Compares two normalized result sets cell by cell, forgiving float noise,
/// text casing and (optionally) row order.
#[derive(Debug, Clone)]
pub struct TolerantComparator {
    pub rounding: RoundingMap,
    pub abs_tolerance: f64,
    pub rel_tolerance: f64,
    pub max_reported_diffs: usize,
}

impl Default for TolerantComparator {
    fn default() -> Self {
        Self::new(RoundingMap::default())
    }
}

impl TolerantComparator {
    pub fn new(rounding: RoundingMap) -> Self {
        Self {
            rounding,
            abs_tolerance: DEFAULT_ABS_TOLERANCE,
            rel_tolerance: DEFAULT_REL_TOLERANCE,
            max_reported_diffs: DEFAULT_MAX_REPORTED_DIFFS,
        }
    }

    pub fn with_tolerances(mut self, abs_tolerance: f64, rel_tolerance: f64) -> Self {
        self.abs_tolerance = abs_tolerance;
        self.rel_tolerance = rel_tolerance;
        self
    }

    pub fn with_max_reported_diffs(mut self, max_reported_diffs: usize) -> Self {
        self.max_reported_diffs = max_reported_diffs;
        self
    }

    /// `ordered` means the query fixes row order, so rows are only ever
    /// compared position by position.
    pub fn compare(&self, left: &NormalizedResultSet, right: &NormalizedResultSet, ordered: bool) -> Comparison {
        if left.columns != right.columns || left.row_count() != right.row_count() {
            return Comparison::ShapeMismatch { left: Shape::of(left), right: Shape::of(right) };
        }

        let precisions: Vec<Option<i32>> = left.columns.iter().map(|c| self.rounding.precision_for(c)).collect();

        let (diffs, mismatched_cells) = self.diff_rows(&left.columns, &precisions, &left.rows, &right.rows);
        if mismatched_cells == 0 {
            return Comparison::Match;
        }
        if ordered {
            return Comparison::DataMismatch { diffs, mismatched_cells, sorted: false };
        }

        let sort = |rows: &[Vec<NormalizedCell>]| {
            let mut rows = rows.to_vec();
            rows.sort_by(|a, b| Helpers::cmp_rows(a, b, &precisions));
            rows
        };
        let (left_sorted, right_sorted) = (sort(&left.rows), sort(&right.rows));

        let (diffs, mismatched_cells) = self.diff_rows(&left.columns, &precisions, &left_sorted, &right_sorted);
        // sorting by raw values can split rows that are only equal within tolerance
        if mismatched_cells == 0 || self.rows_pair_up(&precisions, &left.rows, &right.rows) {
            Comparison::RowOrderMismatch
        } else {
            Comparison::DataMismatch { diffs, mismatched_cells, sorted: true }
        }
    }

    pub fn cells_equal(&self, a: &NormalizedCell, b: &NormalizedCell, precision: Option<i32>) -> bool {
        use NormalizedCell::*;
        match (a, b) {
            (Null, Null) => true,
            (Null, _) | (_, Null) => false,
            (Number(x), Number(y)) => self.numbers_equal(*x, *y, precision),
            (Text(x), Text(y)) => Self::texts_equal(x, y),
            (Number(n), Text(t)) | (Text(t), Number(n)) => match t.trim().parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => self.numbers_equal(*n, parsed, precision),
                _ => Self::texts_equal(&n.to_string(), t),
            },
        }
    }

    fn numbers_equal(&self, x: f64, y: f64, precision: Option<i32>) -> bool {
        let diff = (x - y).abs();
        match precision {
            Some(p) => {
                Helpers::fixed(x, p) == Helpers::fixed(y, p) || diff <= 0.5 * 10f64.powi(-p) + self.abs_tolerance
            }
            None => diff <= self.abs_tolerance + self.rel_tolerance * x.abs().max(y.abs()),
        }
    }

    fn texts_equal(x: &str, y: &str) -> bool {
        x.trim().to_lowercase() == y.trim().to_lowercase()
    }

    /// Every left row has its own tolerantly equal row on the right.
    fn rows_pair_up(
        &self,
        precisions: &[Option<i32>],
        left: &[Vec<NormalizedCell>],
        right: &[Vec<NormalizedCell>],
    ) -> bool {
        let mut used = vec![false; right.len()];
        left.iter().all(|l| {
            let found = (0..right.len()).find(|&i| {
                !used[i] && l.iter().zip(&right[i]).zip(precisions).all(|((a, b), p)| self.cells_equal(a, b, *p))
            });
            match found {
                Some(i) => {
                    used[i] = true;
                    true
                }
                None => false,
            }
        })
    }

    fn diff_rows(
        &self,
        columns: &[String],
        precisions: &[Option<i32>],
        left: &[Vec<NormalizedCell>],
        right: &[Vec<NormalizedCell>],
    ) -> (Vec<CellDiff>, usize) {
        let mut diffs = Vec::new();
        let mut mismatched = 0;

        for (row, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            for (col, column) in columns.iter().enumerate() {
                let (a, b) = (&l[col], &r[col]);
                if self.cells_equal(a, b, precisions[col]) {
                    continue;
                }
                mismatched += 1;
                if diffs.len() < self.max_reported_diffs {
                    diffs.push(CellDiff { row, column: column.clone(), left: a.clone(), right: b.clone() });
                }
            }
        }

        (diffs, mismatched)
    }
}

/// Compare with default tolerances.
pub fn compare(
    left: &NormalizedResultSet,
    right: &NormalizedResultSet,
    rounding: &RoundingMap,
    ordered: bool,
) -> Comparison {
    TolerantComparator::new(rounding.clone()).compare(left, right, ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ResultSet;
    use crate::normalizer::Normalizer;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    fn normalized(columns: &[&str], rows: Vec<Vec<Value>>) -> NormalizedResultSet {
        Normalizer::normalize(&ResultSet::new(columns.iter().map(|c| c.to_string()).collect(), rows))
    }

    #[test]
    fn identical_sets_match() {
        let a = normalized(&["id", "name"], vec![vec![json!(1), json!("A")], vec![json!(2), json!("b")]]);
        let b = normalized(&["NAME", "ID"], vec![vec![json!(" a "), json!(1)], vec![json!("B"), json!(2)]]);
        assert!(compare(&a, &b, &RoundingMap::new(), true).is_match());
    }

    #[test]
    fn shape_is_checked_before_values() {
        let a = normalized(&["id"], vec![vec![json!(1)]]);
        let b = normalized(&["id"], vec![vec![json!(1)], vec![json!(2)]]);
        let c = normalized(&["key"], vec![vec![json!(1)]]);

        let rows = compare(&a, &b, &RoundingMap::new(), false);
        assert!(rows.rows_differ());
        assert!(!rows.columns_differ());
        assert!(compare(&a, &c, &RoundingMap::new(), false).columns_differ());
    }

    #[test]
    fn rounded_columns_compare_at_precision() {
        let rounding = RoundingMap::new().with("avg_price", 2);
        let a = normalized(&["avg_price"], vec![vec![json!(10.333333)]]);
        let b = normalized(&["avg_price"], vec![vec![json!(10.33)]]);
        assert!(compare(&a, &b, &rounding, true).is_match());
        assert!(!compare(&a, &b, &RoundingMap::new(), true).is_match());
    }

    #[test]
    fn values_straddling_a_rounding_boundary_are_equal() {
        let rounding = RoundingMap::new().with("v", 2);
        let a = normalized(&["v"], vec![vec![json!(1.0049)]]);
        let b = normalized(&["v"], vec![vec![json!(1.0051)]]);
        assert!(compare(&a, &b, &rounding, true).is_match());

        let far = normalized(&["v"], vec![vec![json!(1.02)]]);
        assert!(!compare(&a, &far, &rounding, true).is_match());
    }

    #[test]
    fn unrounded_numbers_use_float_tolerance() {
        let a = normalized(&["x"], vec![vec![json!(0.1 + 0.2)]]);
        let b = normalized(&["x"], vec![vec![json!(0.3)]]);
        assert!(compare(&a, &b, &RoundingMap::new(), true).is_match());

        let c = normalized(&["x"], vec![vec![json!(0.3001)]]);
        assert!(!compare(&a, &c, &RoundingMap::new(), true).is_match());
        let loose = TolerantComparator::default().with_tolerances(1e-3, 0.0);
        assert!(loose.compare(&a, &c, true).is_match());
    }

    #[test]
    fn null_only_equals_null() {
        let cmp = TolerantComparator::default();
        assert!(cmp.cells_equal(&NormalizedCell::Null, &NormalizedCell::Null, None));
        assert!(!cmp.cells_equal(&NormalizedCell::Null, &NormalizedCell::Number(0.0), None));
        assert!(!cmp.cells_equal(&NormalizedCell::Text(String::new()), &NormalizedCell::Null, None));
    }

    #[test]
    fn number_against_text_compares_through_parsing() {
        let cmp = TolerantComparator::default();
        let n = NormalizedCell::Number(42.0);
        assert!(cmp.cells_equal(&n, &NormalizedCell::Text(" 42.000 ".into()), None));
        assert!(cmp.cells_equal(&NormalizedCell::Text("42".into()), &n, None));
        assert!(!cmp.cells_equal(&n, &NormalizedCell::Text("n/a".into()), None));
    }

    #[test]
    fn reordered_rows_are_an_order_mismatch_only_when_unordered() {
        let a = normalized(&["k"], vec![vec![json!("a")], vec![json!("b")], vec![Value::Null]]);
        let b = normalized(&["k"], vec![vec![Value::Null], vec![json!("b")], vec![json!("a")]]);

        assert_eq!(compare(&a, &b, &RoundingMap::new(), false), Comparison::RowOrderMismatch);
        match compare(&a, &b, &RoundingMap::new(), true) {
            Comparison::DataMismatch { sorted, mismatched_cells, .. } => {
                assert!(!sorted);
                assert_eq!(mismatched_cells, 2);
            }
            other => panic!("expected data mismatch, got {other:?}"),
        }
    }

    #[test]
    fn diffs_are_capped_but_counted() {
        let rows_a: Vec<Vec<Value>> = (0..10).map(|i| vec![json!(i)]).collect();
        let rows_b: Vec<Vec<Value>> = (0..10).map(|i| vec![json!(i + 100)]).collect();
        let a = normalized(&["n"], rows_a);
        let b = normalized(&["n"], rows_b);

        match compare(&a, &b, &RoundingMap::new(), false) {
            Comparison::DataMismatch { diffs, mismatched_cells, sorted } => {
                assert!(sorted);
                assert_eq!(diffs.len(), DEFAULT_MAX_REPORTED_DIFFS);
                assert_eq!(mismatched_cells, 10);
                assert_eq!(diffs[0].column, "n");
            }
            other => panic!("expected data mismatch, got {other:?}"),
        }
    }

    #[test]
    fn rows_equal_within_tolerance_pair_up_across_sort_order() {
        let a = normalized(&["v", "k"], vec![vec![json!(0.3), json!("x")], vec![json!(0.30000000000000004), json!("y")]]);
        let b = normalized(&["v", "k"], vec![vec![json!(0.3), json!("y")], vec![json!(0.30000000000000004), json!("x")]]);

        assert_eq!(compare(&a, &b, &RoundingMap::new(), false), Comparison::RowOrderMismatch);
        assert_eq!(compare(&b, &a, &RoundingMap::new(), false), Comparison::RowOrderMismatch);
        assert!(matches!(compare(&a, &b, &RoundingMap::new(), true), Comparison::DataMismatch { sorted: false, .. }));

        let c = normalized(&["v", "k"], vec![vec![json!(0.3), json!("y")], vec![json!(0.30000000000000004), json!("z")]]);
        assert!(matches!(compare(&a, &c, &RoundingMap::new(), false), Comparison::DataMismatch { sorted: true, .. }));
    }

    fn small_set() -> impl Strategy<Value = NormalizedResultSet> {
        let cell = prop_oneof![
            Just(Value::Null),
            (0..4i32).prop_map(|n| json!(n)),
            (0..4i32).prop_map(|n| json!(n as f64 + 0.25)),
        ];
        prop::collection::vec(prop::collection::vec(cell, 2), 0..5)
            .prop_map(|rows| normalized(&["a", "b"], rows))
    }

    proptest! {
        #[test]
        fn comparison_is_symmetric(a in small_set(), b in small_set(), ordered in any::<bool>()) {
            let rounding = RoundingMap::new().with("b", 1);
            prop_assert_eq!(
                compare(&a, &b, &rounding, ordered).is_match(),
                compare(&b, &a, &rounding, ordered).is_match()
            );
        }

        #[test]
        fn permuted_rows_never_mismatch_on_data(
            rows in prop::collection::vec(prop::collection::vec((0..5i32).prop_map(|n| json!(n)), 2), 1..6),
            seed in any::<u64>(),
        ) {
            let mut shuffled = rows.clone();
            let len = shuffled.len();
            for i in (1..len).rev() {
                let j = (seed as usize).wrapping_mul(i + 7) % (i + 1);
                shuffled.swap(i, j);
            }
            let a = normalized(&["a", "b"], rows);
            let b = normalized(&["a", "b"], shuffled);
            let outcome = compare(&a, &b, &RoundingMap::new(), false);
            prop_assert!(matches!(outcome, Comparison::Match | Comparison::RowOrderMismatch), "{:?}", outcome);
        }

        #[test]
        fn permuted_rows_with_float_noise_never_mismatch_on_data(
            rows in prop::collection::vec((0..4i32, "[a-c]"), 1..6),
            noise in prop::collection::vec(-1e-12f64..1e-12, 6),
            seed in any::<u64>(),
        ) {
            let mut shuffled: Vec<(f64, String)> = rows
                .iter()
                .enumerate()
                .map(|(i, (n, k))| (*n as f64 / 10.0 + noise[i], k.clone()))
                .collect();
            let len = shuffled.len();
            for i in (1..len).rev() {
                let j = (seed as usize).wrapping_mul(i + 3) % (i + 1);
                shuffled.swap(i, j);
            }
            let to_rows = |rows: Vec<(f64, String)>| -> Vec<Vec<Value>> {
                rows.into_iter().map(|(v, k)| vec![json!(v), json!(k)]).collect()
            };
            let a = normalized(&["v", "k"], to_rows(rows.iter().map(|(n, k)| (*n as f64 / 10.0, k.clone())).collect()));
            let b = normalized(&["v", "k"], to_rows(shuffled));
            let outcome = compare(&a, &b, &RoundingMap::new(), false);
            prop_assert!(matches!(outcome, Comparison::Match | Comparison::RowOrderMismatch), "{:?}", outcome);
        }
    }
}
