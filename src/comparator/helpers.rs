use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde_json::Value;

use crate::normalizer::NormalizedCell;

pub struct Helpers;

impl Helpers {
    /// Stable string key for a whole row, used to spot duplicates.
    pub fn canonical_tuple(cells: &[NormalizedCell]) -> String {
        Value::Array(cells.iter().map(NormalizedCell::to_value).collect()).to_string()
    }

    /// Half away from zero. Negative precision rounds to tens, hundreds...
    pub fn round_to(value: f64, precision: i32) -> f64 {
        let rounded = if precision >= 0 {
            let factor = 10f64.powi(precision);
            (value * factor).round() / factor
        } else {
            let factor = 10f64.powi(-precision);
            (value / factor).round() * factor
        };
        if rounded == 0.0 { 0.0 } else { rounded }
    }

    pub fn fixed(value: f64, precision: i32) -> String {
        let rounded = Self::round_to(value, precision);
        format!("{:.*}", precision.max(0) as usize, rounded)
    }

    // NULLS LAST, numbers before text; numbers by rounded value when a precision is known
    pub fn cmp_cells_for_sort(a: &NormalizedCell, b: &NormalizedCell, precision: Option<i32>) -> Ordering {
        use NormalizedCell::*;
        match (a, b) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Greater,
            (_, Null) => Ordering::Less,
            (Number(x), Number(y)) => {
                let (x, y) = match precision {
                    Some(p) => (Self::round_to(*x, p), Self::round_to(*y, p)),
                    None => (*x, *y),
                };
                OrderedFloat(x).cmp(&OrderedFloat(y))
            }
            (Text(x), Text(y)) => x.cmp(y),
            (lhs, rhs) => Self::type_rank(lhs).cmp(&Self::type_rank(rhs)),
        }
    }

    /// Lexicographic over the row, column by column.
    pub fn cmp_rows(a: &[NormalizedCell], b: &[NormalizedCell], precisions: &[Option<i32>]) -> Ordering {
        a.iter()
            .zip(b.iter())
            .enumerate()
            .map(|(i, (x, y))| Self::cmp_cells_for_sort(x, y, precisions.get(i).copied().flatten()))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or_else(|| a.len().cmp(&b.len()))
    }

    fn type_rank(cell: &NormalizedCell) -> u8 {
        match cell {
            NormalizedCell::Number(_) => 0,
            NormalizedCell::Text(_) => 1,
            NormalizedCell::Null => 2,
        }
    }
}
