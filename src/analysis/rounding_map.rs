use indexmap::IndexMap;

use crate::parser::{QueryComparers, QueryParser, TokenKind, TokenStream};

/// Aggregates whose outputs are floating point on at least one engine and
/// get the default precision when the query does not round them itself.
const FLOAT_AGGREGATES: &[&str] = &[
    "SUM", "AVG", "MEAN", "MEDIAN", "STDDEV", "STDDEV_POP", "STDDEV_SAMP", "VARIANCE", "VAR_POP",
    "VAR_SAMP", "PERCENTILE_CONT", "PERCENTILE_DISC", "APPROX_PERCENTILE", "CORR", "COVAR_POP",
    "COVAR_SAMP",
];

/// Keywords that close a projection list at its own depth.
const PROJECTION_END: &[&str] = &[
    "FROM", "WHERE", "GROUP", "ORDER", "HAVING", "LIMIT", "UNION", "INTERSECT", "EXCEPT", "QUALIFY",
    "WINDOW", "INTO", "FETCH",
];

/// Output column -> decimal precision, keyed case-insensitively.
///
/// Keys are compacted (lower-cased, whitespace removed) so an unaliased
/// `ROUND(AVG(price), 2)` matches whatever spacing the engine echoes back as
/// the column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundingMap {
    precisions: IndexMap<String, i32>,
}

impl RoundingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_key(name: &str) -> String {
        name.chars()
            .filter(|c| !c.is_whitespace() && *c != '"' && *c != '`')
            .collect::<String>()
            .to_lowercase()
    }

    pub fn insert(&mut self, column: &str, precision: i32) {
        self.precisions.insert(Self::column_key(column), precision);
    }

    pub fn with(mut self, column: &str, precision: i32) -> Self {
        self.insert(column, precision);
        self
    }

    pub fn precision_for(&self, column: &str) -> Option<i32> {
        self.precisions.get(&Self::column_key(column)).copied()
    }

    pub fn len(&self) -> usize {
        self.precisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precisions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &i32)> {
        self.precisions.iter()
    }

    /// Build the map from every projection list in `query`; outermost
    /// projections win over nested ones for the same output name.
    pub fn infer(query: &str, default_precision: i32) -> Self {
        let stream = QueryParser::tokenize_query(query);
        let depths = stream.depths();
        let comparers = QueryComparers::new();

        let mut nested = Self::new();
        let mut outer = Self::new();

        for select in stream.significant_indexes() {
            if !comparers.select.matches(&stream, select) {
                continue;
            }
            let target = if depths[select] == 0 { &mut outer } else { &mut nested };
            for item in Self::projection_items(&stream, &depths, select) {
                if let Some((alias, precision)) = Self::item_precision(&stream, &item, &comparers, default_precision) {
                    target.insert(&alias, precision);
                }
            }
        }

        for (column, precision) in outer.precisions {
            nested.precisions.insert(column, precision);
        }
        nested
    }

    /// Significant-token indexes of each comma-separated projection item
    /// following the SELECT at `select`.
    fn projection_items(stream: &TokenStream, depths: &[usize], select: usize) -> Vec<Vec<usize>> {
        let depth = depths[select];
        let mut cursor = stream.significant_after(select);

        while let Some(idx) = cursor {
            let token = &stream.tokens[idx];
            if token.is_any_keyword(&["DISTINCT", "ALL"]) {
                cursor = stream.significant_after(idx);
            } else if token.is_keyword("TOP") {
                cursor = stream.significant_after(idx).and_then(|n| stream.significant_after(n));
            } else {
                break;
            }
        }

        let mut items = Vec::new();
        let mut current = Vec::new();
        while let Some(idx) = cursor {
            let token = &stream.tokens[idx];
            if depths[idx] == depth {
                if token.is_punct(')') || token.is_punct(';') || token.is_any_keyword(PROJECTION_END) {
                    break;
                }
                if token.is_punct(',') {
                    items.push(std::mem::take(&mut current));
                    cursor = stream.significant_after(idx);
                    continue;
                }
            }
            current.push(idx);
            cursor = stream.significant_after(idx);
        }
        if !current.is_empty() {
            items.push(current);
        }
        items
    }

    fn item_precision(
        stream: &TokenStream,
        item: &[usize],
        comparers: &QueryComparers,
        default_precision: i32,
    ) -> Option<(String, i32)> {
        let alias = Self::item_alias(stream, item)?;

        for &idx in item {
            if comparers.round.matches(stream, idx) {
                let open = stream.significant_after(idx)?;
                let close = stream.matching_paren(open)?;
                let precision = Self::round_precision(stream, open, close).unwrap_or(default_precision);
                return Some((alias, precision));
            }
        }

        let aggregated = item.iter().any(|&idx| {
            stream.tokens[idx].is_any_keyword(FLOAT_AGGREGATES)
                && stream.significant_after(idx).is_some_and(|n| stream.tokens[n].is_punct('('))
        });
        aggregated.then_some((alias, default_precision))
    }

    /// The literal second argument of `ROUND(expr, n)`; `ROUND(expr)` is 0.
    fn round_precision(stream: &TokenStream, open: usize, close: usize) -> Option<i32> {
        let mut depth = 0usize;
        for idx in open + 1..close {
            let token = &stream.tokens[idx];
            if token.is_punct('(') {
                depth += 1;
            } else if token.is_punct(')') {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && token.is_punct(',') {
                let mut arg = stream.significant_after(idx)?;
                let negative = stream.tokens[arg].is_punct('-');
                if negative {
                    arg = stream.significant_after(arg)?;
                }
                let value = stream.tokens[arg].text.parse::<i32>().ok()?;
                return Some(if negative { -value } else { value });
            }
        }
        Some(0)
    }

    /// The output name of a projection item: explicit or implicit alias,
    /// the column part of `t.col`, or the compacted expression text.
    fn item_alias(stream: &TokenStream, item: &[usize]) -> Option<String> {
        let last = *item.last()?;
        let token = &stream.tokens[last];
        let named = matches!(token.kind, TokenKind::Word | TokenKind::QuotedIdentifier) && !token.is_keyword("END");

        if named {
            let aliased = match item.len() {
                1 => true,
                n => {
                    let prev = &stream.tokens[item[n - 2]];
                    prev.is_keyword("AS")
                        || prev.is_punct('.')
                        || prev.is_punct(')')
                        || matches!(
                            prev.kind,
                            TokenKind::Word | TokenKind::QuotedIdentifier | TokenKind::Number | TokenKind::StringLiteral
                        )
                }
            };
            if aliased {
                return Some(token.identifier_key());
            }
        }

        Some(item.iter().map(|&idx| stream.tokens[idx].text.as_str()).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_round_sets_precision_for_alias() {
        let map = RoundingMap::infer("SELECT ROUND(AVG(price), 2) AS avg_price FROM orders", 4);
        assert_eq!(map.precision_for("avg_price"), Some(2));
        assert_eq!(map.precision_for("AVG_PRICE"), Some(2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn aggregates_default_and_plain_columns_are_skipped() {
        let map = RoundingMap::infer(
            "select region, sum(amount) total, count(*) n, median(x) as m, t.price from sales t group by region",
            3,
        );
        assert_eq!(map.precision_for("total"), Some(3));
        assert_eq!(map.precision_for("m"), Some(3));
        assert_eq!(map.precision_for("n"), None);
        assert_eq!(map.precision_for("region"), None);
        assert_eq!(map.precision_for("price"), None);
    }

    #[test]
    fn unaliased_expressions_are_keyed_by_compact_text() {
        let map = RoundingMap::infer("SELECT ROUND( SUM(v) , 1 ) FROM t", 2);
        assert_eq!(map.precision_for("round(sum(v), 1)"), Some(1));
        assert_eq!(map.precision_for("ROUND(SUM(V),1)"), Some(1));
    }

    #[test]
    fn round_without_digits_and_negative_digits() {
        let map = RoundingMap::infer("SELECT ROUND(a) a0, ROUND(b, -2) b2, ROUND(c, :p) c1 FROM t", 2);
        assert_eq!(map.precision_for("a0"), Some(0));
        assert_eq!(map.precision_for("b2"), Some(-2));
        // non-literal precision falls back to the default
        assert_eq!(map.precision_for("c1"), Some(2));
    }

    #[test]
    fn nested_projection_rounding_reaches_outer_alias() {
        let map = RoundingMap::infer(
            "WITH s AS (SELECT id, ROUND(AVG(v), 4) AS score FROM t GROUP BY id) \
             SELECT id, score FROM s ORDER BY score",
            2,
        );
        assert_eq!(map.precision_for("score"), Some(4));
        assert_eq!(map.precision_for("id"), None);
    }

    #[test]
    fn outer_projection_overrides_nested() {
        let map = RoundingMap::infer(
            "SELECT ROUND(score, 1) score FROM (SELECT ROUND(v, 4) AS score FROM t) x",
            2,
        );
        assert_eq!(map.precision_for("score"), Some(1));
    }

    #[test]
    fn distinct_and_extract_from_do_not_break_projection() {
        let map = RoundingMap::infer(
            "SELECT DISTINCT EXTRACT(YEAR FROM d) AS y, AVG(v) AS a FROM t GROUP BY 1",
            2,
        );
        assert_eq!(map.precision_for("a"), Some(2));
        assert_eq!(map.precision_for("y"), None);
    }

    #[test]
    fn infer_on_garbage_is_empty() {
        assert!(RoundingMap::infer("", 2).is_empty());
        assert!(RoundingMap::infer("SELECT", 2).is_empty());
        assert!(RoundingMap::infer("SELECT ROUND(", 2).is_empty());
    }
}
