use std::collections::HashSet;

use crate::parser::{QueryComparers, QueryParser, TokenKind, TokenStream};

/// Words that can follow FROM/JOIN but are never a table name.
const NOT_A_TABLE: &[&str] = &["SELECT", "LATERAL", "UNNEST", "VALUES", "TABLE", "WITH", "ONLY"];

/// Words that end a table reference instead of being its alias.
const REFERENCE_END: &[&str] = &[
    "WHERE", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "OUTER", "CROSS", "NATURAL", "ON", "USING",
    "GROUP", "ORDER", "HAVING", "LIMIT", "OFFSET", "UNION", "INTERSECT", "EXCEPT", "QUALIFY", "WINDOW",
    "FETCH", "TABLESAMPLE", "PIVOT", "UNPIVOT", "SAMPLE", "AT", "BEFORE", "CHANGES",
];

/// Rewrites bare table references after FROM/JOIN into `database.table`.
///
/// References that are already dot-qualified, name a CTE, are quoted, or sit
/// behind a subquery/table function are left untouched. When the boundaries
/// of a reference can't be told apart it stays unqualified.
pub struct TableQualifier;

impl TableQualifier {
    pub fn qualify(query: &str, database: &str) -> String {
        let database = database.trim();
        if database.is_empty() {
            return query.to_string();
        }

        let stream = QueryParser::tokenize_query(query);
        let comparers = QueryComparers::new();
        let ctes = Self::cte_names(&stream, &comparers);

        let mut qualify_at: HashSet<usize> = HashSet::new();
        for idx in stream.significant_indexes() {
            let from = comparers.from.matches(&stream, idx);
            if !from && !comparers.join.matches(&stream, idx) {
                continue;
            }
            if from && (Self::inside_function_call(&stream, idx) || Self::distinct_from(&stream, idx)) {
                continue;
            }
            Self::collect_references(&stream, idx, from, &ctes, &mut qualify_at);
        }

        if qualify_at.is_empty() {
            return query.to_string();
        }

        stream
            .tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                if qualify_at.contains(&i) {
                    format!("{}.{}", database, token.text)
                } else {
                    token.text.clone()
                }
            })
            .collect()
    }

    /// Names defined by every `WITH [RECURSIVE] name [(cols)] AS (...)` list.
    pub fn cte_names(stream: &TokenStream, comparers: &QueryComparers) -> HashSet<String> {
        let mut names = HashSet::new();

        for with in stream.significant_indexes() {
            if !comparers.with.matches(stream, with) {
                continue;
            }
            let mut cursor = stream.significant_after(with);
            if let Some(idx) = cursor {
                if stream.tokens[idx].is_keyword("RECURSIVE") {
                    cursor = stream.significant_after(idx);
                }
            }

            while let Some(name_idx) = cursor {
                let name = &stream.tokens[name_idx];
                if !matches!(name.kind, TokenKind::Word | TokenKind::QuotedIdentifier) {
                    break;
                }

                let mut next = stream.significant_after(name_idx);
                // optional column list
                if let Some(idx) = next.filter(|&i| stream.tokens[i].is_punct('(')) {
                    next = stream.matching_paren(idx).and_then(|close| stream.significant_after(close));
                }
                let Some(as_idx) = next.filter(|&i| comparers.alias.matches(stream, i)) else { break };

                let mut body = stream.significant_after(as_idx);
                while let Some(idx) = body.filter(|&i| stream.tokens[i].is_any_keyword(&["NOT", "MATERIALIZED"])) {
                    body = stream.significant_after(idx);
                }
                let Some(open) = body.filter(|&i| stream.tokens[i].is_punct('(')) else { break };

                names.insert(name.identifier_key());

                let Some(close) = stream.matching_paren(open) else { break };
                cursor = match stream.significant_after(close) {
                    Some(comma) if stream.tokens[comma].is_punct(',') => stream.significant_after(comma),
                    _ => None,
                };
            }
        }

        names
    }

    /// `FROM` used as an argument separator, e.g. `EXTRACT(YEAR FROM d)` or
    /// `TRIM(BOTH ' ' FROM s)`, rather than as a clause.
    fn inside_function_call(stream: &TokenStream, idx: usize) -> bool {
        let Some(open) = stream.enclosing_paren(idx) else { return false };
        match stream.significant_after(open) {
            Some(first) => {
                let token = &stream.tokens[first];
                !(token.is_any_keyword(&["SELECT", "WITH"]) || token.is_punct('('))
            }
            None => false,
        }
    }

    /// `FROM` of the `a IS [NOT] DISTINCT FROM b` comparison.
    fn distinct_from(stream: &TokenStream, idx: usize) -> bool {
        let Some(distinct) = stream.significant_before(idx).filter(|&i| stream.tokens[i].is_keyword("DISTINCT")) else {
            return false;
        };
        let mut before = stream.significant_before(distinct);
        if let Some(not) = before.filter(|&i| stream.tokens[i].is_keyword("NOT")) {
            before = stream.significant_before(not);
        }
        before.is_some_and(|i| stream.tokens[i].is_keyword("IS"))
    }

    fn collect_references(
        stream: &TokenStream,
        keyword: usize,
        comma_list: bool,
        ctes: &HashSet<String>,
        qualify_at: &mut HashSet<usize>,
    ) {
        let mut cursor = stream.significant_after(keyword);

        while let Some(name_idx) = cursor {
            let name = &stream.tokens[name_idx];
            if name.kind != TokenKind::Word || name.is_any_keyword(NOT_A_TABLE) || name.is_any_keyword(REFERENCE_END) {
                // subquery, quoted identifier or something we can't read: leave it
                return;
            }

            // walk over `a.b.c`; the reference ends at its last part
            let mut last = name_idx;
            let mut dotted = false;
            while let Some(dot) = stream.significant_after(last).filter(|&i| stream.tokens[i].is_punct('.')) {
                dotted = true;
                match stream.significant_after(dot) {
                    Some(part) => last = part,
                    None => return,
                }
            }

            let after = stream.significant_after(last);
            let table_function = after.is_some_and(|i| stream.tokens[i].is_punct('('));
            if table_function {
                return;
            }

            if !dotted && !ctes.contains(&name.identifier_key()) {
                qualify_at.insert(name_idx);
            }

            if !comma_list {
                return;
            }

            // skip `[AS] alias` then continue on a comma
            let mut next = after;
            if let Some(idx) = next.filter(|&i| stream.tokens[i].is_keyword("AS")) {
                next = stream.significant_after(idx).and_then(|alias| stream.significant_after(alias));
            } else if let Some(idx) = next.filter(|&i| {
                let t = &stream.tokens[i];
                matches!(t.kind, TokenKind::Word | TokenKind::QuotedIdentifier) && !t.is_any_keyword(REFERENCE_END)
            }) {
                next = stream.significant_after(idx);
            }

            cursor = match next {
                Some(comma) if stream.tokens[comma].is_punct(',') => stream.significant_after(comma),
                _ => None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn qualify_bare_tables_and_keep_aliases() {
        assert_eq!(
            TableQualifier::qualify("SELECT o.id FROM orders o JOIN customers AS c ON o.cid = c.id", "sales"),
            "SELECT o.id FROM sales.orders o JOIN sales.customers AS c ON o.cid = c.id"
        );
    }

    #[test]
    fn qualify_skips_already_qualified() {
        let query = "SELECT * FROM sales.orders JOIN other.db.items i ON true";
        assert_eq!(TableQualifier::qualify(query, "sales"), query);
    }

    #[test]
    fn qualify_skips_cte_names() {
        let query = "WITH recent AS (SELECT * FROM orders WHERE d > 1), \
                     totals (id, s) AS (SELECT id, SUM(v) FROM recent GROUP BY id) \
                     SELECT * FROM totals t JOIN customers c ON c.id = t.id";
        assert_eq!(
            TableQualifier::qualify(query, "sales"),
            "WITH recent AS (SELECT * FROM sales.orders WHERE d > 1), \
             totals (id, s) AS (SELECT id, SUM(v) FROM recent GROUP BY id) \
             SELECT * FROM totals t JOIN sales.customers c ON c.id = t.id"
        );
    }

    #[test]
    fn qualify_cte_match_is_case_insensitive() {
        let query = "with Recent as (select 1 x) select * from RECENT";
        assert_eq!(TableQualifier::qualify(query, "db"), query);
    }

    #[test]
    fn qualify_subqueries_but_not_function_from() {
        assert_eq!(
            TableQualifier::qualify(
                "SELECT EXTRACT(YEAR FROM d) y FROM (SELECT d FROM events) e WHERE id IN (SELECT id FROM vip)",
                "db"
            ),
            "SELECT EXTRACT(YEAR FROM d) y FROM (SELECT d FROM db.events) e WHERE id IN (SELECT id FROM db.vip)"
        );
    }

    #[test]
    fn qualify_leaves_is_distinct_from_operands_alone() {
        assert_eq!(
            TableQualifier::qualify("SELECT a FROM t WHERE a IS DISTINCT FROM b", "db"),
            "SELECT a FROM db.t WHERE a IS DISTINCT FROM b"
        );
        assert_eq!(
            TableQualifier::qualify("SELECT a FROM t JOIN u ON t.k is not distinct from u.k", "db"),
            "SELECT a FROM db.t JOIN db.u ON t.k is not distinct from u.k"
        );
        // plain SELECT DISTINCT is still a clause boundary
        assert_eq!(
            TableQualifier::qualify("SELECT DISTINCT a FROM t", "db"),
            "SELECT DISTINCT a FROM db.t"
        );
    }

    #[test]
    fn qualify_comma_separated_from_list() {
        assert_eq!(
            TableQualifier::qualify("SELECT * FROM a x, b AS y, c WHERE x.id = y.id", "db"),
            "SELECT * FROM db.a x, db.b AS y, db.c WHERE x.id = y.id"
        );
    }

    #[test]
    fn qualify_leaves_quoted_and_table_functions_alone() {
        let query = "SELECT * FROM \"Orders\" JOIN generate_series(1, 3) g ON true";
        assert_eq!(TableQualifier::qualify(query, "db"), query);
        let query = "SELECT [from] FROM [Order Lines] JOIN [dbo].[items] i ON true";
        assert_eq!(TableQualifier::qualify(query, "db"), query);
    }

    #[test]
    fn qualify_ignores_literals_and_comments() {
        let query = "SELECT 'from orders' AS s FROM t -- join x\n";
        assert_eq!(
            TableQualifier::qualify(query, "db"),
            "SELECT 'from orders' AS s FROM db.t -- join x\n"
        );
    }

    #[test]
    fn qualify_is_idempotent() {
        let query = "WITH c AS (SELECT * FROM raw) SELECT * FROM c JOIN dim d ON d.k = c.k, extra";
        let once = TableQualifier::qualify(query, "sales");
        assert_eq!(TableQualifier::qualify(&once, "sales"), once);
    }

    #[test]
    fn qualify_with_empty_database_is_identity() {
        assert_eq!(TableQualifier::qualify("SELECT * FROM t", "  "), "SELECT * FROM t");
    }

    #[test]
    fn qualify_unbalanced_query_degrades_gracefully() {
        let query = "WITH broken AS (SELECT * FROM t SELECT * FROM broken";
        let out = TableQualifier::qualify(query, "db");
        assert!(out.contains("FROM db.t"));
        // the CTE body never closes, so the name is still recognised
        assert!(out.ends_with("FROM broken"));
    }

    proptest! {
        #[test]
        fn qualify_twice_equals_once(
            tables in prop::collection::vec("t_[a-z]{1,5}", 1..4),
            with_cte in any::<bool>(),
        ) {
            let mut query = String::new();
            if with_cte {
                query.push_str(&format!("WITH cte AS (SELECT * FROM {}) ", tables[0]));
            }
            query.push_str(&format!("SELECT * FROM {} a", tables.join(", ")));
            if with_cte {
                query.push_str(" JOIN cte c ON c.id = a.id");
            }
            let once = TableQualifier::qualify(&query, "db");
            prop_assert_eq!(TableQualifier::qualify(&once, "db"), once.clone());
            prop_assert!(!once.contains("db.cte"));
        }
    }
}
