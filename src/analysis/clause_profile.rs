use serde::Serialize;

use crate::parser::{QueryComparers, QueryParser, TokenStream, WordComparer};

/// Which semantically significant clauses a query text contains.
///
/// Built once per query text; it only selects comparison strategy and the
/// clause-specific checks, it never changes the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClauseProfile {
    pub has_group_by: bool,
    pub has_order_by: bool,
    pub has_having: bool,
    pub has_distinct: bool,
    /// `SELECT DISTINCT` of the outermost query, the only one that makes
    /// output rows unique.
    pub has_outer_distinct: bool,
    pub has_join: bool,
    pub has_limit: bool,
    pub has_union: bool,
    pub has_subquery: bool,
    pub has_window: bool,
    pub has_null_check: bool,
    pub has_qualify: bool,
    pub has_case: bool,
    pub has_where: bool,
}

impl ClauseProfile {
    pub fn detect(query: &str) -> Self {
        Self::detect_in(&QueryParser::tokenize_query(query))
    }

    pub fn detect_in(stream: &TokenStream) -> Self {
        let c = QueryComparers::new();
        let depths = stream.depths();
        let mut profile = Self::default();
        let mut bag_set_operation = false;

        for i in stream.significant_indexes() {
            let hit = |comparer: &WordComparer| comparer.matches(stream, i);

            profile.has_group_by |= hit(&c.group_by);
            // only an outermost ORDER BY fixes the order of the output rows
            profile.has_order_by |= depths[i] == 0 && hit(&c.order_by);
            profile.has_having |= hit(&c.having);
            profile.has_distinct |= hit(&c.distinct);
            if depths[i] == 0 {
                let token = &stream.tokens[i];
                profile.has_outer_distinct |= token.is_keyword("DISTINCT")
                    && stream.significant_before(i).is_some_and(|p| stream.tokens[p].is_keyword("SELECT"));
                bag_set_operation |= token.is_any_keyword(&["UNION", "INTERSECT", "EXCEPT"])
                    && stream.significant_after(i).is_some_and(|n| stream.tokens[n].is_keyword("ALL"));
            }
            profile.has_join |= hit(&c.join);
            profile.has_limit |= hit(&c.limit) || hit(&c.fetch_first);
            profile.has_union |= hit(&c.union) || hit(&c.intersect) || hit(&c.except);
            profile.has_subquery |= hit(&c.nested_select) || hit(&c.exists);
            profile.has_window |= hit(&c.rank) || hit(&c.row_number) || hit(&c.dense_rank) || hit(&c.over);
            profile.has_null_check |= hit(&c.is_null) || hit(&c.is_not_null);
            profile.has_qualify |= hit(&c.qualify);
            profile.has_case |= hit(&c.case_when) || hit(&c.r#if);
            profile.has_where |= hit(&c.r#where);
        }

        // `UNION ALL` and friends may reintroduce duplicates after a DISTINCT branch
        profile.has_outer_distinct &= !bag_set_operation;
        profile
    }

    /// Row order only matters when the query asks for it.
    pub fn requires_ordering(&self) -> bool {
        self.has_order_by
    }
}
