use crate::parser::WordComparer;

#[derive(Debug)]
pub struct QueryComparers {
    pub select: WordComparer,
    pub from: WordComparer,
    pub join: WordComparer,
    pub with: WordComparer,
    pub alias: WordComparer,
    pub r#where: WordComparer,
    pub group_by: WordComparer,
    pub having: WordComparer,
    pub order_by: WordComparer,
    pub distinct: WordComparer,
    pub qualify: WordComparer,
    pub limit: WordComparer,
    pub fetch_first: WordComparer,
    pub union: WordComparer,
    pub intersect: WordComparer,
    pub except: WordComparer,
    pub exists: WordComparer,
    pub nested_select: WordComparer,
    pub case_when: WordComparer,
    pub r#if: WordComparer,
    pub rank: WordComparer,
    pub row_number: WordComparer,
    pub dense_rank: WordComparer,
    pub over: WordComparer,
    pub is_null: WordComparer,
    pub is_not_null: WordComparer,
    pub round: WordComparer,
}

impl Default for QueryComparers {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComparers {
    pub fn new() -> Self {
        Self {
            select: WordComparer::new("SELECT"),
            from: WordComparer::new("FROM"),
            join: WordComparer::new("JOIN"),
            with: WordComparer::new("WITH"),
            alias: WordComparer::new("AS"),
            r#where: WordComparer::new("WHERE"),
            group_by: WordComparer::new("GROUP BY"),
            having: WordComparer::new("HAVING"),
            order_by: WordComparer::new("ORDER BY"),
            distinct: WordComparer::new("DISTINCT"),
            qualify: WordComparer::new("QUALIFY"),
            limit: WordComparer::new("LIMIT"),
            fetch_first: WordComparer::new("FETCH FIRST"),
            union: WordComparer::new("UNION"),
            intersect: WordComparer::new("INTERSECT"),
            except: WordComparer::new("EXCEPT"),
            exists: WordComparer::new("EXISTS").with_delimiter('('),
            nested_select: WordComparer::new("(SELECT"),
            case_when: WordComparer::new("CASE WHEN"),
            r#if: WordComparer::new("IF").with_delimiter('('),
            rank: WordComparer::new("RANK()"),
            row_number: WordComparer::new("ROW_NUMBER()"),
            dense_rank: WordComparer::new("DENSE_RANK()"),
            over: WordComparer::new("OVER").with_delimiter('('),
            is_null: WordComparer::new("IS NULL"),
            is_not_null: WordComparer::new("IS NOT NULL"),
            round: WordComparer::new("ROUND").with_delimiter('('),
        }
    }
}
