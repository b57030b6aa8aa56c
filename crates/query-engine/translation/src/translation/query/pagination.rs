//! Translate skip and take operations to LIMIT and OFFSET.

use query_engine_sql::sql;

/// Skip `count` more rows. A limit taken earlier now covers fewer rows.
pub fn skip(limit: &mut sql::ast::Limit, count: u64) {
    limit.offset = Some(limit.offset.unwrap_or(0).saturating_add(count));
    limit.limit = limit.limit.map(|rows| rows.saturating_sub(count));
}

/// Take at most `count` rows.
pub fn take(limit: &mut sql::ast::Limit, count: u64) {
    limit.limit = Some(limit.limit.map_or(count, |rows| rows.min(count)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(limit: &sql::ast::Limit) -> String {
        let mut sql = sql::string::SQL::new();
        limit.to_sql(&mut sql);
        sql.sql
    }

    #[test]
    fn skip_then_take() {
        let mut limit = sql::helpers::empty_limit();
        skip(&mut limit, 10);
        take(&mut limit, 100);
        assert_eq!(render(&limit), "LIMIT 100 OFFSET 10");
    }

    #[test]
    fn take_alone_has_no_offset() {
        let mut limit = sql::helpers::empty_limit();
        take(&mut limit, 1);
        assert_eq!(render(&limit), "LIMIT 1");
    }

    #[test]
    fn operations_compose_in_order() {
        let mut limit = sql::helpers::empty_limit();
        take(&mut limit, 100);
        skip(&mut limit, 10);
        take(&mut limit, 200);
        skip(&mut limit, 5);
        assert_eq!(render(&limit), "LIMIT 85 OFFSET 15");
    }

    #[test]
    fn skip_alone_uses_the_largest_limit() {
        let mut limit = sql::helpers::empty_limit();
        skip(&mut limit, 20);
        assert_eq!(render(&limit), "LIMIT 18446744073709551615 OFFSET 20");
    }
}
