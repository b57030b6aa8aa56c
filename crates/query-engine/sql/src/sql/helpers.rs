//! Helpers for building sql::ast types in certain shapes and patterns.

use super::ast::*;

/// Prefix of the aliases generated for wrapping subqueries.
pub const TABLE_ALIAS_PREFIX: &str = "t";

// Empty clauses //

/// An empty `ORDER BY` clause.
pub fn empty_order_by() -> OrderBy {
    OrderBy { elements: vec![] }
}

/// Empty `LIMIT` and `OFFSET` clauses.
pub fn empty_limit() -> Limit {
    Limit {
        limit: None,
        offset: None,
    }
}

// Expressions //

/// A reference to a column by name.
pub fn column(name: &str) -> Expression {
    Expression::ColumnReference(ColumnReference::Column(ColumnName(name.to_string())))
}

/// The `'%'` wildcard of LIKE patterns.
pub fn like_wildcard() -> Expression {
    Expression::RawSql(RawSql("'%'".to_string()))
}

pub fn function_call(function: Function, args: Vec<Expression>) -> Expression {
    Expression::FunctionCall { function, args }
}

pub fn binary(left: Expression, operator: BinaryOperator, right: Expression) -> Expression {
    Expression::BinaryOperation {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}

// Aliasing //

pub fn make_column_alias(name: String) -> ColumnAlias {
    ColumnAlias { name }
}

/// Find an alias `t0`, `t1`, ... that does not already occur, quoted, anywhere in
/// the given SQL. The comparison ignores case.
pub fn unique_table_alias(sql: &str) -> TableAlias {
    let haystack = sql.to_lowercase();
    let mut index: u64 = 0;
    loop {
        let name = format!("{TABLE_ALIAS_PREFIX}{index}");
        if !haystack.contains(&format!("`{name}`")) {
            return TableAlias { name };
        }
        index += 1;
    }
}
