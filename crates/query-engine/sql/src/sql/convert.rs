//! Convert a MySQL AST to a low-level SQL string.

use super::ast::*;
use super::string::SQL;

// Clauses //

impl SelectList {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("SELECT ");
        if self.columns.is_empty() {
            sql.append_syntax("*");
        }
        for (index, (alias, expression)) in self.columns.iter().enumerate() {
            if index > 0 {
                sql.append_syntax(", ");
            }
            expression.to_sql(sql);
            sql.append_syntax(" AS ");
            alias.to_sql(sql);
        }
        for raw in &self.after_columns {
            sql.append_syntax(" ");
            raw.to_sql(sql);
        }
    }
}

impl Filter {
    pub fn to_sql(&self, sql: &mut SQL) {
        if self.conditions.is_empty() {
            return;
        }
        match self.clause {
            FilterClause::Where => sql.append_syntax("WHERE "),
            FilterClause::Having => sql.append_syntax("HAVING "),
        }
        for (index, condition) in self.conditions.iter().enumerate() {
            if index > 0 {
                sql.append_syntax(" AND ");
            }
            condition.to_sql(sql);
        }
    }
}

impl OrderBy {
    pub fn to_sql(&self, sql: &mut SQL) {
        if self.elements.is_empty() {
            return;
        }
        sql.append_syntax("ORDER BY ");
        for (index, element) in self.elements.iter().enumerate() {
            if index > 0 {
                sql.append_syntax(", ");
            }
            element.to_sql(sql);
        }
    }
}

impl OrderByElement {
    pub fn to_sql(&self, sql: &mut SQL) {
        self.target.to_sql(sql);
        self.direction.to_sql(sql);
    }
}

impl OrderByDirection {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            OrderByDirection::Asc => sql.append_syntax(" ASC"),
            OrderByDirection::Desc => sql.append_syntax(" DESC"),
        }
    }
}

impl Limit {
    /// MySQL has no OFFSET without LIMIT, so an offset alone is written with the
    /// largest possible limit.
    pub fn to_sql(&self, sql: &mut SQL) {
        let offset = self.offset.filter(|offset| *offset > 0);
        match (self.limit, offset) {
            (None, None) => {}
            (Some(limit), None) => {
                sql.append_syntax(&format!("LIMIT {limit}"));
            }
            (limit, Some(offset)) => {
                let limit = limit.unwrap_or(u64::MAX);
                sql.append_syntax(&format!("LIMIT {limit} OFFSET {offset}"));
            }
        }
    }
}

impl OuterSelect {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("SELECT ");
        match &self.select_list {
            OuterSelectList::CountStar => sql.append_syntax("COUNT(*)"),
            OuterSelectList::Columns(columns) => {
                for (index, column) in columns.iter().enumerate() {
                    if index > 0 {
                        sql.append_syntax(", ");
                    }
                    self.alias.to_sql(sql);
                    sql.append_syntax(".");
                    column.to_sql(sql);
                }
            }
        }
        for raw in &self.after_columns {
            sql.append_syntax(" ");
            raw.to_sql(sql);
        }
        sql.append_syntax(" FROM (");
        self.inner.to_sql(sql);
        sql.append_syntax(") AS ");
        self.alias.to_sql(sql);
    }
}

// Scalars //

impl Expression {
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            Expression::ColumnReference(column_reference) => column_reference.to_sql(sql),
            Expression::Value(value) => sql.append_param(value.clone()),
            Expression::RawSql(raw) => raw.to_sql(sql),
            Expression::And { left, right } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                sql.append_syntax(" AND ");
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Or { left, right } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                sql.append_syntax(" OR ");
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Not(expr) => {
                sql.append_syntax("NOT (");
                expr.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::BinaryOperation {
                left,
                operator,
                right,
            } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                operator.to_sql(sql);
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::BinaryArrayOperation {
                left,
                operator,
                right,
            } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                operator.to_sql(sql);
                sql.append_syntax("(");
                for (index, item) in right.iter().enumerate() {
                    if index > 0 {
                        sql.append_syntax(", ");
                    }
                    item.to_sql(sql);
                }
                sql.append_syntax("))");
            }
            Expression::UnaryOperation {
                expression,
                operator: UnaryOperator::Negate,
            } => {
                sql.append_syntax("-(");
                expression.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::UnaryOperation {
                expression,
                operator,
            } => {
                sql.append_syntax("(");
                expression.to_sql(sql);
                operator.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::FunctionCall { function, args } => {
                function.to_sql(sql);
                sql.append_syntax("(");
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        sql.append_syntax(", ");
                    }
                    arg.to_sql(sql);
                }
                sql.append_syntax(")");
            }
        }
    }
}

impl UnaryOperator {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            UnaryOperator::IsNull => sql.append_syntax(" IS NULL"),
            UnaryOperator::IsNotNull => sql.append_syntax(" IS NOT NULL"),
            UnaryOperator::Negate => sql.append_syntax("-"),
        }
    }
}

impl BinaryOperator {
    pub fn to_sql(&self, sql: &mut SQL) {
        let operator = match self {
            BinaryOperator::Equals => " = ",
            BinaryOperator::NotEquals => " != ",
            BinaryOperator::LessThan => " < ",
            BinaryOperator::LessThanOrEqualTo => " <= ",
            BinaryOperator::GreaterThan => " > ",
            BinaryOperator::GreaterThanOrEqualTo => " >= ",
            BinaryOperator::Add => " + ",
            BinaryOperator::Subtract => " - ",
            BinaryOperator::Multiply => " * ",
            BinaryOperator::Divide => " / ",
            BinaryOperator::Modulo => " % ",
            BinaryOperator::Like => " LIKE ",
        };
        sql.append_syntax(operator);
    }
}

impl BinaryArrayOperator {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            BinaryArrayOperator::In => sql.append_syntax(" IN "),
        }
    }
}

impl Function {
    pub fn to_sql(&self, sql: &mut SQL) {
        let name = match self {
            Function::Concat => "CONCAT",
            Function::If => "IF",
            Function::Now => "NOW",
            Function::UtcTimestamp => "UTC_TIMESTAMP",
            Function::CurDate => "CURDATE",
            Function::Uuid => "UUID",
            Function::Year => "YEAR",
            Function::Month => "MONTH",
            Function::Day => "DAY",
            Function::Hour => "HOUR",
            Function::Minute => "MINUTE",
            Function::Second => "SECOND",
            Function::DayOfWeek => "DAYOFWEEK",
            Function::DayOfYear => "DAYOFYEAR",
            Function::Upper => "UPPER",
            Function::Lower => "LOWER",
            Function::Trim => "TRIM",
        };
        sql.append_syntax(name);
    }
}

impl ColumnReference {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            ColumnReference::Column(name) => name.to_sql(sql),
            ColumnReference::Mapped(raw) => raw.to_sql(sql),
        }
    }
}

impl ColumnName {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.0);
    }
}

impl TableAlias {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.name);
    }
}

impl ColumnAlias {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.name);
    }
}

impl RawSql {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax(&self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::helpers;
    use query_engine_metadata::metadata::Literal;

    fn print(expression: &Expression) -> SQL {
        let mut sql = SQL::new();
        expression.to_sql(&mut sql);
        sql
    }

    #[test]
    fn binary_operations_are_parenthesised() {
        let expression = Expression::BinaryOperation {
            left: Box::new(helpers::column("Id")),
            operator: BinaryOperator::Equals,
            right: Box::new(Expression::Value(Literal::Int(1))),
        };
        let sql = print(&expression);
        assert_eq!(sql.sql, "(`Id` = @P1000)");
        assert_eq!(sql.params.get("@P1000"), Some(&Literal::Int(1)));
    }

    #[test]
    fn null_checks_bind_nothing() {
        let expression = Expression::UnaryOperation {
            expression: Box::new(helpers::column("Name")),
            operator: UnaryOperator::IsNotNull,
        };
        let sql = print(&expression);
        assert_eq!(sql.sql, "(`Name` IS NOT NULL)");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn negations_enclose_their_operand() {
        let expression = helpers::binary(
            Expression::Not(Box::new(helpers::column("IsActive"))),
            BinaryOperator::Equals,
            Expression::UnaryOperation {
                expression: Box::new(helpers::column("Delta")),
                operator: UnaryOperator::Negate,
            },
        );
        assert_eq!(print(&expression).sql, "(NOT (`IsActive`) = -(`Delta`))");
    }

    #[test]
    fn in_lists_bind_each_item() {
        let expression = Expression::BinaryArrayOperation {
            left: Box::new(helpers::column("Id")),
            operator: BinaryArrayOperator::In,
            right: vec![
                Expression::Value(Literal::Int(1)),
                Expression::Value(Literal::Int(2)),
            ],
        };
        assert_eq!(print(&expression).sql, "(`Id` IN (@P1000, @P1001))");
    }

    #[test]
    fn offsets_without_limits_use_the_largest_limit() {
        let mut sql = SQL::new();
        Limit {
            limit: None,
            offset: Some(5),
        }
        .to_sql(&mut sql);
        assert_eq!(sql.sql, "LIMIT 18446744073709551615 OFFSET 5");

        let mut sql = SQL::new();
        Limit {
            limit: Some(1),
            offset: Some(0),
        }
        .to_sql(&mut sql);
        assert_eq!(sql.sql, "LIMIT 1");
    }

    #[test]
    fn empty_select_lists_select_everything() {
        let select = SelectList {
            columns: vec![],
            after_columns: vec![RawSql(", NOW() AS `FetchedAt`".to_string())],
        };
        let mut sql = SQL::new();
        select.to_sql(&mut sql);
        assert_eq!(sql.sql, "SELECT * , NOW() AS `FetchedAt`");
    }

    #[test]
    fn outer_selects_qualify_columns_with_the_alias() {
        let outer = OuterSelect {
            select_list: OuterSelectList::Columns(vec![ColumnAlias {
                name: "Name".to_string(),
            }]),
            after_columns: vec![],
            inner: RawSql("SELECT * FROM fake".to_string()),
            alias: TableAlias {
                name: "t0".to_string(),
            },
        };
        let mut sql = SQL::new();
        outer.to_sql(&mut sql);
        assert_eq!(sql.sql, "SELECT `t0`.`Name` FROM (SELECT * FROM fake) AS `t0`");
    }
}
