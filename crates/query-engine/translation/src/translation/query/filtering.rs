//! Handle filtering/where clauses translation.

use query_engine_metadata::metadata::Literal;
use query_engine_plan::plan::{BinaryOperator, UnaryOperator};
use query_engine_sql::sql;

use super::methods;
use super::node::Node;
use crate::translation::error::Error;
use crate::translation::helpers::Env;

/// Translate the predicate of one filter. A filter that is always true, or that tests
/// membership of an empty collection, contributes no condition.
pub fn translate_filter(env: &Env, node: &Node) -> Result<Option<sql::ast::Expression>, Error> {
    if node.is_bool(true) {
        return Ok(None);
    }
    if methods::is_empty_in_list(node) {
        tracing::warn!("Ignoring filter '{}': the collection is empty", node);
        return Ok(None);
    }
    translate_expression(env, node).map(Some)
}

/// Translate a boolean or scalar expression.
pub fn translate_expression(env: &Env, node: &Node) -> Result<sql::ast::Expression, Error> {
    match node {
        Node::Binary {
            op: BinaryOperator::AndAlso,
            left,
            right,
        } => Ok(sql::ast::Expression::And {
            left: Box::new(translate_expression(env, left)?),
            right: Box::new(translate_expression(env, right)?),
        }),
        Node::Binary {
            op: BinaryOperator::OrElse,
            left,
            right,
        } => Ok(sql::ast::Expression::Or {
            left: Box::new(translate_expression(env, left)?),
            right: Box::new(translate_expression(env, right)?),
        }),
        Node::Binary { op, left, right } => match null_check(*op, left, right) {
            Some((operand, operator)) => Ok(sql::ast::Expression::UnaryOperation {
                expression: Box::new(translate_expression(env, operand)?),
                operator,
            }),
            None => Ok(sql::helpers::binary(
                translate_expression(env, left)?,
                translate_operator(*op)?,
                translate_expression(env, right)?,
            )),
        },
        Node::Unary {
            op: UnaryOperator::Not,
            operand,
        } => Ok(sql::ast::Expression::Not(Box::new(translate_expression(
            env, operand,
        )?))),
        Node::Unary {
            op: UnaryOperator::Negate,
            operand,
        } => Ok(sql::ast::Expression::UnaryOperation {
            expression: Box::new(translate_expression(env, operand)?),
            operator: sql::ast::UnaryOperator::Negate,
        }),
        Node::Field(name) => Ok(sql::ast::Expression::ColumnReference(env.column(name)?)),
        Node::Literal(Literal::Array(_)) => Err(Error::ArrayNotSupported(node.to_string())),
        Node::Literal(value) => Ok(sql::ast::Expression::Value(value.clone())),
        Node::Call {
            name,
            target,
            args,
            is_static,
        } => methods::translate_call(env, name, target.as_deref(), args, *is_static)?
            .ok_or_else(|| Error::UnsupportedMethod(node.to_string())),
        Node::Conditional {
            test,
            when_true,
            when_false,
        } => Ok(sql::helpers::function_call(
            sql::ast::Function::If,
            vec![
                translate_expression(env, test)?,
                translate_expression(env, when_true)?,
                translate_expression(env, when_false)?,
            ],
        )),
        Node::Sql(expression) => Ok(expression.clone()),
    }
}

/// `x == null` and `x != null`, on either side, test for null rather than bind it.
fn null_check<'a>(
    op: BinaryOperator,
    left: &'a Node,
    right: &'a Node,
) -> Option<(&'a Node, sql::ast::UnaryOperator)> {
    let operator = match op {
        BinaryOperator::Equal => sql::ast::UnaryOperator::IsNull,
        BinaryOperator::NotEqual => sql::ast::UnaryOperator::IsNotNull,
        _ => return None,
    };
    if right.is_null() {
        Some((left, operator))
    } else if left.is_null() {
        Some((right, operator))
    } else {
        None
    }
}

fn translate_operator(op: BinaryOperator) -> Result<sql::ast::BinaryOperator, Error> {
    match op {
        BinaryOperator::Equal => Ok(sql::ast::BinaryOperator::Equals),
        BinaryOperator::NotEqual => Ok(sql::ast::BinaryOperator::NotEquals),
        BinaryOperator::LessThan => Ok(sql::ast::BinaryOperator::LessThan),
        BinaryOperator::LessThanOrEqual => Ok(sql::ast::BinaryOperator::LessThanOrEqualTo),
        BinaryOperator::GreaterThan => Ok(sql::ast::BinaryOperator::GreaterThan),
        BinaryOperator::GreaterThanOrEqual => Ok(sql::ast::BinaryOperator::GreaterThanOrEqualTo),
        BinaryOperator::Add => Ok(sql::ast::BinaryOperator::Add),
        BinaryOperator::Subtract => Ok(sql::ast::BinaryOperator::Subtract),
        BinaryOperator::Multiply => Ok(sql::ast::BinaryOperator::Multiply),
        BinaryOperator::Divide => Ok(sql::ast::BinaryOperator::Divide),
        BinaryOperator::Modulo => Ok(sql::ast::BinaryOperator::Modulo),
        // handled as AND / OR expressions
        BinaryOperator::AndAlso | BinaryOperator::OrElse => {
            Err(Error::UnsupportedOperator(op.to_string()))
        }
    }
}
