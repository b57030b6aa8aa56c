//! The expression tree the translation passes work on, and the flattened plan.

use std::fmt;

use query_engine_metadata::metadata::Literal;
use query_engine_plan::plan::{
    BinaryOperator, MutatorId, OrderDirection, PlanNode, Predicate, Shape, UnaryOperator,
};
use query_engine_sql::sql;

/// A predicate as the passes see it. Unlike [`Predicate`], a sub-tree may already have
/// been translated, in which case it is carried as a SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Binary {
        op: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Node>,
    },
    Field(String),
    Literal(Literal),
    Call {
        name: String,
        target: Option<Box<Node>>,
        args: Vec<Node>,
        is_static: bool,
    },
    Conditional {
        test: Box<Node>,
        when_true: Box<Node>,
        when_false: Box<Node>,
    },
    /// A sub-tree that was already translated.
    Sql(sql::ast::Expression),
}

impl From<&Predicate> for Node {
    fn from(predicate: &Predicate) -> Self {
        match predicate {
            Predicate::BinaryOp { op, left, right } => Node::Binary {
                op: *op,
                left: Box::new(Node::from(left.as_ref())),
                right: Box::new(Node::from(right.as_ref())),
            },
            Predicate::UnaryOp { op, operand } => Node::Unary {
                op: *op,
                operand: Box::new(Node::from(operand.as_ref())),
            },
            Predicate::FieldRef { name } => Node::Field(name.clone()),
            Predicate::Literal { value } => Node::Literal(value.clone()),
            Predicate::Call {
                name,
                target,
                args,
                is_static,
            } => Node::Call {
                name: name.clone(),
                target: target
                    .as_ref()
                    .map(|target| Box::new(Node::from(target.as_ref()))),
                args: args.iter().map(Node::from).collect(),
                is_static: *is_static,
            },
            Predicate::Conditional {
                test,
                when_true,
                when_false,
            } => Node::Conditional {
                test: Box::new(Node::from(test.as_ref())),
                when_true: Box::new(Node::from(when_true.as_ref())),
                when_false: Box::new(Node::from(when_false.as_ref())),
            },
        }
    }
}

impl Node {
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Literal(Literal::Null))
    }

    pub fn is_bool(&self, expected: bool) -> bool {
        matches!(self, Node::Literal(Literal::Bool(value)) if *value == expected)
    }

    /// Whether a field of the row is read anywhere in this tree.
    pub fn contains_field(&self) -> bool {
        match self {
            Node::Field(_) => true,
            Node::Literal(_) => false,
            Node::Sql(expression) => contains_column(expression),
            Node::Binary { left, right, .. } => left.contains_field() || right.contains_field(),
            Node::Unary { operand, .. } => operand.contains_field(),
            Node::Call { target, args, .. } => {
                target.as_ref().is_some_and(|target| target.contains_field())
                    || args.iter().any(Node::contains_field)
            }
            Node::Conditional {
                test,
                when_true,
                when_false,
            } => test.contains_field() || when_true.contains_field() || when_false.contains_field(),
        }
    }
}

fn contains_column(expression: &sql::ast::Expression) -> bool {
    use sql::ast::Expression;
    match expression {
        Expression::ColumnReference(_) => true,
        Expression::Value(_) | Expression::RawSql(_) => false,
        Expression::And { left, right }
        | Expression::Or { left, right }
        | Expression::BinaryOperation { left, right, .. } => {
            contains_column(left) || contains_column(right)
        }
        Expression::Not(inner) => contains_column(inner),
        Expression::UnaryOperation { expression, .. } => contains_column(expression),
        Expression::BinaryArrayOperation { left, right, .. } => {
            contains_column(left) || right.iter().any(contains_column)
        }
        Expression::FunctionCall { args, .. } => args.iter().any(contains_column),
    }
}

/// The name of a method without the type it was called on, `Compare` for `string.Compare`.
pub fn method_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Node::Unary {
                op: UnaryOperator::Not,
                operand,
            } => write!(f, "!{operand}"),
            Node::Unary {
                op: UnaryOperator::Negate,
                operand,
            } => write!(f, "-{operand}"),
            Node::Field(name) => write!(f, "{name}"),
            Node::Literal(value) => write!(f, "{value}"),
            Node::Call {
                name, target, args, ..
            } => {
                if let Some(target) = target {
                    write!(f, "{target}.")?;
                }
                write!(f, "{name}")?;
                if args.is_empty() && target.is_some() {
                    return Ok(());
                }
                write!(f, "(")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Node::Conditional {
                test,
                when_true,
                when_false,
            } => write!(f, "({test} ? {when_true} : {when_false})"),
            Node::Sql(expression) => {
                let mut sql = sql::string::SQL::new();
                expression.to_sql(&mut sql);
                write!(f, "{}", sql.sql)
            }
        }
    }
}

/// One operation of a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step<'a> {
    Filter(&'a Predicate),
    Sort {
        key: &'a Predicate,
        direction: OrderDirection,
        /// `sort_by` rather than `then_sort_by`.
        primary: bool,
    },
    Skip(u64),
    Take(u64),
    Project {
        shape: &'a Shape,
        mutator: Option<MutatorId>,
    },
}

/// The operations of a plan tree, in the order they were specified.
pub fn flatten(tree: &PlanNode) -> Vec<Step<'_>> {
    let mut steps = vec![];
    let mut current = tree;
    loop {
        let step = match current {
            PlanNode::Source => break,
            PlanNode::Filter { predicate, .. } => Step::Filter(predicate),
            PlanNode::SortBy { key, direction, .. } => Step::Sort {
                key,
                direction: *direction,
                primary: true,
            },
            PlanNode::ThenSortBy { key, direction, .. } => Step::Sort {
                key,
                direction: *direction,
                primary: false,
            },
            PlanNode::Skip { count, .. } => Step::Skip(*count),
            PlanNode::Take { count, .. } => Step::Take(*count),
            PlanNode::Project { shape, mutator, .. } => Step::Project {
                shape,
                mutator: *mutator,
            },
        };
        steps.push(step);
        match current.source() {
            Some(source) => current = source,
            None => break,
        }
    }
    steps.reverse();
    steps
}
