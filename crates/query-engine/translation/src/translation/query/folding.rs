//! Constant folding: evaluate sub-trees whose operands are all literals.
//!
//! Folding is best effort. Anything that cannot be evaluated, such as an overflowing
//! sum or a call we do not know, is kept as it was.

use std::cmp::Ordering;

use query_engine_metadata::metadata::Literal;
use query_engine_plan::plan::{BinaryOperator, UnaryOperator};

use super::methods::DatePart;
use super::node::{method_name, Node};

/// Fold a tree bottom-up.
pub fn fold(node: Node) -> Node {
    match node {
        Node::Binary { op, left, right } => {
            let left = fold(*left);
            let right = fold(*right);
            if let Some(value) = short_circuit(op, &left, &right) {
                return Node::Literal(value);
            }
            match (&left, &right) {
                (Node::Literal(l), Node::Literal(r)) => match evaluate_binary(op, l, r) {
                    Some(value) => Node::Literal(value),
                    None => {
                        tracing::debug!("Could not fold ({} {} {})", l, op, r);
                        keep_binary(op, left, right)
                    }
                },
                _ => keep_binary(op, left, right),
            }
        }
        Node::Unary { op, operand } => {
            let operand = fold(*operand);
            match operand.as_literal().and_then(|value| evaluate_unary(op, value)) {
                Some(value) => Node::Literal(value),
                None => Node::Unary {
                    op,
                    operand: Box::new(operand),
                },
            }
        }
        Node::Conditional {
            test,
            when_true,
            when_false,
        } => {
            let test = fold(*test);
            let when_true = fold(*when_true);
            let when_false = fold(*when_false);
            match test.as_literal() {
                Some(Literal::Bool(true)) => when_true,
                Some(Literal::Bool(false)) => when_false,
                _ => Node::Conditional {
                    test: Box::new(test),
                    when_true: Box::new(when_true),
                    when_false: Box::new(when_false),
                },
            }
        }
        Node::Call {
            name,
            target,
            args,
            is_static,
        } => {
            let target = target.map(|target| Box::new(fold(*target)));
            let args: Vec<Node> = args.into_iter().map(fold).collect();
            let literal_target = match target.as_deref() {
                None => Some(None),
                Some(Node::Literal(value)) => Some(Some(value)),
                Some(_) => None,
            };
            let literal_args: Option<Vec<Literal>> =
                args.iter().map(|arg| arg.as_literal().cloned()).collect();
            if let (Some(target), Some(args)) = (literal_target, literal_args) {
                if let Some(value) = evaluate_call(&name, target, &args) {
                    return Node::Literal(value);
                }
            }
            Node::Call {
                name,
                target,
                args,
                is_static,
            }
        }
        leaf @ (Node::Field(_) | Node::Literal(_) | Node::Sql(_)) => leaf,
    }
}

fn keep_binary(op: BinaryOperator, left: Node, right: Node) -> Node {
    Node::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// `false && x` and `true || x` do not depend on `x`.
fn short_circuit(op: BinaryOperator, left: &Node, right: &Node) -> Option<Literal> {
    match op {
        BinaryOperator::AndAlso if left.is_bool(false) || right.is_bool(false) => {
            Some(Literal::Bool(false))
        }
        BinaryOperator::OrElse if left.is_bool(true) || right.is_bool(true) => {
            Some(Literal::Bool(true))
        }
        _ => None,
    }
}

fn evaluate_unary(op: UnaryOperator, value: &Literal) -> Option<Literal> {
    match (op, value) {
        (UnaryOperator::Not, Literal::Bool(b)) => Some(Literal::Bool(!b)),
        (UnaryOperator::Negate, Literal::Int(i)) => i.checked_neg().map(Literal::Int),
        (UnaryOperator::Negate, Literal::UInt(u)) => {
            i64::try_from(*u).ok().and_then(i64::checked_neg).map(Literal::Int)
        }
        (UnaryOperator::Negate, Literal::Float(f)) => Some(Literal::Float(-f)),
        _ => None,
    }
}

fn evaluate_binary(op: BinaryOperator, left: &Literal, right: &Literal) -> Option<Literal> {
    match op {
        BinaryOperator::Equal => Some(Literal::Bool(literal_eq(left, right)?)),
        BinaryOperator::NotEqual => Some(Literal::Bool(!literal_eq(left, right)?)),
        BinaryOperator::LessThan => compare(left, right).map(|o| Literal::Bool(o.is_lt())),
        BinaryOperator::LessThanOrEqual => compare(left, right).map(|o| Literal::Bool(o.is_le())),
        BinaryOperator::GreaterThan => compare(left, right).map(|o| Literal::Bool(o.is_gt())),
        BinaryOperator::GreaterThanOrEqual => {
            compare(left, right).map(|o| Literal::Bool(o.is_ge()))
        }
        BinaryOperator::AndAlso => match (left, right) {
            (Literal::Bool(l), Literal::Bool(r)) => Some(Literal::Bool(*l && *r)),
            _ => None,
        },
        BinaryOperator::OrElse => match (left, right) {
            (Literal::Bool(l), Literal::Bool(r)) => Some(Literal::Bool(*l || *r)),
            _ => None,
        },
        BinaryOperator::Add
            if matches!(left, Literal::String(_)) || matches!(right, Literal::String(_)) =>
        {
            Some(Literal::String(left.to_text()? + &right.to_text()?))
        }
        BinaryOperator::Add
        | BinaryOperator::Subtract
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Modulo => arithmetic(op, left, right),
    }
}

/// Numbers as the widest type both sides fit in.
enum Number {
    Integer(i128),
    Float(f64),
}

fn number(value: &Literal) -> Option<Number> {
    match value {
        Literal::Int(i) => Some(Number::Integer(i128::from(*i))),
        Literal::UInt(u) => Some(Number::Integer(i128::from(*u))),
        Literal::Float(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_float(number: &Number) -> f64 {
    match number {
        Number::Integer(i) => *i as f64,
        Number::Float(f) => *f,
    }
}

fn arithmetic(op: BinaryOperator, left: &Literal, right: &Literal) -> Option<Literal> {
    let (l, r) = (number(left)?, number(right)?);
    match (&l, &r) {
        (Number::Integer(l), Number::Integer(r)) => {
            let value = match op {
                BinaryOperator::Add => l.checked_add(*r),
                BinaryOperator::Subtract => l.checked_sub(*r),
                BinaryOperator::Multiply => l.checked_mul(*r),
                BinaryOperator::Divide => l.checked_div(*r),
                BinaryOperator::Modulo => l.checked_rem(*r),
                _ => None,
            }?;
            // unsigned operands stay unsigned
            match (left, right) {
                (Literal::UInt(_), Literal::UInt(_)) => u64::try_from(value).ok().map(Literal::UInt),
                _ => i64::try_from(value).ok().map(Literal::Int),
            }
        }
        _ => {
            let (l, r) = (as_float(&l), as_float(&r));
            let value = match op {
                BinaryOperator::Add => l + r,
                BinaryOperator::Subtract => l - r,
                BinaryOperator::Multiply => l * r,
                BinaryOperator::Divide => l / r,
                BinaryOperator::Modulo => l % r,
                _ => return None,
            };
            value.is_finite().then_some(Literal::Float(value))
        }
    }
}

/// Equality of two literals, `None` when they cannot be compared.
fn literal_eq(left: &Literal, right: &Literal) -> Option<bool> {
    match (left, right) {
        (Literal::Null, Literal::Null) => Some(true),
        (Literal::Null, _) | (_, Literal::Null) => Some(false),
        (Literal::Array(l), Literal::Array(r)) => {
            if l.len() != r.len() {
                return Some(false);
            }
            l.iter()
                .zip(r)
                .map(|(l, r)| literal_eq(l, r))
                .try_fold(true, |acc, eq| Some(acc && eq?))
        }
        _ => compare(left, right).map(Ordering::is_eq),
    }
}

fn compare(left: &Literal, right: &Literal) -> Option<Ordering> {
    match (left, right) {
        (Literal::Bool(l), Literal::Bool(r)) => Some(l.cmp(r)),
        (Literal::String(l), Literal::String(r)) => Some(l.cmp(r)),
        (Literal::Uuid(l), Literal::Uuid(r)) => Some(l.cmp(r)),
        (Literal::DateTime(l), Literal::DateTime(r)) => Some(l.cmp(r)),
        (Literal::DateTimeOffset(l), Literal::DateTimeOffset(r)) => Some(l.cmp(r)),
        (Literal::Date(l), Literal::Date(r)) => Some(l.cmp(r)),
        (Literal::Time(l), Literal::Time(r)) => Some(l.cmp(r)),
        _ => match (number(left)?, number(right)?) {
            (Number::Integer(l), Number::Integer(r)) => Some(l.cmp(&r)),
            (l, r) => as_float(&l).partial_cmp(&as_float(&r)),
        },
    }
}

/// Evaluate a call over literals. `target` is `None` for static calls.
fn evaluate_call(name: &str, target: Option<&Literal>, args: &[Literal]) -> Option<Literal> {
    match (method_name(name), target, args) {
        ("ToString", Some(value), []) => value.to_text().map(Literal::String),
        ("ToUpper", Some(Literal::String(s)), []) => Some(Literal::String(s.to_uppercase())),
        ("ToLower", Some(Literal::String(s)), []) => Some(Literal::String(s.to_lowercase())),
        ("Trim", Some(Literal::String(s)), []) => Some(Literal::String(s.trim().to_string())),
        ("Length", Some(Literal::String(s)), []) => {
            i64::try_from(s.chars().count()).ok().map(Literal::Int)
        }
        ("Length" | "Count", Some(Literal::Array(items)), []) => {
            i64::try_from(items.len()).ok().map(Literal::Int)
        }
        ("Value", Some(value), []) if !value.is_null() => Some(value.clone()),

        ("Equals", Some(left), [right]) | ("Equals", None, [left, right]) => {
            literal_eq(left, right).map(Literal::Bool)
        }
        ("Concat", target, args) => {
            let mut text = String::new();
            for value in target.into_iter().chain(args) {
                text.push_str(&value.to_text()?);
            }
            Some(Literal::String(text))
        }

        ("Contains", Some(Literal::Array(items)), [item])
        | ("Contains", None, [Literal::Array(items), item]) => Some(Literal::Bool(
            items.iter().any(|candidate| literal_eq(candidate, item) == Some(true)),
        )),
        ("Contains", Some(Literal::String(s)), [Literal::String(needle)]) => {
            Some(Literal::Bool(s.contains(needle.as_str())))
        }
        ("StartsWith", Some(Literal::String(s)), [Literal::String(prefix)]) => {
            Some(Literal::Bool(s.starts_with(prefix.as_str())))
        }
        ("EndsWith", Some(Literal::String(s)), [Literal::String(suffix)]) => {
            Some(Literal::Bool(s.ends_with(suffix.as_str())))
        }

        (member, Some(value), []) => DatePart::from_name(member)?.extract(value),
        _ => None,
    }
}
