//! Simplify predicates before they are translated.

use query_engine_metadata::metadata::Literal;
use query_engine_plan::plan::{BinaryOperator, Predicate};

use super::folding;
use super::methods;
use super::node::{method_name, Node};
use crate::translation::helpers::Env;

/// Run every pass over a predicate: reduce recognized calls, fold constants, then
/// normalize conditionals and boolean identities.
pub fn simplify(env: &Env, predicate: &Predicate) -> Node {
    let node = Node::from(predicate);
    let node = methods::reduce_calls(env, node);
    let node = folding::fold(node);
    let node = simplify_conditionals(node);
    tracing::debug!("Simplified '{}' to '{}'", predicate, node);
    node
}

/// - `x == null ? null : x` and `x != null ? x : null` are `x`.
/// - `true && x` and `false || x` are `x`.
/// - `string.Compare(a, b) < 0` and `a.CompareTo(b) < 0` are `a < b`.
pub fn simplify_conditionals(node: Node) -> Node {
    match node {
        Node::Binary { op, left, right } => {
            let left = simplify_conditionals(*left);
            let right = simplify_conditionals(*right);
            match op {
                BinaryOperator::AndAlso if left.is_bool(true) => right,
                BinaryOperator::AndAlso if right.is_bool(true) => left,
                BinaryOperator::OrElse if left.is_bool(false) => right,
                BinaryOperator::OrElse if right.is_bool(false) => left,
                _ if op.is_comparison() && is_zero(&right) => match compared(left) {
                    Ok((a, b)) => Node::Binary {
                        op,
                        left: Box::new(a),
                        right: Box::new(b),
                    },
                    Err(left) => Node::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                },
                _ => Node::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            }
        }
        Node::Unary { op, operand } => Node::Unary {
            op,
            operand: Box::new(simplify_conditionals(*operand)),
        },
        Node::Conditional {
            test,
            when_true,
            when_false,
        } => {
            let test = simplify_conditionals(*test);
            let when_true = simplify_conditionals(*when_true);
            let when_false = simplify_conditionals(*when_false);
            match null_checked(&test, &when_true, &when_false) {
                Some(value) => value,
                None => Node::Conditional {
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
        } => Node::Call {
            name,
            target: target.map(|target| Box::new(simplify_conditionals(*target))),
            args: args.into_iter().map(simplify_conditionals).collect(),
            is_static,
        },
        leaf @ (Node::Field(_) | Node::Literal(_) | Node::Sql(_)) => leaf,
    }
}

/// The value of a ternary that only guards against null.
fn null_checked(test: &Node, when_true: &Node, when_false: &Node) -> Option<Node> {
    let Node::Binary { op, left, right } = test else {
        return None;
    };
    let checked = match (left.as_ref(), right.as_ref()) {
        (value, Node::Literal(Literal::Null)) | (Node::Literal(Literal::Null), value) => value,
        _ => return None,
    };
    match op {
        BinaryOperator::Equal if when_true.is_null() && when_false == checked => {
            Some(checked.clone())
        }
        BinaryOperator::NotEqual if when_false.is_null() && when_true == checked => {
            Some(checked.clone())
        }
        _ => None,
    }
}

fn is_zero(node: &Node) -> bool {
    matches!(node, Node::Literal(Literal::Int(0) | Literal::UInt(0)))
}

/// The operands of a three-way comparison call, or the node back if it is not one.
fn compared(node: Node) -> Result<(Node, Node), Node> {
    match node {
        Node::Call {
            name,
            target: None,
            mut args,
            ..
        } if method_name(&name) == "Compare" && args.len() == 2 => {
            let b = args.remove(1);
            let a = args.remove(0);
            Ok((a, b))
        }
        Node::Call {
            name,
            target: Some(a),
            mut args,
            ..
        } if method_name(&name) == "CompareTo" && args.len() == 1 => Ok((*a, args.remove(0))),
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_plan::plan::{field, literal, null};

    fn simplified(predicate: &Predicate) -> Node {
        simplify_conditionals(Node::from(predicate))
    }

    #[test]
    fn null_guards_collapse_to_the_field() {
        let guarded = Predicate::conditional(field("Name").equals(null()), null(), field("Name"));
        assert_eq!(simplified(&guarded), Node::Field("Name".to_string()));

        let guarded = Predicate::conditional(null().not_equals(field("Name")), field("Name"), null());
        assert_eq!(simplified(&guarded), Node::Field("Name".to_string()));
    }

    #[test]
    fn other_ternaries_stay() {
        let ternary = Predicate::conditional(field("Name").equals(null()), literal("x"), field("Name"));
        assert_eq!(simplified(&ternary), Node::from(&ternary));
    }

    #[test]
    fn boolean_identities_collapse() {
        let predicate = literal(true).and(field("IsActive"));
        assert_eq!(simplified(&predicate), Node::Field("IsActive".to_string()));
        let predicate = field("IsActive").or(literal(false));
        assert_eq!(simplified(&predicate), Node::Field("IsActive".to_string()));
    }

    #[test]
    fn compare_calls_become_comparisons() {
        let predicate = Predicate::call_static("string.Compare", [field("Name"), literal("m")])
            .greater_than(literal(0));
        assert_eq!(
            simplified(&predicate),
            Node::from(&field("Name").greater_than(literal("m")))
        );
        let predicate = field("Name")
            .method("CompareTo", [literal("m")])
            .less_than_or_equal(literal(0));
        assert_eq!(
            simplified(&predicate),
            Node::from(&field("Name").less_than_or_equal(literal("m")))
        );
    }
}
