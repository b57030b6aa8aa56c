//! Predicate nodes: the expressions used by filters, sort keys and projection shapes.

use std::fmt;
use std::ops;

use query_engine_metadata::metadata::Literal;
use serde::{Deserialize, Serialize};

/// An expression over the fields of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    BinaryOp {
        op: BinaryOperator,
        left: Box<Predicate>,
        right: Box<Predicate>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Predicate>,
    },
    FieldRef {
        name: String,
    },
    Literal {
        value: Literal,
    },
    /// A method call or member access. Member accesses such as `Year` or `Value` are calls
    /// without arguments; static calls such as `DateTime.Now` have no target.
    Call {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<Box<Predicate>>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Predicate>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_static: bool,
    },
    Conditional {
        test: Box<Predicate>,
        when_true: Box<Predicate>,
        when_false: Box<Predicate>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    AndAlso,
    OrElse,
}

impl BinaryOperator {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessThanOrEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanOrEqual
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    Not,
    Negate,
}

/// Reference a field of the row.
pub fn field(name: impl Into<String>) -> Predicate {
    Predicate::FieldRef { name: name.into() }
}

pub fn literal(value: impl Into<Literal>) -> Predicate {
    Predicate::Literal {
        value: value.into(),
    }
}

pub fn null() -> Predicate {
    literal(Literal::Null)
}

impl Predicate {
    fn binary(self, op: BinaryOperator, right: impl Into<Predicate>) -> Predicate {
        Predicate::BinaryOp {
            op,
            left: Box::new(self),
            right: Box::new(right.into()),
        }
    }

    pub fn equals(self, right: impl Into<Predicate>) -> Predicate {
        self.binary(BinaryOperator::Equal, right)
    }

    pub fn not_equals(self, right: impl Into<Predicate>) -> Predicate {
        self.binary(BinaryOperator::NotEqual, right)
    }

    pub fn less_than(self, right: impl Into<Predicate>) -> Predicate {
        self.binary(BinaryOperator::LessThan, right)
    }

    pub fn less_than_or_equal(self, right: impl Into<Predicate>) -> Predicate {
        self.binary(BinaryOperator::LessThanOrEqual, right)
    }

    pub fn greater_than(self, right: impl Into<Predicate>) -> Predicate {
        self.binary(BinaryOperator::GreaterThan, right)
    }

    pub fn greater_than_or_equal(self, right: impl Into<Predicate>) -> Predicate {
        self.binary(BinaryOperator::GreaterThanOrEqual, right)
    }

    pub fn and(self, right: impl Into<Predicate>) -> Predicate {
        self.binary(BinaryOperator::AndAlso, right)
    }

    pub fn or(self, right: impl Into<Predicate>) -> Predicate {
        self.binary(BinaryOperator::OrElse, right)
    }

    /// Call an instance method on this expression.
    pub fn method<I>(self, name: impl Into<String>, args: I) -> Predicate
    where
        I: IntoIterator,
        I::Item: Into<Predicate>,
    {
        Predicate::Call {
            name: name.into(),
            target: Some(Box::new(self)),
            args: args.into_iter().map(Into::into).collect(),
            is_static: false,
        }
    }

    /// Access a member of this expression, such as `Year` or `Value`.
    pub fn member(self, name: impl Into<String>) -> Predicate {
        self.method(name, Vec::<Predicate>::new())
    }

    /// Call a static method, such as `DateTime.Now` or `string.Concat`.
    pub fn call_static<I>(name: impl Into<String>, args: I) -> Predicate
    where
        I: IntoIterator,
        I::Item: Into<Predicate>,
    {
        Predicate::Call {
            name: name.into(),
            target: None,
            args: args.into_iter().map(Into::into).collect(),
            is_static: true,
        }
    }

    pub fn conditional(
        test: Predicate,
        when_true: impl Into<Predicate>,
        when_false: impl Into<Predicate>,
    ) -> Predicate {
        Predicate::Conditional {
            test: Box::new(test),
            when_true: Box::new(when_true.into()),
            when_false: Box::new(when_false.into()),
        }
    }

    pub fn contains(self, value: impl Into<Predicate>) -> Predicate {
        self.method("Contains", [value.into()])
    }

    pub fn starts_with(self, value: impl Into<Predicate>) -> Predicate {
        self.method("StartsWith", [value.into()])
    }

    pub fn ends_with(self, value: impl Into<Predicate>) -> Predicate {
        self.method("EndsWith", [value.into()])
    }

    /// Membership in a fixed collection of values.
    pub fn is_in<I>(self, values: I) -> Predicate
    where
        I: IntoIterator,
        I::Item: Into<Literal>,
    {
        let collection = Literal::Array(values.into_iter().map(Into::into).collect());
        literal(collection).method("Contains", [self])
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            Predicate::FieldRef { name } => Some(name.as_str()),
            _ => None,
        }
    }
}

impl From<Literal> for Predicate {
    fn from(value: Literal) -> Self {
        Predicate::Literal { value }
    }
}

impl ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::UnaryOp {
            op: UnaryOperator::Not,
            operand: Box::new(self),
        }
    }
}

impl ops::Neg for Predicate {
    type Output = Predicate;

    fn neg(self) -> Predicate {
        Predicate::UnaryOp {
            op: UnaryOperator::Negate,
            operand: Box::new(self),
        }
    }
}

macro_rules! arithmetic_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Into<Predicate>> ops::$trait<T> for Predicate {
            type Output = Predicate;

            fn $method(self, right: T) -> Predicate {
                self.binary($op, right)
            }
        }
    };
}

arithmetic_operator!(Add, add, BinaryOperator::Add);
arithmetic_operator!(Sub, sub, BinaryOperator::Subtract);
arithmetic_operator!(Mul, mul, BinaryOperator::Multiply);
arithmetic_operator!(Div, div, BinaryOperator::Divide);
arithmetic_operator!(Rem, rem, BinaryOperator::Modulo);

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::AndAlso => "&&",
            BinaryOperator::OrElse => "||",
        };
        write!(f, "{symbol}")
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::BinaryOp { op, left, right } => write!(f, "({left} {op} {right})"),
            Predicate::UnaryOp {
                op: UnaryOperator::Not,
                operand,
            } => write!(f, "!{operand}"),
            Predicate::UnaryOp {
                op: UnaryOperator::Negate,
                operand,
            } => write!(f, "-{operand}"),
            Predicate::FieldRef { name } => write!(f, "{name}"),
            Predicate::Literal { value } => write!(f, "{value}"),
            Predicate::Call {
                name, target, args, ..
            } => {
                if let Some(target) = target {
                    write!(f, "{target}.")?;
                }
                write!(f, "{name}")?;
                // members print without parentheses
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
            Predicate::Conditional {
                test,
                when_true,
                when_false,
            } => write!(f, "({test} ? {when_true} : {when_false})"),
        }
    }
}
