//! Translate recognized method calls and member accesses to MySQL functions.

use chrono::{Datelike, Timelike};
use enum_iterator::{all, Sequence};
use query_engine_metadata::metadata::Literal;
use query_engine_sql::sql;

use super::filtering::translate_expression;
use super::folding;
use super::node::{method_name, Node};
use crate::translation::error::Error;
use crate::translation::helpers::Env;

/// Parts of a date or time that can be read as members, `InsertedAt.Year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence)]
pub enum DatePart {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    DayOfWeek,
    DayOfYear,
}

impl DatePart {
    pub fn name(self) -> &'static str {
        match self {
            DatePart::Year => "Year",
            DatePart::Month => "Month",
            DatePart::Day => "Day",
            DatePart::Hour => "Hour",
            DatePart::Minute => "Minute",
            DatePart::Second => "Second",
            DatePart::DayOfWeek => "DayOfWeek",
            DatePart::DayOfYear => "DayOfYear",
        }
    }

    pub fn from_name(name: &str) -> Option<DatePart> {
        all::<DatePart>().find(|part| part.name() == name)
    }

    pub fn function(self) -> sql::ast::Function {
        match self {
            DatePart::Year => sql::ast::Function::Year,
            DatePart::Month => sql::ast::Function::Month,
            DatePart::Day => sql::ast::Function::Day,
            DatePart::Hour => sql::ast::Function::Hour,
            DatePart::Minute => sql::ast::Function::Minute,
            DatePart::Second => sql::ast::Function::Second,
            DatePart::DayOfWeek => sql::ast::Function::DayOfWeek,
            DatePart::DayOfYear => sql::ast::Function::DayOfYear,
        }
    }

    /// Read the part from a literal, the way MySQL would: `DayOfWeek` counts from 1 on
    /// Sunday and dates have no time of day.
    pub fn extract(self, value: &Literal) -> Option<Literal> {
        let part = match value {
            Literal::DateTime(datetime) => self.of_date(datetime.date()).or_else(|| {
                self.of_time(datetime.time())
            })?,
            Literal::DateTimeOffset(datetime) => {
                let local = datetime.naive_local();
                self.of_date(local.date())
                    .or_else(|| self.of_time(local.time()))?
            }
            Literal::Date(date) => self.of_date(*date).or(match self {
                DatePart::Hour | DatePart::Minute | DatePart::Second => Some(0),
                _ => None,
            })?,
            Literal::Time(time) => self.of_time(*time)?,
            _ => return None,
        };
        Some(Literal::Int(part))
    }

    fn of_date(self, date: chrono::NaiveDate) -> Option<i64> {
        match self {
            DatePart::Year => Some(i64::from(date.year())),
            DatePart::Month => Some(i64::from(date.month())),
            DatePart::Day => Some(i64::from(date.day())),
            DatePart::DayOfWeek => Some(i64::from(date.weekday().number_from_sunday())),
            DatePart::DayOfYear => Some(i64::from(date.ordinal())),
            DatePart::Hour | DatePart::Minute | DatePart::Second => None,
        }
    }

    fn of_time(self, time: chrono::NaiveTime) -> Option<i64> {
        match self {
            DatePart::Hour => Some(i64::from(time.hour())),
            DatePart::Minute => Some(i64::from(time.minute())),
            DatePart::Second => Some(i64::from(time.second())),
            _ => None,
        }
    }
}

/// Translate a call through the method table. `Ok(None)` means the call is not one we
/// know how to express in SQL.
pub fn translate_call(
    env: &Env,
    name: &str,
    target: Option<&Node>,
    args: &[Node],
    is_static: bool,
) -> Result<Option<sql::ast::Expression>, Error> {
    let method = method_name(name);
    let expression = match (method, target, args) {
        // nullable unwrap: `x.Value` reads `x`
        ("Value", Some(target), []) => translate_expression(env, target)?,

        ("Equals", Some(left), [right]) | ("Equals", None, [left, right]) => {
            sql::helpers::binary(
                translate_expression(env, left)?,
                sql::ast::BinaryOperator::Equals,
                translate_expression(env, right)?,
            )
        }

        ("Concat", target, args) if target.is_some() || !args.is_empty() => {
            let args = target
                .into_iter()
                .chain(args)
                .map(|arg| translate_expression(env, arg))
                .collect::<Result<Vec<_>, Error>>()?;
            sql::helpers::function_call(sql::ast::Function::Concat, args)
        }

        // membership: `[1, 2].Contains(Id)` or `Enumerable.Contains([1, 2], Id)`
        ("Contains", Some(Node::Literal(Literal::Array(items))), [item])
        | ("Contains", None, [Node::Literal(Literal::Array(items)), item]) => {
            translate_in_list(env, name, items, item)?
        }

        ("Contains", Some(haystack), [needle]) => like(
            env,
            haystack,
            vec![
                sql::helpers::like_wildcard(),
                translate_expression(env, needle)?,
                sql::helpers::like_wildcard(),
            ],
        )?,
        ("StartsWith", Some(haystack), [prefix]) => like(
            env,
            haystack,
            vec![
                translate_expression(env, prefix)?,
                sql::helpers::like_wildcard(),
            ],
        )?,
        ("EndsWith", Some(haystack), [suffix]) => like(
            env,
            haystack,
            vec![
                sql::helpers::like_wildcard(),
                translate_expression(env, suffix)?,
            ],
        )?,

        ("ToUpper", Some(target), []) => unary_function(env, sql::ast::Function::Upper, target)?,
        ("ToLower", Some(target), []) => unary_function(env, sql::ast::Function::Lower, target)?,
        ("Trim", Some(target), []) => unary_function(env, sql::ast::Function::Trim, target)?,

        ("Now", None, []) if is_static => now(sql::ast::Function::Now),
        ("UtcNow", None, []) if is_static => now(sql::ast::Function::UtcTimestamp),
        ("Today", None, []) if is_static => now(sql::ast::Function::CurDate),
        ("NewGuid", None, []) if is_static => now(sql::ast::Function::Uuid),

        (member, Some(target), []) => match DatePart::from_name(member) {
            Some(part) => unary_function(env, part.function(), target)?,
            None => return Ok(None),
        },

        _ => return Ok(None),
    };
    Ok(Some(expression))
}

fn translate_in_list(
    env: &Env,
    name: &str,
    items: &[Literal],
    item: &Node,
) -> Result<sql::ast::Expression, Error> {
    if items.is_empty() {
        return Err(Error::EmptyInList(format!("[].{name}({item})")));
    }
    let right = items
        .iter()
        .map(|value| match value {
            Literal::Array(_) => Err(Error::ArrayNotSupported(value.to_string())),
            _ => Ok(sql::ast::Expression::Value(value.clone())),
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(sql::ast::Expression::BinaryArrayOperation {
        left: Box::new(translate_expression(env, item)?),
        operator: sql::ast::BinaryArrayOperator::In,
        right,
    })
}

/// `(haystack LIKE CONCAT(pattern...))`
fn like(
    env: &Env,
    haystack: &Node,
    pattern: Vec<sql::ast::Expression>,
) -> Result<sql::ast::Expression, Error> {
    Ok(sql::helpers::binary(
        translate_expression(env, haystack)?,
        sql::ast::BinaryOperator::Like,
        sql::helpers::function_call(sql::ast::Function::Concat, pattern),
    ))
}

fn unary_function(
    env: &Env,
    function: sql::ast::Function,
    target: &Node,
) -> Result<sql::ast::Expression, Error> {
    Ok(sql::helpers::function_call(
        function,
        vec![translate_expression(env, target)?],
    ))
}

fn now(function: sql::ast::Function) -> sql::ast::Expression {
    sql::helpers::function_call(function, vec![])
}

/// Whether this is a membership test over an empty collection.
pub fn is_empty_in_list(node: &Node) -> bool {
    match node {
        Node::Call {
            name, target, args, ..
        } if method_name(name) == "Contains" => matches!(
            (target.as_deref(), args.as_slice()),
            (Some(Node::Literal(Literal::Array(items))), [_])
                | (None, [Node::Literal(Literal::Array(items)), _])
                if items.is_empty()
        ),
        _ => false,
    }
}

/// Static calls whose value changes between executions. They are always left to the
/// database rather than folded.
fn is_generator(name: &str, target: Option<&Node>, args: &[Node]) -> bool {
    target.is_none()
        && args.is_empty()
        && matches!(method_name(name), "Now" | "UtcNow" | "Today" | "NewGuid")
}

/// Replace recognized calls over fields with the SQL they translate to. Arguments are
/// folded first, so `Name.StartsWith("a" + "b")` binds a single value.
///
/// Calls over literals only are left to constant folding. A call that fails to
/// translate is kept, so that a later pass can still reduce it or report it.
pub fn reduce_calls(env: &Env, node: Node) -> Node {
    match node {
        Node::Binary { op, left, right } => Node::Binary {
            op,
            left: Box::new(reduce_calls(env, *left)),
            right: Box::new(reduce_calls(env, *right)),
        },
        Node::Unary { op, operand } => Node::Unary {
            op,
            operand: Box::new(reduce_calls(env, *operand)),
        },
        Node::Conditional {
            test,
            when_true,
            when_false,
        } => Node::Conditional {
            test: Box::new(reduce_calls(env, *test)),
            when_true: Box::new(reduce_calls(env, *when_true)),
            when_false: Box::new(reduce_calls(env, *when_false)),
        },
        Node::Call {
            name,
            target,
            args,
            is_static,
        } => {
            let target = target.map(|target| Box::new(reduce_calls(env, *target)));
            let args: Vec<Node> = args.into_iter().map(|arg| reduce_calls(env, arg)).collect();

            if method_name(&name) == "Value" && args.is_empty() {
                if let Some(field @ Node::Field(_)) = target.as_deref() {
                    return field.clone();
                }
            }

            let reads_field = target.as_ref().is_some_and(|target| target.contains_field())
                || args.iter().any(Node::contains_field);
            if reads_field || is_generator(&name, target.as_deref(), &args) {
                let folded_target = target
                    .as_deref()
                    .map(|target| folding::fold(target.clone()));
                let folded_args: Vec<Node> = args.iter().cloned().map(folding::fold).collect();
                match translate_call(env, &name, folded_target.as_ref(), &folded_args, is_static) {
                    Ok(Some(expression)) => return Node::Sql(expression),
                    Ok(None) => {}
                    Err(err) => tracing::debug!("Keeping call '{}' untranslated: {}", name, err),
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
