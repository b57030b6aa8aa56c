//! Translate a query plan into a statement and an item transform.

pub mod assembly;
pub mod filtering;
pub mod folding;
pub mod methods;
pub mod node;
pub mod pagination;
pub mod projection;
pub mod simplify;
pub mod sorting;

use std::fmt;

use indexmap::IndexMap;
use query_engine_metadata::metadata::{CommandLocale, Literal};
use query_engine_plan::plan::{ItemTransform, QueryPlan};
use query_engine_sql::sql;

use super::error::Error;
use super::helpers::{Env, State};
use node::Step;

/// The outcome of one translation. It is never modified once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    /// Generated parameters, `@P1000`, `@P1001`, ... in the order they appear.
    pub parameters: IndexMap<String, Literal>,
    /// Fields the projection narrowed the statement to.
    pub selected_columns: Vec<String>,
    pub additional_commands: Vec<CommandLocale>,
    /// The generated select list, empty unless every column is mapped.
    pub select_sql: String,
    pub filter_sql: String,
    pub order_by_sql: String,
    pub limit_sql: String,
    /// Header commands, run before the statement.
    pub header_sql: Vec<String>,
    /// The statement alone, without its headers.
    pub statement_sql: String,
    /// The headers and the statement, as one script.
    pub final_sql: String,
}

/// A statement ready to be sent to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub query: TranslationResult,
    /// Parameters of the base SQL, supplied with the plan.
    pub caller_parameters: IndexMap<String, Literal>,
    /// The plan the statement was translated from, for error reports.
    pub plan: String,
}

impl Statement {
    pub fn sql(&self) -> &str {
        &self.query.final_sql
    }

    /// Every parameter of the statement: the generated ones, then the caller's.
    pub fn parameters(&self) -> impl Iterator<Item = (&String, &Literal)> {
        self.query
            .parameters
            .iter()
            .chain(self.caller_parameters.iter())
    }

    /// The value bound to a placeholder. Names are compared ignoring case.
    pub fn parameter(&self, name: &str) -> Option<&Literal> {
        self.parameters()
            .find(|(bound, _)| bound.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql())
    }
}

/// Definition of an execution plan to be run against the database.
pub struct ExecutionPlan<R> {
    pub statement: Statement,
    /// Applied to every row once it has been fetched.
    pub item_transform: ItemTransform<R>,
}

impl<R> ExecutionPlan<R> {
    /// The SQL text and the parameters it binds.
    pub fn query_sql(&self) -> (&str, Vec<(&String, &Literal)>) {
        (self.statement.sql(), self.statement.parameters().collect())
    }
}

impl<R> fmt::Debug for ExecutionPlan<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionPlan")
            .field("statement", &self.statement)
            .field("item_transform", &self.item_transform)
            .finish()
    }
}

/// Translate a query plan to the statement that fetches its rows.
pub fn translate<R>(plan: &QueryPlan<R>) -> Result<ExecutionPlan<R>, Error> {
    let env = Env::for_plan(plan);
    let mut state = State::new();
    let clauses = translate_clauses(&env, plan, &mut state)?;
    let (selected_columns, item_transform) = state.finish();
    let clauses = assembly::Clauses {
        selected_columns,
        ..clauses
    };
    let statement = build_statement(&env, plan, &clauses, assembly::Output::Rows)?;
    Ok(ExecutionPlan {
        statement,
        item_transform,
    })
}

/// Translate a query plan to a statement counting its rows. Ordering, pagination and
/// projection do not change the count, so they are left out.
pub fn translate_count<R>(plan: &QueryPlan<R>) -> Result<Statement, Error> {
    let env = Env::for_plan(plan);
    let mut state = State::new();
    let clauses = translate_clauses(&env, plan, &mut state)?;
    build_statement(&env, plan, &clauses, assembly::Output::Count)
}

/// Translate the operations of a plan, in the order they were specified.
fn translate_clauses<R>(
    env: &Env,
    plan: &QueryPlan<R>,
    state: &mut State<R>,
) -> Result<assembly::Clauses, Error> {
    let mut conditions = vec![];
    let mut sorts = vec![];
    let mut limit = sql::helpers::empty_limit();

    for step in node::flatten(plan.tree()) {
        match step {
            Step::Filter(predicate) => {
                let node = simplify::simplify(env, predicate);
                if let Some(condition) = filtering::translate_filter(env, &node)? {
                    conditions.push(condition);
                }
            }
            Step::Sort {
                key,
                direction,
                primary,
            } => sorts.push(sorting::SortStep {
                key: simplify::simplify(env, key),
                direction,
                primary,
            }),
            Step::Skip(count) => pagination::skip(&mut limit, count),
            Step::Take(count) => pagination::take(&mut limit, count),
            Step::Project { shape, mutator } => {
                projection::translate_projection(env, plan, state, shape, mutator)?;
            }
        }
    }

    let (_, order_by) = sorting::translate_order_by(env, &sorts)?;
    Ok(assembly::Clauses {
        conditions,
        order_by,
        limit,
        selected_columns: vec![],
    })
}

fn build_statement<R>(
    env: &Env,
    plan: &QueryPlan<R>,
    clauses: &assembly::Clauses,
    output: assembly::Output,
) -> Result<Statement, Error> {
    let assembled = assembly::assemble(env, plan, clauses, output);

    for name in plan.parameters().keys() {
        if assembled
            .parameters
            .keys()
            .any(|generated| generated.eq_ignore_ascii_case(name))
        {
            return Err(Error::ParameterNameCollision(name.clone()));
        }
    }

    let statement = Statement {
        query: TranslationResult {
            parameters: assembled.parameters,
            selected_columns: clauses.selected_columns.clone(),
            additional_commands: plan.additional_commands().to_vec(),
            select_sql: assembled.select_sql,
            filter_sql: assembled.filter_sql,
            order_by_sql: assembled.order_by_sql,
            limit_sql: assembled.limit_sql,
            header_sql: assembled.header_sql,
            statement_sql: assembled.statement_sql,
            final_sql: assembled.final_sql,
        },
        caller_parameters: plan.parameters().clone(),
        plan: plan.tree().to_string(),
    };

    tracing::info!(
        generated_sql = %statement.sql(),
        params = ?statement.query.parameters,
        "Translated plan {}",
        statement.plan
    );
    Ok(statement)
}
