//! Stitch the translated clauses and the caller's commands into one statement.

use indexmap::IndexMap;
use query_engine_metadata::metadata::{CommandRegion, Literal};
use query_engine_plan::plan::QueryPlan;
use query_engine_sql::sql;

use crate::translation::helpers::{AssemblyMode, Env};

/// The translated clauses of a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Clauses {
    pub conditions: Vec<sql::ast::Expression>,
    pub order_by: sql::ast::OrderBy,
    pub limit: sql::ast::Limit,
    pub selected_columns: Vec<String>,
}

/// What the statement returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Rows,
    /// The number of rows, ignoring ordering, pagination and projection.
    Count,
}

/// An assembled statement and the fragments it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub parameters: IndexMap<String, Literal>,
    pub select_sql: String,
    pub filter_sql: String,
    pub order_by_sql: String,
    pub limit_sql: String,
    /// The header commands, each without its terminator.
    pub header_sql: Vec<String>,
    /// The statement without its headers.
    pub statement_sql: String,
    pub final_sql: String,
}

/// Assemble a statement:
///
/// ```text
/// <header>;
/// [SELECT <columns> <after selection columns>]
/// <base sql>
/// [WHERE <conditions>]
/// [<before grouping or having>]
/// [HAVING <conditions>]
/// [ORDER BY <keys>]
/// [LIMIT <n> [OFFSET <m>]];
/// ```
///
/// WHERE is used when every column is mapped, HAVING otherwise. In HAVING mode, a
/// projection wraps the statement in `SELECT <columns> FROM (...) AS <alias>`.
pub fn assemble<R>(env: &Env, plan: &QueryPlan<R>, clauses: &Clauses, output: Output) -> Assembled {
    let after_columns: Vec<sql::ast::RawSql> = commands(plan, CommandRegion::AfterSelectionColumns)
        .map(|command| sql::ast::RawSql(command.to_string()))
        .collect();

    let select_sql = match env.mode {
        AssemblyMode::AllColumnsMapped => render(|sql| {
            select_list(env, &clauses.selected_columns, after_columns.clone()).to_sql(sql);
        }),
        AssemblyMode::Having => String::new(),
    };

    // Values are only ever bound in the filter, so its parameters are the statement's.
    let mut filter = sql::string::SQL::new();
    sql::ast::Filter {
        clause: env.mode.filter_clause(),
        conditions: clauses.conditions.clone(),
    }
    .to_sql(&mut filter);
    let filter_sql = filter.take_text();
    let parameters = filter.params.into_inner();

    let order_by_sql = render(|sql| clauses.order_by.to_sql(sql));
    let limit_sql = render(|sql| clauses.limit.to_sql(sql));

    let mut statement = sql::string::SQL::new();
    append_clause(&mut statement, &select_sql);
    append_clause(&mut statement, base_sql(plan.base_sql()));
    if env.mode == AssemblyMode::AllColumnsMapped {
        append_clause(&mut statement, &filter_sql);
    }
    for command in commands(plan, CommandRegion::BeforeGroupingOrHaving) {
        append_clause(&mut statement, trim_statement(command));
    }
    if env.mode == AssemblyMode::Having {
        append_clause(&mut statement, &filter_sql);
    }
    if output == Output::Rows {
        append_clause(&mut statement, &order_by_sql);
        append_clause(&mut statement, &limit_sql);
    }
    let statement = statement.sql;

    let wrapped = env.mode == AssemblyMode::Having
        && output == Output::Rows
        && !clauses.selected_columns.is_empty();
    if !after_columns.is_empty() && env.mode == AssemblyMode::Having && !wrapped {
        tracing::warn!(
            "Ignoring {} command(s) after selection columns: there is no generated select list",
            after_columns.len()
        );
    }

    let body = match output {
        Output::Rows if wrapped => wrap(
            &statement,
            sql::ast::OuterSelectList::Columns(
                clauses
                    .selected_columns
                    .iter()
                    .map(|column| sql::helpers::make_column_alias(column.clone()))
                    .collect(),
            ),
            after_columns,
        ),
        Output::Rows => statement,
        Output::Count => wrap(&statement, sql::ast::OuterSelectList::CountStar, vec![]),
    };

    let header_sql: Vec<String> = commands(plan, CommandRegion::Header)
        .map(trim_statement)
        .filter(|header| !header.is_empty())
        .map(ToString::to_string)
        .collect();
    let statement_sql = format!("{body};");
    let mut final_sql = String::new();
    for header in &header_sql {
        final_sql.push_str(header);
        final_sql.push_str(";\n");
    }
    final_sql.push_str(&statement_sql);

    Assembled {
        parameters,
        select_sql,
        filter_sql,
        order_by_sql,
        limit_sql,
        header_sql,
        statement_sql,
        final_sql,
    }
}

fn commands<R>(plan: &QueryPlan<R>, region: CommandRegion) -> impl Iterator<Item = &str> {
    plan.additional_commands()
        .iter()
        .filter(move |command| command.region == region)
        .map(|command| command.sql.as_str())
}

fn render(to_sql: impl FnOnce(&mut sql::string::SQL)) -> String {
    let mut sql = sql::string::SQL::new();
    to_sql(&mut sql);
    sql.sql
}

/// Start a clause on its own line. Empty clauses are skipped.
fn append_clause(statement: &mut sql::string::SQL, clause: &str) {
    if !clause.is_empty() {
        statement.start_line();
        statement.append_syntax(clause);
    }
}

/// A command without surrounding whitespace and without its terminators.
fn trim_statement(sql: &str) -> &str {
    sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

/// The base SQL, without the terminator it may have been written with.
fn base_sql(sql: &str) -> &str {
    trim_statement(sql)
}

/// The generated select list: the projected columns, or else every mapped column, or
/// else every declared field. A row with none of those selects everything.
fn select_list(
    env: &Env,
    selected_columns: &[String],
    after_columns: Vec<sql::ast::RawSql>,
) -> sql::ast::SelectList {
    let fields: Vec<&str> = if !selected_columns.is_empty() {
        selected_columns.iter().map(String::as_str).collect()
    } else if !env.resolver.mappings().is_empty() {
        env.resolver
            .mappings()
            .iter()
            .map(|(field, _)| field.as_str())
            .collect()
    } else {
        env.fields().field_names().collect()
    };
    sql::ast::SelectList {
        columns: fields
            .into_iter()
            .map(|field| {
                (
                    sql::helpers::make_column_alias(field.to_string()),
                    sql::ast::Expression::ColumnReference(env.resolver.resolve(field).reference),
                )
            })
            .collect(),
        after_columns,
    }
}

/// `SELECT <columns> FROM (<statement>) AS <alias>`, with an alias the statement does
/// not already use.
fn wrap(
    statement: &str,
    select_list: sql::ast::OuterSelectList,
    after_columns: Vec<sql::ast::RawSql>,
) -> String {
    let outer = sql::ast::OuterSelect {
        select_list,
        after_columns,
        inner: sql::ast::RawSql(statement.to_string()),
        alias: sql::helpers::unique_table_alias(statement),
    };
    render(|sql| outer.to_sql(sql))
}
