//! Execute a query plan against the database.

use chrono::Utc;
use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::{Executor, FromRow, MySql, Row};
use tracing::{info_span, Instrument};

use query_engine_metadata::metadata::Literal;
use query_engine_plan::plan::QueryPlan;
use query_engine_translation::translation;
use query_engine_translation::translation::query::Statement;

use crate::error::Error;
use crate::metrics;
use crate::placeholders;

/// Translate a plan, fetch its rows, and run the item transform over each of them.
pub async fn fetch_all<R>(
    pool: &MySqlPool,
    metrics: &metrics::Metrics,
    plan: &QueryPlan<R>,
) -> Result<Vec<R>, Error>
where
    R: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
{
    let execution_plan = translation::query::translate(plan)?;
    let statement = &execution_plan.statement;

    let rows = execute(pool, metrics, statement)
        .instrument(info_span!("Execute query", sql = %statement.sql()))
        .await?;

    let items = rows
        .iter()
        .map(R::from_row)
        .collect::<Result<Vec<R>, sqlx::Error>>()
        .map_err(|err| query_error(statement, "Could not read the fetched rows", err))?;
    metrics.record_successful_query();

    Ok(items
        .into_iter()
        .map(|item| execution_plan.item_transform.apply(item))
        .collect())
}

/// Count the rows of a plan, ignoring its ordering and pagination.
pub async fn count<R>(
    pool: &MySqlPool,
    metrics: &metrics::Metrics,
    plan: &QueryPlan<R>,
) -> Result<i64, Error> {
    let statement = translation::query::translate_count(plan)?;

    let rows = execute(pool, metrics, &statement)
        .instrument(info_span!("Execute count", sql = %statement.sql()))
        .await?;

    let count = match rows.first() {
        Some(row) => row
            .try_get::<i64, _>(0)
            .map_err(|err| query_error(&statement, "Could not read the count", err))?,
        None => 0,
    };
    metrics.record_successful_count();
    Ok(count)
}

/// Run the headers of a statement, then the statement itself, on one connection.
async fn execute(
    pool: &MySqlPool,
    metrics: &metrics::Metrics,
    statement: &Statement,
) -> Result<Vec<MySqlRow>, Error> {
    let positional = placeholders::for_statement(statement);
    let mut query = sqlx::query(&positional.sql);
    for name in &positional.names {
        let value = statement
            .parameter(name)
            .ok_or_else(|| Error::UnboundParameter(name.clone()))?;
        query = bind_parameter(query, name, value)?;
    }

    let timer = metrics.time_query_execution();
    let result = async {
        let mut connection = pool.acquire().await?;
        for header in &statement.query.header_sql {
            (&mut *connection).execute(header.as_str()).await?;
        }
        query.fetch_all(&mut *connection).await
    }
    .await;
    timer.observe_duration();

    result.map_err(|err| {
        metrics.record_failure();
        tracing::error!(error = %err, "Query failed");
        query_error(statement, "Could not fetch rows", err)
    })
}

/// Bind a value to the next positional placeholder.
fn bind_parameter<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    name: &str,
    value: &Literal,
) -> Result<Query<'q, MySql, MySqlArguments>, Error> {
    Ok(match value {
        Literal::Null => query.bind(None::<String>),
        Literal::Bool(b) => query.bind(*b),
        Literal::Int(i) => query.bind(*i),
        Literal::UInt(u) => query.bind(*u),
        Literal::Float(f) => query.bind(*f),
        Literal::String(s) => query.bind(s.clone()),
        Literal::Uuid(u) => query.bind(u.to_string()),
        Literal::DateTime(d) => query.bind(*d),
        Literal::DateTimeOffset(d) => query.bind(d.with_timezone(&Utc)),
        Literal::Date(d) => query.bind(*d),
        Literal::Time(t) => query.bind(*t),
        Literal::Array(_) => {
            return Err(Error::UnsupportedParameter(
                name.to_string(),
                "collections can only be bound as an IN list".to_string(),
            ))
        }
    })
}

fn query_error(statement: &Statement, message: &str, source: sqlx::Error) -> Error {
    Error::Query {
        message: message.to_string(),
        sql: statement.sql().to_string(),
        plan: statement.plan.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_plan::plan::{field, literal};

    #[test]
    fn collections_cannot_be_bound() {
        let query = sqlx::query("SELECT ?");
        let error = bind_parameter(query, "@Ids", &Literal::Array(vec![Literal::Int(1)]))
            .err()
            .unwrap();
        assert!(matches!(error, Error::UnsupportedParameter(name, _) if name == "@Ids"));
    }

    #[test]
    fn statements_bind_generated_and_caller_parameters() {
        let plan = QueryPlan::<()>::new("SELECT * FROM `people` WHERE `Age` >= @MinimumAge")
            .with_parameter("MinimumAge", 18)
            .filter(field("Name").equals(literal("Ann")));
        let statement = translation::query::translate(&plan).unwrap().statement;
        let positional = placeholders::for_statement(&statement);
        similar_asserts::assert_eq!(
            positional.sql,
            "SELECT * FROM `people` WHERE `Age` >= ?\nHAVING (`Name` = ?);"
        );
        assert_eq!(positional.names, vec!["@MinimumAge", "@P1000"]);
        assert_eq!(statement.parameter("@MinimumAge"), Some(&Literal::Int(18)));
    }

    #[test]
    fn caller_parameters_are_found_ignoring_case() {
        let plan = QueryPlan::<()>::new("SELECT * FROM `people` WHERE `Age` >= @minimumAGE")
            .with_parameter("MinimumAge", 18);
        let statement = translation::query::translate(&plan).unwrap().statement;
        let positional = placeholders::for_statement(&statement);
        assert_eq!(positional.sql, "SELECT * FROM `people` WHERE `Age` >= ?;");
        assert_eq!(positional.names, vec!["@minimumAGE"]);
        assert_eq!(statement.parameter("@minimumAGE"), Some(&Literal::Int(18)));
    }
}
