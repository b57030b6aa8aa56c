//! Common functions used across test cases.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

use query_engine_metadata::metadata::Literal;
use query_engine_plan::plan::{PlanNode, QueryPlan};
use query_engine_translation::translation;
use sql_queryable_configuration::environment::FixedEnvironment;
use sql_queryable_configuration::version1::DEFAULT_CONNECTION_URI_VARIABLE;

/// A plan to translate against one of the configured native queries.
#[derive(Debug, Deserialize)]
struct Request {
    query: String,
    plan: PlanNode,
    #[serde(default)]
    parameters: BTreeMap<String, Literal>,
    #[serde(default)]
    count: bool,
}

/// Translate the request of a golden file directory, and render the SQL with its
/// parameters for comparison against the snapshot.
pub async fn test_translation(testname: &str) -> anyhow::Result<String> {
    let _ = env_logger::builder().is_test(true).try_init();

    let parsed_configuration =
        sql_queryable_configuration::parse_configuration("tests/configuration").await?;
    let configuration = sql_queryable_configuration::make_runtime_configuration(
        parsed_configuration,
        FixedEnvironment::from([(
            DEFAULT_CONNECTION_URI_VARIABLE.into(),
            "the translation tests do not rely on a database connection".into(),
        )]),
    )?;

    let directory = PathBuf::from("tests/goldenfiles").join(testname);
    let request: Request =
        serde_json::from_str(&fs::read_to_string(directory.join("request.json"))?)?;

    let info = configuration
        .native_query(&request.query)
        .with_context(|| format!("unknown native query '{}'", request.query))?;
    let mut plan = QueryPlan::<serde_json::Value>::from_native_query(info)
        .map_err(anyhow::Error::msg)?
        .with_tree(request.plan);
    for (name, value) in request.parameters {
        plan = plan.with_parameter(name, value);
    }

    let statement = if request.count {
        translation::query::translate_count(&plan)?
    } else {
        translation::query::translate(&plan)?.statement
    };
    let params: Vec<(&String, &Literal)> = statement.parameters().collect();

    Ok(format!("{}\n\n{:?}", statement.sql(), params))
}
