//! Command line front end: compile plans against the configured base queries.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use query_engine_metadata::metadata::Literal;
use query_engine_plan::plan::{PlanNode, QueryPlan};
use query_engine_translation::translation;
use sql_queryable_configuration::{version1, ParsedConfiguration};

/// Compile query plans over base SQL into MySQL statements.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The directory holding `configuration.json`.
    #[arg(long, global = true, env = "SQL_QUERYABLE_CONFIGURATION", default_value = ".")]
    configuration: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write an initial configuration, and its JSON schema, to the configuration directory.
    Initialize,
    /// Translate a plan and print the statement with its parameters.
    Translate {
        /// Name of the native query the plan starts from.
        #[arg(long)]
        query: String,
        /// A JSON file holding the plan tree.
        #[arg(long)]
        plan: PathBuf,
        /// A parameter of the base SQL, as `Name=value`. The value is either a typed
        /// literal such as `{"type":"int","value":18}` or plain text.
        #[arg(long = "parameter", value_name = "NAME=VALUE")]
        parameters: Vec<String>,
        /// Count the rows instead of fetching them.
        #[arg(long)]
        count: bool,
        /// Pretty print the statement.
        #[arg(long)]
        pretty: bool,
    },
    /// Print the JSON schema of `configuration.json`.
    PrintSchema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Initialize => initialize(&cli.configuration).await,
        Command::Translate {
            query,
            plan,
            parameters,
            count,
            pretty,
        } => {
            let configuration = version1::parse_configuration(&cli.configuration).await?;
            let output = translate(&configuration, &query, &plan, &parameters, count, pretty)?;
            println!("{output}");
            Ok(())
        }
        Command::PrintSchema => {
            let schema = sql_queryable_configuration::configuration_jsonschema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

async fn initialize(configuration_dir: &Path) -> anyhow::Result<()> {
    let configuration_file = configuration_dir.join(version1::CONFIGURATION_FILENAME);
    if configuration_file.exists() {
        anyhow::bail!(
            "{} already exists, refusing to overwrite it",
            configuration_file.display()
        );
    }
    version1::write_parsed_configuration(ParsedConfiguration::initial(), configuration_dir)
        .await?;
    tracing::info!("Wrote {}", configuration_file.display());
    Ok(())
}

fn translate(
    configuration: &ParsedConfiguration,
    query: &str,
    plan_file: &Path,
    parameters: &[String],
    count: bool,
    pretty: bool,
) -> anyhow::Result<String> {
    let info = configuration
        .metadata
        .native_queries
        .lookup(query)
        .with_context(|| format!("unknown native query '{query}'"))?;

    let tree: PlanNode = serde_json::from_str(
        &std::fs::read_to_string(plan_file)
            .with_context(|| format!("reading {}", plan_file.display()))?,
    )
    .with_context(|| format!("parsing the plan in {}", plan_file.display()))?;

    let mut plan = QueryPlan::<()>::from_native_query(info)
        .map_err(anyhow::Error::msg)?
        .with_tree(tree);
    for parameter in parameters {
        let (name, value) = parse_parameter(parameter)?;
        plan = plan.with_parameter(name, value);
    }

    let statement = if count {
        translation::query::translate_count(&plan)?
    } else {
        translation::query::translate(&plan)?.statement
    };

    let sql = if pretty {
        sqlformat::format(
            statement.sql(),
            &sqlformat::QueryParams::None,
            sqlformat::FormatOptions::default(),
        )
    } else {
        statement.sql().to_string()
    };

    let mut output = sql;
    output.push('\n');
    for (name, value) in statement.parameters() {
        output.push_str(&format!("\n{name} = {value}"));
    }
    Ok(output)
}

fn parse_parameter(parameter: &str) -> anyhow::Result<(&str, Literal)> {
    let (name, value) = parameter
        .split_once('=')
        .with_context(|| format!("expected NAME=VALUE, got '{parameter}'"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("parameter '{parameter}' has no name");
    }
    let value = serde_json::from_str::<Literal>(value).unwrap_or_else(|_| Literal::from(value));
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_are_typed_or_text() {
        assert_eq!(
            parse_parameter(r#"MinimumAge={"type":"int","value":18}"#).unwrap(),
            ("MinimumAge", Literal::Int(18))
        );
        assert_eq!(
            parse_parameter("Name=a=b").unwrap(),
            ("Name", Literal::String("a=b".to_string()))
        );
        assert!(parse_parameter("=1").is_err());
        assert!(parse_parameter("Name").is_err());
    }
}
