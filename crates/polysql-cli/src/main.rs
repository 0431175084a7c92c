//! polysql CLI
//!
//! Evaluates mini-language and polish-notation input and renders it as SQL
//! for a chosen database dialect.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value as Json;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use polysql_core::evaluator::{Evaluable, Evaluator};
use polysql_core::platform::{DialectKind, Platform, PlatformConfig};
use polysql_core::statement::{SelectQuery, StatementBuilder, StatementData};

/// Portable SQL expression compiler.
#[derive(Parser)]
#[command(name = "polysql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target dialect (generic, postgresql, mysql, sqlite).
    #[arg(short, long, env = "POLYSQL_DIALECT", default_value = "generic")]
    dialect: String,

    /// Server version to render for, e.g. "3.35.4". Newest if not given.
    #[arg(short, long, env = "POLYSQL_SERVER_VERSION")]
    server_version: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the expression tree of the input.
    Eval {
        /// Mini-language text, or a JSON document with --json.
        input: String,

        /// Read the input as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Compile the input and print SQL and parameters as JSON.
    Expr {
        /// Mini-language text, or a JSON document with --json.
        input: String,

        /// Read the input as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Build a SELECT statement and print it as JSON.
    Select {
        /// Table to select from.
        #[arg(short, long)]
        from: String,

        /// WHERE condition; repeated conditions are AND-ed.
        #[arg(short = 'w', long = "where")]
        conditions: Vec<String>,

        /// ORDER BY term; append " desc" for descending order.
        #[arg(short, long)]
        order_by: Vec<String>,

        /// Maximum number of rows.
        #[arg(short, long)]
        limit: Option<u64>,

        /// Rows to skip.
        #[arg(long)]
        offset: Option<u64>,

        /// Select-list expressions (all columns if not specified).
        columns: Vec<String>,
    },
}

fn evaluable(input: String, json: bool) -> anyhow::Result<Evaluable> {
    if json {
        let value: Json = serde_json::from_str(&input).context("Input is not valid JSON")?;
        Ok(value.into())
    } else {
        Ok(input.into())
    }
}

/// Splits a trailing ` desc` / ` asc` off an ORDER BY term.
fn order_term(term: &str) -> (&str, bool) {
    let term = term.trim_end();
    match term.rsplit_once(char::is_whitespace) {
        Some((expression, direction)) if direction.eq_ignore_ascii_case("desc") => {
            (expression, true)
        }
        Some((expression, direction)) if direction.eq_ignore_ascii_case("asc") => {
            (expression, false)
        }
        _ => (term, false),
    }
}

fn print(data: &StatementData) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::TRACE
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let Some(dialect) = DialectKind::from_name(&cli.dialect) else {
        bail!("Unknown dialect '{}'", cli.dialect);
    };
    let mut config = PlatformConfig::new(dialect);
    if let Some(version) = cli.server_version {
        config = config.server_version(version);
    }
    let platform = config.build();
    debug!(
        dialect = dialect.as_str(),
        server_version = ?platform.server_version(),
        "Platform ready"
    );

    let evaluator = Evaluator::default();
    let builder = StatementBuilder::new(platform);

    match cli.command {
        Commands::Eval { input, json } => {
            let expression = evaluator.evaluate(evaluable(input, json)?)?;
            println!("{expression:#?}");
        }

        Commands::Expr { input, json } => {
            let expression = evaluator.evaluate(evaluable(input, json)?)?;
            print(&builder.build_expression(&expression)?)?;
        }

        Commands::Select {
            from,
            conditions,
            order_by,
            limit,
            offset,
            columns,
        } => {
            let mut query = SelectQuery::new()
                .columns(evaluator.evaluate_all(columns)?)
                .from(from.as_str());
            for condition in conditions {
                query = query.where_clause(evaluator.evaluate(condition)?);
            }
            for term in &order_by {
                let (expression, descending) = order_term(term);
                let expression = evaluator.evaluate(expression)?;
                query = if descending {
                    query.order_by_desc(expression)
                } else {
                    query.order_by(expression)
                };
            }
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            if let Some(offset) = offset {
                query = query.offset(offset);
            }
            let data = builder.build(&query.into())?;
            info!(
                parameters = data.parameters().count(),
                columns = data.result_columns().len(),
                "Built SELECT"
            );
            print(&data)?;
        }
    }

    Ok(())
}
