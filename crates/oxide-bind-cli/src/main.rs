//! oxide-bind CLI
//!
//! Compiles JSON statement descriptions for a dialect and resolves their
//! value tokens.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_bind::{
    Bind, CompiledQuery, ContextConfig, LimitDialect, QueryContext, SqlValue,
    StatementDescription,
};

/// Compile-once, bind-many SQL statements.
#[derive(Parser)]
#[command(name = "oxide-bind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dialect name (generic, postgres, sqlite, mysql, oracle).
    #[arg(short, long, env = "OXIDE_BIND_DIALECT", default_value = "generic")]
    dialect: String,

    /// JSON context configuration; overrides --dialect.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pagination grammar override (offset, xy, rownum).
    #[arg(short, long)]
    limit_dialect: Option<LimitDialect>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL and what each placeholder binds.
    Compile {
        /// Statement description (JSON).
        spec: PathBuf,
    },

    /// Print the SQL and the resolved bind values of a statement.
    Resolve {
        /// Statement description (JSON).
        spec: PathBuf,

        /// Token values, a JSON object of name to value.
        #[arg(long)]
        values: PathBuf,

        /// Bind NULL for missing tokens instead of failing.
        #[arg(long)]
        lenient: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => Some(parse_config(&read(path)?)?),
        None => None,
    };
    let ctx = build_context(&cli.dialect, config.as_ref(), cli.limit_dialect)?;
    info!(
        dialect = ctx.dialect(),
        limit_dialect = %ctx.limit_dialect(),
        "using context"
    );

    match cli.command {
        Commands::Compile { spec } => {
            let compiled = load_statement(&read(&spec)?)?.compile(&ctx)?;
            print!("{}", render_compiled(&compiled)?);
        }

        Commands::Resolve {
            spec,
            values,
            lenient,
        } => {
            let compiled = load_statement(&read(&spec)?)?.compile(&ctx)?;
            let values = parse_values(&read(&values)?)?;
            let resolved = if lenient {
                compiled.resolve_lenient(&values)
            } else {
                compiled.resolve(&values)?
            };
            print!("{}", render_resolved(&compiled, &resolved)?);
        }
    }

    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Builds the context from the dialect flag, an optional config file and
/// an optional pagination override, in increasing precedence.
fn build_context(
    dialect: &str,
    config: Option<&ContextConfig>,
    limit_dialect: Option<LimitDialect>,
) -> anyhow::Result<QueryContext> {
    let ctx = match config {
        Some(config) => QueryContext::from_config(config)?,
        None => QueryContext::from_name(dialect)?,
    };
    Ok(match limit_dialect {
        Some(limit) => ctx.with_limit_dialect(limit),
        None => ctx,
    })
}

fn parse_config(text: &str) -> anyhow::Result<ContextConfig> {
    serde_json::from_str(text).context("invalid context configuration")
}

fn load_statement(text: &str) -> anyhow::Result<StatementDescription> {
    let statement = StatementDescription::from_json(text)?;
    debug!(kind = statement.kind(), "loaded statement description");
    Ok(statement)
}

fn parse_values(text: &str) -> anyhow::Result<BTreeMap<String, SqlValue>> {
    serde_json::from_str(text).context("token values must be a JSON object of scalars")
}

/// Prints the SQL, then one line per placeholder: `:name` for a value
/// token, the JSON value for a bind fixed at build time.
fn render_compiled(compiled: &CompiledQuery) -> anyhow::Result<String> {
    let mut out = format!("{}\n", compiled.sql());
    for bind in compiled.binds() {
        match bind {
            Bind::Token(t) => out.push_str(&format!(":{}\n", t.name())),
            Bind::Value(v) => out.push_str(&format!("{}\n", serde_json::to_string(v)?)),
        }
    }
    Ok(out)
}

fn render_resolved(compiled: &CompiledQuery, values: &[SqlValue]) -> anyhow::Result<String> {
    Ok(format!(
        "{}\n{}\n",
        compiled.sql(),
        serde_json::to_string(values)?
    ))
}
