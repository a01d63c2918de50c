//! `gridwire` command-line front end.
//!
//! ```bash
//! # Load a CSV into a SQLite table
//! gridwire import --db grid.sqlite --table people --csv people.csv
//!
//! # Answer a grid request against it
//! gridwire query --db grid.sqlite --table people -p sEcho=1 -p sSearch=tok
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gridwire::infra::import::csv::import_csv_table;
use gridwire::infra::sqlite::schema::{default_column_specs, open_connection};
use gridwire::{DataTable, GridConfig, RequestParams, SqliteSink};

#[derive(Parser, Debug)]
#[command(name = "gridwire", version, about = "Server-side processing for grid requests")]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a CSV file into a SQLite table
    Import {
        #[arg(long, env = "GRIDWIRE_DB", value_name = "FILE")]
        db: PathBuf,

        #[arg(long)]
        table: String,

        #[arg(long, value_name = "FILE")]
        csv: PathBuf,
    },

    /// Run a grid request against a SQLite table and print the JSON envelope
    Query(QueryArgs),
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[arg(long, env = "GRIDWIRE_DB", value_name = "FILE")]
    db: PathBuf,

    #[arg(long)]
    table: String,

    /// Grid configuration file (defaults to the platform config dir)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Request parameter as key=value; repeatable
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// JSON object of request parameters, applied before --param values
    #[arg(long, value_name = "FILE")]
    params_file: Option<PathBuf>,

    /// Pretty-print the envelope
    #[arg(long)]
    pretty: bool,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("gridwire=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gridwire=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<GridConfig> {
    match path {
        Some(path) => GridConfig::from_file(path),
        None => GridConfig::load_default(),
    }
}

fn load_request(args: &QueryArgs, config: &GridConfig) -> Result<RequestParams> {
    let mut pairs = Vec::new();
    if let Some(path) = &args.params_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read params file: {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse params file: {}", path.display()))?;
        let from_file = RequestParams::from_json(&value);
        pairs.extend(
            from_file
                .params()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
    }
    pairs.extend(args.params.iter().cloned());

    Ok(config.request(pairs))
}

fn run_query(args: QueryArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let request = load_request(&args, &config)?;
    let conn = open_connection(&args.db)?;

    let columns = if config.columns.is_empty() {
        default_column_specs(&conn, &args.table)?
    } else {
        config.column_specs()
    };

    let sink = SqliteSink::for_columns(conn, &args.table, &columns);
    let mut table = DataTable::new(sink, request, columns)?.with_config(&config);
    let envelope = table.produce()?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{output}");
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Import { db, table, csv } => {
            let imported = import_csv_table(&db, &table, &csv)?;
            info!(table = %imported.table, rows = imported.row_count, "import finished");
            println!(
                "imported {} rows into {} ({} columns)",
                imported.row_count,
                imported.table,
                imported.columns.len()
            );
            Ok(())
        }
        Command::Query(args) => run_query(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
