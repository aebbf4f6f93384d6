use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tabledoc_ingest::{
    Discrepancy, DocumentParser, DocumentValidator, ExtractOptions, Finding, IngestReport, Store,
    StoreConfig, TableDocument, ValidationOptions, parse_threshold_date,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "tabledoc",
    version,
    about = "Extract HTML table documents into a document store and validate them"
)]
struct Cli {
    /// Database file; overrides TABLEDOC_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse every .html/.htm file in a directory and save the records.
    Parse(ParseArgs),
    /// Run the validation rules over saved records and discrepancies.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Directory holding the table documents.
    dir: PathBuf,

    /// Drop data cells past the last header instead of inventing header labels.
    #[arg(long)]
    no_fill_missing_headers: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Flag records whose serialized header list is shorter than this.
    #[arg(long)]
    max_headers_length: Option<usize>,

    /// Flag records created after this date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS).
    #[arg(long)]
    late_date: Option<String>,

    /// Flag records whose first-row sum exceeds this.
    #[arg(long)]
    high_sum: Option<i64>,
}

fn open_store(db: Option<PathBuf>) -> Result<(Store, StoreConfig)> {
    let mut config = StoreConfig::from_env();
    if let Some(db) = db {
        config.db_path = db;
    }
    let store = Store::open(&config.db_path)
        .with_context(|| format!("failed to open store '{}'", config.db_path.display()))?;
    Ok((store, config))
}

fn run_parse(db: Option<PathBuf>, args: &ParseArgs) -> Result<IngestReport> {
    let (store, config) = open_store(db)?;
    let records = store.collection::<TableDocument>(&config.tables_collection)?;
    let discrepancies = store.collection::<Discrepancy>(&config.discrepancies_collection)?;

    let options = ExtractOptions {
        fill_missing_headers: !args.no_fill_missing_headers,
    };
    let report = DocumentParser::new(&records, &discrepancies, options)
        .parse(&args.dir)
        .with_context(|| format!("failed to parse '{}'", args.dir.display()))?;

    store.close().context("failed to close store")?;
    Ok(report)
}

fn validation_options(args: &ValidateArgs) -> Result<ValidationOptions> {
    let late_date = args
        .late_date
        .as_deref()
        .map(parse_threshold_date)
        .transpose()
        .context("failed to parse --late-date")?;

    Ok(ValidationOptions {
        max_headers_length: args.max_headers_length,
        late_date,
        high_sum: args.high_sum,
    })
}

fn run_validate(db: Option<PathBuf>, args: &ValidateArgs) -> Result<Vec<Finding>> {
    let options = validation_options(args)?;
    let (store, config) = open_store(db)?;
    let records = store.collection::<TableDocument>(&config.tables_collection)?;
    let discrepancies = store.collection::<Discrepancy>(&config.discrepancies_collection)?;

    let findings = DocumentValidator::new(&records, &discrepancies, options)
        .validate()
        .context("validation failed")?;

    store.close().context("failed to close store")?;
    Ok(findings)
}

fn print_findings(findings: &[Finding]) -> Result<()> {
    for finding in findings {
        println!("{}", serde_json::to_string(finding)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tabledoc_ingest=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Parse(args) => run_parse(cli.db.clone(), args).map(|report| {
            if report.files_parsed > 0 {
                ExitCode::SUCCESS
            } else {
                eprintln!("warning: no .html/.htm files in '{}'", args.dir.display());
                ExitCode::from(2)
            }
        }),
        Commands::Validate(args) => run_validate(cli.db.clone(), args)
            .and_then(|findings| print_findings(&findings))
            .map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
