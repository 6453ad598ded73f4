use chrono::{Local, NaiveDateTime};
use clap::{Parser, builder::styling};
use customer_etl::{
    Pipeline,
    config::{DEFAULT_BATCH_SIZE, DEFAULT_STAGING_TABLE, DatabaseConfig},
    storage::{DEFAULT_DELIMITER, DelimitedFileReader, NdjsonWriter, StagingTableLoader},
    transform::{CustomerTransformer, dates::parse_lenient},
};
use eyre::{Context, Result, bail};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Validate a delimited customer file and append it to the staging table
#[derive(Parser)]
#[command(name = "customer-etl", version, styles = STYLES)]
struct Cli {
    /// The delimited customer file to ingest
    #[arg(default_value = "data/customer_data.csv")]
    input: PathBuf,

    /// Single-character field delimiter
    #[arg(short, long, default_value_t = DEFAULT_DELIMITER as char)]
    delimiter: char,

    /// Staging table to append to, optionally schema-qualified
    #[arg(short, long, default_value = DEFAULT_STAGING_TABLE)]
    table: String,

    /// Records per insert statement
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Reference time for age and recency, defaults to the local clock
    #[arg(long, value_parser = parse_now)]
    now: Option<NaiveDateTime>,

    /// Skip the database and write the transformed records as NDJSON
    #[arg(long)]
    dry_run: bool,

    /// NDJSON file written by --dry-run [default: customers_staging.ndjson]
    #[arg(short, long, requires = "dry_run")]
    output: Option<PathBuf>,

    /// The dotenv file to source DATABASE_URL from
    #[arg(short, long, default_value = ".env")]
    env: String,

    /// More verbose logging, including intermediate record counts
    #[arg(long)]
    debug: bool,
}

fn parse_now(value: &str) -> Result<NaiveDateTime, String> {
    parse_lenient(value).ok_or_else(|| format!("unrecognised date or timestamp '{}'", value))
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    match u8::try_from(delimiter) {
        Ok(byte) if delimiter.is_ascii() => Ok(byte),
        _ => bail!("Delimiter must be a single ASCII character, got '{}'", delimiter),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if Path::new(&cli.env).exists() {
        dotenvy::from_filename(&cli.env)
            .with_context(|| format!("Failed to load env file: {}", cli.env))?;
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    if cli.batch_size == 0 {
        bail!("--batch-size must be greater than zero");
    }

    let extractor =
        DelimitedFileReader::new(&cli.input).with_delimiter(delimiter_byte(cli.delimiter)?);
    let transformer =
        CustomerTransformer::new(cli.now.unwrap_or_else(|| Local::now().naive_local()));

    log::info!(
        "Ingesting {} as of {}",
        extractor.path().display().bright_black(),
        transformer.now().cyan()
    );

    let count = if cli.dry_run {
        let output = cli
            .output
            .unwrap_or_else(|| PathBuf::from(format!("{}.ndjson", DEFAULT_STAGING_TABLE)));
        let loader = NdjsonWriter::new(&output);
        log::info!("Dry run, writing to {}", loader.path().display().bright_black());
        Pipeline::new(extractor, transformer, loader).run().await?
    } else {
        let database = DatabaseConfig::from_env()?;
        log::debug!("Using database {}", database.redacted().bright_black());

        let loader = StagingTableLoader::try_new(database, &cli.table)?
            .with_batch_size(cli.batch_size);
        log::info!("Appending to {}", loader.table().cyan());
        Pipeline::new(extractor, transformer, loader).run().await?
    };

    log::info!("✓ Staged {} customer record(s)", count);
    Ok(())
}
