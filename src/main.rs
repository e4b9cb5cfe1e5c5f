use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabular_qa::config::AppConfig;
use tabular_qa::{ingestion, resolve, server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabular-qa")]
#[command(about = "Ask aggregate questions about an uploaded table")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to listen on (or set TABULAR_QA_BIND)
        #[arg(long)]
        bind: Option<String>,

        /// Directory uploaded datasets are kept in (or set TABULAR_QA_UPLOAD_DIR)
        #[arg(long)]
        upload_dir: Option<PathBuf>,
    },
    /// Answer one question about a local file
    Ask {
        /// CSV, Excel (.xlsx), Parquet or JSON file
        file: PathBuf,

        /// The question, e.g. "highest revenue"
        query: String,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show how a file's columns are classified
    Inspect {
        /// CSV, Excel (.xlsx), Parquet or JSON file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Serve { bind, upload_dir } => {
            let mut config = AppConfig::from_env()?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(upload_dir) = upload_dir {
                config.upload_dir = upload_dir;
            }
            server::run(&config).await?;
            Ok(())
        }
        Commands::Ask { file, query, json } => ask(file, query, json),
        Commands::Inspect { file } => inspect(file),
    }
}

fn ask(file: PathBuf, query: String, json: bool) -> Result<()> {
    let table = ingestion::load_path(&file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    info!(rows = table.row_count(), "loaded {}", file.display());

    let result = resolve(&query, &table)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", result.answer);
    if let Some(details) = &result.details {
        for row in details {
            println!("  {}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

fn inspect(file: PathBuf) -> Result<()> {
    let table = ingestion::load_path(&file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    println!("{} rows", table.row_count());
    for column in table.columns() {
        let missing = column.values().iter().filter(|c| c.is_missing()).count();
        println!("  {:<30} {:?} ({} missing)", column.name(), column.kind(), missing);
    }
    Ok(())
}
