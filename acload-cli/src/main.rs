//! acload: bulk load and delete Asset Central records from a workbook

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use colored::*;

use acload::bulk::{self, BulkOperation};
use acload::{AssetCentral, Config, Session};

#[derive(Parser)]
#[command(name = "acload")]
#[command(version)]
#[command(about = "Create or delete Asset Central indicators, groups, templates, models and equipment from an .xlsx workbook")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every request (same as RUST_LOG=debug)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create every record in the workbook and write the new ids into it
    Load {
        /// Workbook with Indicator, Indicator Group, Model Template, Model and Equipment sheets
        datafile: PathBuf,
    },
    /// Delete every record whose id is filled in and clear the ids
    Delete {
        /// Workbook previously filled by `acload load`
        datafile: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let (operation, datafile) = match cli.command {
        Commands::Load { datafile } => (BulkOperation::Load, datafile),
        Commands::Delete { datafile } => (BulkOperation::Delete, datafile),
    };

    match run(operation, &datafile).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(operation: BulkOperation, datafile: &Path) -> Result<()> {
    if !datafile.is_file() {
        bail!("Data file does not exist: {}", datafile.display());
    }

    let config = Config::from_env()?;
    log::debug!("Using {:?}", config);
    let session = Session::acquire(config).await?;
    let ac = AssetCentral::new(session);

    println!("{} {}", "Processing".bold(), datafile.display().to_string().cyan());
    let report = bulk::run_file(&ac, operation, datafile).await?;
    report.print_summary();
    Ok(())
}
