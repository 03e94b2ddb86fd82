//! refoliate - Main entry point
//!
//! Restores FOLIO instance/holdings/item records from a directory tree of
//! exported JSON files. Loading, hierarchy reconstruction, and replay run
//! as three strictly sequential stages; anything wrong with the export is
//! caught before the first remote call.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use refoliate::config::FolioConfig;
use refoliate::folio::FolioClient;
use refoliate::{hierarchy, loader, replay};

/// Command-line arguments for refoliate
#[derive(Parser, Debug)]
#[command(name = "refoliate")]
#[command(about = "REstore FOLIo sAved insTancE records")]
#[command(version)]
struct Args {
    /// Directory containing exported JSON record files
    source_dir: PathBuf,

    /// Abort on the first record FOLIO rejects instead of continuing
    #[arg(long)]
    stop_on_error: bool,

    /// Log debug output to OUT ("-" for the console)
    #[arg(short = 'd', long, value_name = "OUT")]
    debug: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.debug.as_deref())?;

    if !args.source_dir.is_dir() {
        bail!(
            "Not a directory or not readable: {}",
            args.source_dir.display()
        );
    }

    let config = FolioConfig::load().context("Failed to get complete FOLIO credentials")?;
    let client = FolioClient::new(config)?;
    client
        .check_connection()
        .await
        .context("Unable to connect to FOLIO")?;
    info!("FOLIO connection verified");

    let records = loader::load_records(&args.source_dir)?;
    let roots = hierarchy::build_hierarchy(&records)?;
    info!(
        "Hierarchy complete: {} instance(s) at the top level",
        roots.len()
    );

    let summary = replay::restore(&client, &roots, args.stop_on_error).await?;
    info!(
        "Restore finished: {} created, {} already existed, {} rejected",
        summary.created, summary.skipped, summary.rejected
    );

    if !summary.is_clean() {
        bail!("{} record(s) were rejected by FOLIO", summary.rejected);
    }

    Ok(())
}

/// Set up tracing output
///
/// Without `--debug`, the filter honors RUST_LOG and defaults to info.
/// `--debug -` raises the level to debug on the console; `--debug <path>`
/// writes debug output to the given file instead.
fn init_tracing(debug: Option<&str>) -> Result<()> {
    let filter = match debug {
        Some(_) => EnvFilter::new("refoliate=debug"),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| "refoliate=info".into()),
    };

    match debug {
        Some(out) if out != "-" => {
            let file = std::fs::File::create(out)
                .with_context(|| format!("Cannot open debug output file: {}", out))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Arc::new(file))
                        .with_ansi(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}
