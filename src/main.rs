//! # Brand Pipeline CLI (`brands`)
//!
//! The `brands` binary drives the pipeline: database initialization,
//! import and normalization, verification, seeding, export, and stats.
//!
//! ## Usage
//!
//! ```bash
//! brands --config ./config/brands.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `brands init` | Create the SQLite database and schema |
//! | `brands transform` | Import raw JSON (optional), normalize, verify |
//! | `brands verify` | Validate every stored document |
//! | `brands seed` | Insert the ten boundary cases and write the workbook |
//! | `brands export` | Write the collection as JSON |
//! | `brands stats` | Print collection statistics |
//! | `brands run` | transform → seed → stats → export |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use brand_pipeline::{
    config, export, logging, migrate, pipeline, seed, stats, transform, verify,
};

/// Brand Pipeline CLI: normalize loosely-structured brand records into a
/// fixed schema.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Log output goes to stderr; set `RUST_LOG` to tune it.
#[derive(Parser)]
#[command(
    name = "brands",
    about = "Normalize, seed, verify, and export brand records",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/brands.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the documents table.
    /// Running it multiple times is safe.
    Init,

    /// Normalize every stored document in place, then verify.
    ///
    /// With `--input` (or `[pipeline].input`), the raw documents in that
    /// JSON array are inserted first.
    Transform {
        /// JSON array of raw brand documents to import.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Validate every stored document against the brand schema.
    Verify,

    /// Insert the ten seed cases and document them in a workbook.
    Seed {
        /// Skip writing the `.xlsx` documentation.
        #[arg(long)]
        no_docs: bool,
    },

    /// Export the collection as pretty-printed JSON.
    ///
    /// Writes to `--output`, else `[export].path`, else stdout.
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show collection statistics.
    Stats,

    /// Run the whole pipeline: transform, seed, stats, export.
    Run {
        /// JSON array of raw brand documents to import.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Transform { input } => {
            transform::run_transform(&cfg, input.as_deref()).await?;
        }
        Commands::Verify => {
            verify::run_verify(&cfg).await?;
        }
        Commands::Seed { no_docs } => {
            seed::run_seed(&cfg, !no_docs).await?;
        }
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref()).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Run { input } => {
            pipeline::run_pipeline(&cfg, input.as_deref()).await?;
        }
    }

    Ok(())
}
