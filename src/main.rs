//! # ragchat CLI
//!
//! The `ragchat` binary builds the vector index, inspects it, and serves
//! the chat API.
//!
//! ## Usage
//!
//! ```bash
//! ragchat --config ./config/ragchat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragchat ingest` | Chunk and embed documents, write the index |
//! | `ragchat search "<query>"` | Retrieve top chunks for a query |
//! | `ragchat stats` | Summarize the persisted index |
//! | `ragchat serve` | Start the HTTP chat server |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default `info`, or `debug` with `--verbose`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ragchat::progress::ProgressMode;
use ragchat::{config, ingest, search, server, stats};

/// ragchat: a minimal retrieval-augmented chat backend.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/ragchat.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "ragchat",
    about = "A minimal retrieval-augmented chat backend",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ragchat.toml")]
    config: PathBuf,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk and embed the document collection, then write the index.
    ///
    /// The previous index is replaced only after every chunk has been
    /// embedded successfully.
    Ingest {
        /// Documents JSON file. Overrides `[documents].path`.
        #[arg(long)]
        docs: Option<PathBuf>,

        /// Show document and chunk counts without embedding or writing.
        #[arg(long)]
        dry_run: bool,

        /// Progress output: `human`, `json`, or `off`.
        /// Defaults to `human` when stderr is a terminal.
        #[arg(long)]
        progress: Option<ProgressMode>,
    },

    /// Retrieve the best-matching chunks for a query.
    Search {
        /// The search query.
        query: String,

        /// Number of results. Overrides `[retrieval].top_k`.
        #[arg(long)]
        top_k: Option<usize>,

        /// Minimum cosine similarity. Overrides `[retrieval].threshold`.
        #[arg(long)]
        threshold: Option<f32>,
    },

    /// Show index statistics.
    Stats,

    /// Start the HTTP chat server.
    Serve,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ingest {
            docs,
            dry_run,
            progress,
        } => {
            let progress = progress.unwrap_or_else(ProgressMode::default_for_tty);
            ingest::run_ingest(&cfg, docs.as_deref(), dry_run, progress).await?;
        }
        Commands::Search {
            query,
            top_k,
            threshold,
        } => {
            search::run_search(&cfg, &query, top_k, threshold).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
