//! ingest-batch: convert a directory of PDFs offline.
//!
//! - `ingest-batch markdown` writes `<stem>.md` per PDF.
//! - `ingest-batch chunks [--embed]` writes `<stem>.chunks.json` per PDF.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use pagechunk_core::config::load_dotenv;
use pagechunk_core::Config;
use pagechunk_ingest::setup::build_pipeline;
use pagechunk_ingest::{run_batch, BatchOutput};

// ── CLI ─────────────────────────────────────────────────────────────

/// Offline PDF conversion to Markdown or chunk records.
#[derive(Parser, Debug)]
#[command(name = "ingest-batch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert each PDF to Markdown.
    Markdown {
        /// Directory scanned for `*.pdf` (not recursive).
        #[arg(long, env = "INGEST_INPUT_DIR")]
        input: Option<PathBuf>,

        #[arg(long, env = "INGEST_MARKDOWN_DIR")]
        output: Option<PathBuf>,
    },
    /// Chunk each PDF and write the records as JSON.
    Chunks {
        #[arg(long, env = "INGEST_INPUT_DIR")]
        input: Option<PathBuf>,

        #[arg(long, env = "INGEST_CHUNKS_DIR")]
        output: Option<PathBuf>,

        /// Attach embeddings from the configured provider.
        #[arg(long)]
        embed: bool,
    },
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let pipeline = build_pipeline(&config)?;

    let (input, output, mode) = match cli.command {
        Command::Markdown { input, output } => (
            input.unwrap_or_else(|| config.ingest.input_dir.clone()),
            output.unwrap_or_else(|| config.ingest.markdown_dir.clone()),
            BatchOutput::Markdown,
        ),
        Command::Chunks {
            input,
            output,
            embed,
        } => (
            input.unwrap_or_else(|| config.ingest.input_dir.clone()),
            output.unwrap_or_else(|| config.ingest.chunks_dir.clone()),
            BatchOutput::Chunks { embed },
        ),
    };

    if let BatchOutput::Chunks { embed: true } = mode {
        if pipeline.embedding_model().is_none() {
            anyhow::bail!("--embed requested but no embedding provider is configured");
        }
    }

    let summary = run_batch(&pipeline, &input, &output, mode).await?;
    info!(
        "Done: {} succeeded, {} failed, output in {}",
        summary.succeeded(),
        summary.failed(),
        output.display()
    );
    Ok(())
}
