mod cli;
mod error;
mod metrics;
mod model;
mod orchestrator;
mod query;
mod source;
mod storage;
mod store;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Diagnostics go to stderr so stdout stays clean for `--json`. The TUI owns
/// the terminal, so nothing is installed there.
fn init_logging(args: &cli::Cli) {
    if args.is_tui() {
        return;
    }
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pokedex_cli={}", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_logging(&args);
    let is_non_tui = !args.is_tui();

    match cli::run(args).await {
        Ok(()) => {
            if is_non_tui {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
