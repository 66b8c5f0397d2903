//! Trawl CLI entry point.

mod args;
mod output;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use trawl_search::{SearchKind, search_async, search_files_async};

use crate::args::Cli;
use crate::output::{EXIT_ERROR, exit_code, write_results};

fn init_logging(cli: &Cli) {
    let log_level = cli.effective_log_level();

    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        tracing_subscriber::EnvFilter::new(format!(
            "error,trawl={level},trawl_search={level}",
            level = log_level.as_filter_str()
        ))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let kind = cli.command.kind();
    let args = cli.command.args();
    let options = args.to_options();
    let token = args.token();

    tracing::debug!("Searching {} for {:?}", kind.description(), options.query);

    let outcome = match kind {
        SearchKind::Files => search_files_async(options, token).await?,
        SearchKind::Content => search_async(options, token).await?,
    };

    write_results(io::stdout().lock(), &outcome, kind, args.json)?;

    if outcome.is_cancelled() {
        eprintln!("search interrupted");
    }
    tracing::info!(
        "{} results from {} files in {:?}",
        outcome.len(),
        outcome.stats.files_visited,
        outcome.stats.elapsed
    );

    Ok(exit_code(outcome.status))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
