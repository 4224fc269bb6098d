//! CLI entry point - the composition root.
//!
//! Loads `.env`, parses arguments, sets up logging, wires the Gemini client
//! and dispatches to a handler. Failures print the user-facing message and
//! exit with the code from [`CliError::exit_code`].

use clap::Parser;
use tracing_subscriber::EnvFilter;

use medreport_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

/// Log to stderr; `RUST_LOG` wins, otherwise `warn` (or `debug` with `--verbose`).
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = bootstrap(&CliConfig::from_cli(&cli))?;

    match cli.command {
        Commands::Analyze { file, speak } => handlers::analyze::execute(&ctx, &file, speak).await,
        Commands::Explain { term } => handlers::explain::execute(&ctx, &term).await,
        Commands::Speak { text } => handlers::speak::execute(&ctx, &text).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("{e}");
        std::process::exit(e.exit_code());
    }

    Ok(())
}
