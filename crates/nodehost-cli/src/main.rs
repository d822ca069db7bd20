//! nodehost CLI binary.
//!
//! Composition root: parse arguments, install logging, bootstrap the
//! context and dispatch to a handler.

use clap::Parser;
use nodehost_cli::bootstrap::{CliConfig, bootstrap};
use nodehost_cli::error::exit_code_for;
use nodehost_cli::{Cli, Commands, handlers};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::with_defaults(cli.service_name)?;
    let ctx = bootstrap(config)?;

    match cli.command {
        Commands::Run(args) => handlers::run::execute(&ctx, args).await,
        Commands::Status(args) => handlers::status::execute(&ctx, &args).await,
        Commands::Send(args) => handlers::send::execute(&ctx, &args).await,
        Commands::Paths => handlers::paths::execute(&ctx),
    }
}
