mod adapters;
mod cli;
mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let result = cli::context::init(args.config_dir.as_deref()).and_then(|_| match &args.command {
        Commands::Keys { action } => cli::commands::keys::execute(action),
    });

    if let Err(e) = result {
        cli::output::error(e);
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr. `RUST_LOG` overrides the level picked here.
fn init_tracing(verbose: bool) {
    let level = if verbose { "signkeys=debug" } else { "signkeys=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
