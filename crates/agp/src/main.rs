//! AGP installer CLI entry point

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agp_core::output;
use cli::{Cli, Commands};

/// Exit status for a failed provisioning stage
const EXIT_FAILURE: i32 = 1;
/// Exit status for rejected input
const EXIT_INVALID: i32 = 2;

#[tokio::main]
async fn main() {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::New(args) => commands::new::run(args, cli.no_interaction).await,
    };

    if let Err(err) = result {
        output::error(&format!("{err:#}"));
        std::process::exit(exit_code(&err));
    }
}

/// Map provisioning errors to the documented exit statuses
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<agp_provision::Error>() {
        Some(err) if err.is_invalid_input() => EXIT_INVALID,
        _ => EXIT_FAILURE,
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
