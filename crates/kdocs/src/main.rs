//! kdocs CLI - consent tooling for documentation sites.
//!
//! Provides commands for:
//! - `consent status|accept|decline|reset`: Operate the consent controller
//!   against the project's consent store
//! - `consent cookie`: Evaluate a request `Cookie` header
//! - `render banner|head`: Print the markup a page template embeds

mod commands;
mod error;
mod output;
mod site;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConsentCommand, RenderCommand};
use output::Output;

/// kdocs - consent tooling for documentation sites.
#[derive(Parser)]
#[command(name = "kdocs", version, about)]
struct Cli {
    /// Enable verbose output (consent and bootstrap logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or change the recorded analytics consent.
    #[command(subcommand)]
    Consent(ConsentCommand),
    /// Render page markup for the current consent state.
    #[command(subcommand)]
    Render(RenderCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Consent(cmd) => cmd.execute(),
        Commands::Render(cmd) => cmd.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
