//! nxv: ephemeral registry environments for a monorepo build graph.
//!
//! # Usage
//!
//! ```text
//! nxv graph --workspace <file> [--config nxv.yaml] [--merged]
//! nxv registry start --project-name <name> [--environment-root <dir>] [--port <n>] [-- <command>...]
//! nxv registry stop --file-path <state-file>
//! nxv env bootstrap --project-name <name> [--keep-server-running] [-- <command>...]
//! nxv env setup --project-name <name> [--host-command "npx nx"] [-- <command>...]
//! nxv pkg publish|install --dist <dir> --environment-root <dir> [--pkg-version <v>]
//! ```
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries results.

mod commands;

use std::future::Future;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{env::EnvCommand, graph::GraphArgs, pkg::PkgCommand, registry::RegistryCommand};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "nxv",
    version,
    about = "Synthesize registry environment targets and run their executors",
    long_about = None,
)]
struct Cli {
    /// Default the log level to debug (RUST_LOG still wins).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the targets synthesized for every project in a workspace.
    Graph(GraphArgs),

    /// Start or stop an environment's registry server.
    Registry {
        #[command(subcommand)]
        command: RegistryCommand,
    },

    /// Bootstrap or set up an environment root.
    Env {
        #[command(subcommand)]
        command: EnvCommand,
    },

    /// Publish a built package to, or install it into, an environment.
    Pkg {
        #[command(subcommand)]
        command: PkgCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Graph(args) => args.run(),
        Commands::Registry { command } => commands::registry::run(command),
        Commands::Env { command } => commands::env::run(command),
        Commands::Pkg { command } => commands::pkg::run(command),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Drive one executor future to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    Ok(runtime.block_on(future))
}
