//! Binary crate for the `wxdash` weather dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly output formatting

use std::{io, path::PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod output;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before tracing starts so that RUST_LOG may come from .env.
    let dotenv = dotenv_problem(dotenvy::dotenv());

    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    if let Some(err) = dotenv {
        tracing::warn!(error = %err, "ignoring unreadable .env file");
    }
    cmd.run().await
}

/// A missing .env is the normal case; anything else is worth a warning.
fn dotenv_problem(res: Result<PathBuf, dotenvy::Error>) -> Option<dotenvy::Error> {
    match res {
        Ok(_) => None,
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => Some(e),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}
