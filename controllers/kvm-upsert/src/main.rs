//! KVM Upsert CLI
//!
//! Prints the resulting entry as JSON on stdout. Logs go to stderr.

use anyhow::Result;
use clap::Parser;
use kvm_upsert::{Cli, run_with_deadline};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    info!("Starting KVM upsert for {}/{}/{}", cli.org, cli.env, cli.kvm);

    let outcome = run_with_deadline(&cli).await.inspect_err(|e| {
        error!("KVM upsert failed: {}", e);
    })?;

    if outcome.changed() {
        info!("KVM entry {} updated", outcome.entry().name);
    }
    println!("{}", serde_json::to_string_pretty(outcome.entry())?);

    Ok(())
}
