//! roster CLI - user record service
//!
//! - `serve`: provision the database, then run the HTTP API
//! - `provision`: provision the database and table only

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "roster",
    author,
    version,
    about = "User records REST API with CSV bulk import"
)]
struct Cli {
    /// Debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision the database and run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create the database and users table if missing, then exit
    Provision(commands::provision::ProvisionArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads env-backed arguments
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Provision(args) => commands::run_provision(args).await?,
    }
    Ok(())
}
