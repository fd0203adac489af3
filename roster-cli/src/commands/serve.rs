//! HTTP server command
//!
//! Provisions the schema first; the listener is only bound once the
//! database and table are known to exist.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use roster_server::config::DatabaseConfig;
use roster_server::db::initialize;
use roster_server::http::{run_server, ServerConfig};

use super::db::DbArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Directory where uploaded CSV files are staged
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Only accept cross-origin requests from localhost
    #[arg(long)]
    pub cors_local_only: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let db_config = DatabaseConfig::from(args.db);

    let pool = initialize(&db_config).await.map_err(|e| {
        tracing::error!(error = %e, "Provisioning failed, refusing to start");
        e
    })?;

    let config = ServerConfig {
        bind_addr: SocketAddr::new(args.host, args.port),
        cors_permissive: !args.cors_local_only,
        upload_dir: args.upload_dir,
    };

    // Run server (blocks until shutdown)
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
