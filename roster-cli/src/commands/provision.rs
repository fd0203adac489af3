//! One-shot provisioning command

use anyhow::Result;
use clap::Parser;

use roster_server::config::DatabaseConfig;
use roster_server::db::initialize_schema;

use super::db::DbArgs;

/// Arguments for the provision command
#[derive(Parser, Debug)]
pub struct ProvisionArgs {
    #[command(flatten)]
    pub db: DbArgs,
}

/// Create the database and users table if they are missing
pub async fn run_provision(args: ProvisionArgs) -> Result<()> {
    let config = DatabaseConfig::from(args.db);

    let report = initialize_schema(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Provisioning failed");
        e
    })?;

    tracing::info!(
        database = %config.database,
        database_created = report.database_created,
        table_created = report.table_created,
        "Provisioning complete"
    );
    Ok(())
}
