//! Startup schema initialization
//!
//! Makes sure the application database and the `users` table exist.
//! Every step checks before creating, so running it on each start is a
//! no-op once the schema is in place.

use sqlx::postgres::PgConnection;
use sqlx::{Connection, PgPool};
use tracing::info;

use super::pool::create_pool;
use super::provision::{connect_with_retry, ProvisionError};
use crate::config::DatabaseConfig;
use crate::models::DatabaseName;

const USERS_TABLE_DDL: &str = r#"
    CREATE TABLE users (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(100) NOT NULL UNIQUE,
        age INTEGER NOT NULL
    )
"#;

/// What a provisioning run had to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaReport {
    pub database_created: bool,
    pub table_created: bool,
}

/// Provision the schema, then open the long-lived pool for the record store.
pub async fn initialize(config: &DatabaseConfig) -> Result<PgPool, ProvisionError> {
    let report = initialize_schema(config).await?;
    info!(
        database = %config.database,
        database_created = report.database_created,
        table_created = report.table_created,
        "Schema ready"
    );

    Ok(create_pool(config.connect_options()).await?)
}

/// Provision the database and `users` table on dedicated connections.
///
/// Both connections are closed before returning.
pub async fn initialize_schema(config: &DatabaseConfig) -> Result<SchemaReport, ProvisionError> {
    let name = DatabaseName::new(&config.database)?;

    info!(admin_database = %config.admin_database, "Connecting to administrative database");
    let mut admin = connect_with_retry(&config.admin_connect_options(), config.retry).await?;
    let database_created = ensure_database(&mut admin, &name).await?;
    admin.close().await?;

    info!(database = %name, "Connecting to application database");
    let mut conn = connect_with_retry(&config.connect_options(), config.retry).await?;
    let table_created = ensure_users_table(&mut conn).await?;
    conn.close().await?;

    Ok(SchemaReport {
        database_created,
        table_created,
    })
}

/// Create the database unless it already exists. Returns whether it was created.
pub async fn ensure_database(
    conn: &mut PgConnection,
    name: &DatabaseName,
) -> Result<bool, ProvisionError> {
    let existing: Option<i32> = sqlx::query_scalar("SELECT 1 FROM pg_database WHERE datname = $1")
        .bind(name.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    if existing.is_some() {
        info!(database = %name, "Database already exists");
        return Ok(false);
    }

    // Identifiers can't be bound; `name` is validated by DatabaseName
    let statement = format!("CREATE DATABASE {}", name.quoted());
    sqlx::query(&statement).execute(&mut *conn).await?;
    info!(database = %name, "Database created");
    Ok(true)
}

/// Create the `users` table unless it already exists. Returns whether it was created.
pub async fn ensure_users_table(conn: &mut PgConnection) -> Result<bool, ProvisionError> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = 'users'
        )
        "#,
    )
    .fetch_one(&mut *conn)
    .await?;

    if exists {
        info!("Table 'users' already exists");
        return Ok(false);
    }

    sqlx::query(USERS_TABLE_DDL).execute(&mut *conn).await?;
    info!("Table 'users' created");
    Ok(true)
}
