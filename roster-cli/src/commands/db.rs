//! Database connection arguments shared by commands

use std::time::Duration;

use clap::Args;
use roster_server::config::{DatabaseConfig, DEFAULT_ADMIN_DATABASE};
use roster_server::RetryPolicy;

#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// Database server host
    #[arg(long, env = "DB_HOST")]
    pub db_host: String,

    /// Database server port
    #[arg(long, env = "DB_PORT")]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: String,

    /// Application database (created if missing)
    #[arg(long, env = "DB_NAME")]
    pub db_name: String,

    /// Administrative database used while provisioning
    #[arg(long, env = "DB_ADMIN_NAME", default_value = DEFAULT_ADMIN_DATABASE)]
    pub db_admin_name: String,

    /// Connection attempts before giving up at startup
    #[arg(long, env = "DB_CONNECT_ATTEMPTS", default_value_t = 5)]
    pub connect_attempts: u32,

    /// Delay between connection attempts, in milliseconds
    #[arg(long, env = "DB_CONNECT_DELAY_MS", default_value_t = 3000)]
    pub connect_delay_ms: u64,
}

impl From<DbArgs> for DatabaseConfig {
    fn from(args: DbArgs) -> Self {
        Self {
            host: args.db_host,
            port: args.db_port,
            user: args.db_user,
            password: args.db_password,
            database: args.db_name,
            admin_database: args.db_admin_name,
            retry: RetryPolicy::new(
                args.connect_attempts,
                Duration::from_millis(args.connect_delay_ms),
            ),
        }
    }
}
