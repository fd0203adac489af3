//! Connection provisioning with fixed-delay retry
//!
//! The database may come up after the service does, so startup connections
//! are retried a bounded number of times before giving up.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::models::ValidationError;

/// Default number of connection attempts before giving up.
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default pause between attempts.
const DEFAULT_DELAY: Duration = Duration::from_secs(3);

/// Retry policy for startup connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (0 is treated as 1)
    pub max_attempts: u32,
    /// Fixed delay between consecutive attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

/// Provisioning errors. All of them are fatal to startup.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("could not connect to database '{database}' after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        database: String,
        attempts: u32,
        last_error: String,
    },

    #[error("invalid database name: {0}")]
    InvalidDatabaseName(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A successful connection and the number of failures that preceded it
#[derive(Debug)]
pub struct Connected<T> {
    pub handle: T,
    pub failed_attempts: u32,
}

/// Run `connect` until it succeeds or the policy's attempts are used up.
///
/// `connect` receives the 1-based attempt number. Between failures the
/// calling task sleeps for `policy.delay`; there is no sleep after the
/// final failure.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    database: &str,
    mut connect: F,
) -> Result<Connected<T>, ProvisionError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match connect(attempt).await {
            Ok(handle) => {
                if attempt > 1 {
                    info!(database, attempt, "Database connection established after retry");
                }
                return Ok(Connected {
                    handle,
                    failed_attempts: attempt - 1,
                });
            }
            Err(e) => {
                last_error = e.to_string();
                warn!(
                    database,
                    attempt,
                    max_attempts = attempts,
                    error = %last_error,
                    "Database connection attempt failed"
                );
                if attempt < attempts {
                    sleep(policy.delay).await;
                }
            }
        }
    }

    Err(ProvisionError::RetriesExhausted {
        database: database.to_owned(),
        attempts,
        last_error,
    })
}

/// Open a single connection, verified with `SELECT 1`, retrying per `policy`.
pub async fn connect_with_retry(
    options: &PgConnectOptions,
    policy: RetryPolicy,
) -> Result<PgConnection, ProvisionError> {
    let database = options.get_database().unwrap_or("<default>").to_owned();

    let connected = retry_with_backoff(policy, &database, |_| async move {
        let mut conn = PgConnection::connect_with(options).await?;
        sqlx::query("SELECT 1").execute(&mut conn).await?;
        Ok::<_, sqlx::Error>(conn)
    })
    .await?;

    Ok(connected.handle)
}
