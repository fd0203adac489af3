//! User repository
//!
//! One parameterized statement per operation:
//! - update/delete report zero matched rows as NotFound
//! - batch insert skips duplicate emails via ON CONFLICT

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::models::{NewUser, User};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("duplicate {field}: '{value}'")]
    UniqueViolation { field: &'static str, value: String },
}

impl DbError {
    fn user_not_found(id: i32) -> Self {
        Self::NotFound {
            resource: "user",
            id: id.to_string(),
        }
    }

    /// Classify a write failure, naming duplicate emails explicitly.
    fn from_write(err: sqlx::Error, email: &str) -> Self {
        let unique = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);

        if unique {
            Self::UniqueViolation {
                field: "email",
                value: email.to_owned(),
            }
        } else {
            Self::Sqlx(err)
        }
    }
}

/// Per-row result of a batch insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Row skipped because its email is already stored
    DuplicateEmail,
}

/// The five operations served against the `users` table
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All records ordered by id ascending.
    async fn list(&self) -> Result<Vec<User>, DbError>;

    /// Insert a record and return it with its assigned id.
    async fn create(&self, user: NewUser) -> Result<User, DbError>;

    /// Replace name, email and age of an existing record.
    async fn update(&self, id: i32, user: NewUser) -> Result<User, DbError>;

    async fn delete(&self, id: i32) -> Result<(), DbError>;

    /// Insert rows in order, skipping duplicate emails.
    ///
    /// Any other failure stops the batch; rows already inserted stay.
    async fn insert_batch(&self, users: &[NewUser]) -> Result<Vec<InsertOutcome>, DbError>;
}

/// Postgres-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, age FROM users ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create(&self, user: NewUser) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, age)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, age
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.age)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, &user.email))
    }

    async fn update(&self, id: i32, user: NewUser) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET name = $1, email = $2, age = $3
            WHERE id = $4
            RETURNING id, name, email, age
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.age)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, &user.email))?
        .ok_or_else(|| DbError::user_not_found(id))
    }

    async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::user_not_found(id));
        }
        Ok(())
    }

    async fn insert_batch(&self, users: &[NewUser]) -> Result<Vec<InsertOutcome>, DbError> {
        let mut outcomes = Vec::with_capacity(users.len());

        for user in users {
            let result = sqlx::query(
                r#"
                INSERT INTO users (name, email, age)
                VALUES ($1, $2, $3)
                ON CONFLICT (email) DO NOTHING
                "#,
            )
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.age)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                debug!(email = %user.email, "Skipping duplicate email");
                outcomes.push(InsertOutcome::DuplicateEmail);
            } else {
                outcomes.push(InsertOutcome::Inserted);
            }
        }

        Ok(outcomes)
    }
}
