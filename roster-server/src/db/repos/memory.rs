//! In-process user store
//!
//! Mirrors the Postgres constraints that matter to callers: ids are
//! assigned in increasing order and emails are unique.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::users::{DbError, InsertOutcome, UserStore};
use crate::models::{NewUser, User};

#[derive(Default)]
struct Inner {
    last_id: i32,
    users: BTreeMap<i32, User>,
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn insert(&mut self, user: NewUser) -> User {
        self.last_id += 1;
        let user = user.with_id(self.last_id);
        self.users.insert(user.id, user.clone());
        user
    }
}

/// User store held in memory
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> Result<Vec<User>, DbError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().cloned().collect())
    }

    async fn create(&self, user: NewUser) -> Result<User, DbError> {
        let mut inner = self.inner.lock().await;
        if inner.email_taken(&user.email, None) {
            return Err(DbError::UniqueViolation {
                field: "email",
                value: user.email,
            });
        }
        Ok(inner.insert(user))
    }

    async fn update(&self, id: i32, user: NewUser) -> Result<User, DbError> {
        let mut inner = self.inner.lock().await;
        if !inner.users.contains_key(&id) {
            return Err(DbError::NotFound {
                resource: "user",
                id: id.to_string(),
            });
        }
        if inner.email_taken(&user.email, Some(id)) {
            return Err(DbError::UniqueViolation {
                field: "email",
                value: user.email,
            });
        }

        let updated = user.with_id(id);
        inner.users.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), DbError> {
        let mut inner = self.inner.lock().await;
        inner
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::NotFound {
                resource: "user",
                id: id.to_string(),
            })
    }

    async fn insert_batch(&self, users: &[NewUser]) -> Result<Vec<InsertOutcome>, DbError> {
        let mut inner = self.inner.lock().await;
        let outcomes = users
            .iter()
            .map(|user| {
                if inner.email_taken(&user.email, None) {
                    InsertOutcome::DuplicateEmail
                } else {
                    inner.insert(user.clone());
                    InsertOutcome::Inserted
                }
            })
            .collect();

        Ok(outcomes)
    }
}
