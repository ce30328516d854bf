use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;

use crate::database::models::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store operation '{operation}' timed out after {timeout:?}")]
    Timeout { operation: &'static str, timeout: Duration },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Result of an atomic insert keyed on email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Conflict,
}

/// Persistence for user records keyed by (normalized) email.
///
/// `insert_if_absent` must be atomic with respect to other inserts of the
/// same email; implementations rely on a store-level uniqueness guarantee
/// rather than a prior lookup.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert_if_absent(&self, user: User) -> Result<InsertOutcome, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// PostgreSQL-backed store; uniqueness comes from the `users.email` primary key.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT email, name, password, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_if_absent(&self, user: User) -> Result<InsertOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, name, password, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Conflict)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
