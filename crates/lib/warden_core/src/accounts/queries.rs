//! PostgreSQL-backed account store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{AccountStore, StoreError};
use crate::models::account::{Account, AccountType};

/// Row shape: (id, full_name, email, account_type, password_hash, created_at, last_login_at).
type AccountRow = (
    i64,
    String,
    String,
    i32,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

const ACCOUNT_COLUMNS: &str =
    "id, full_name, email, account_type, password_hash, created_at, last_login_at";

fn into_account(row: AccountRow) -> Account {
    let (id, full_name, email, account_type, password_hash, created_at, last_login_at) = row;
    Account {
        id,
        full_name,
        email,
        account_type: AccountType::from_code(account_type),
        password_hash,
        created_at,
        last_login_at,
    }
}

/// Map unique-constraint violations to [`StoreError::Conflict`].
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return StoreError::Conflict(db.message().to_string());
    }
    StoreError::Db(e)
}

/// Account store over the `accounts` table.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_all(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(into_account).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(into_account))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(into_account))
    }

    async fn create(&self, account: Account) -> Result<Account, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO accounts (id, full_name, email, account_type, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(account.id)
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(account.account_type.code())
        .bind(&account.password_hash)
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(into_account(row))
    }

    async fn update(&self, account: Account) -> Result<Account, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE accounts \
             SET full_name = $2, email = $3, account_type = $4, password_hash = $5 \
             WHERE id = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(account.id)
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(account.account_type.code())
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(into_account(row))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}
