//! Account persistence and account lifecycle.
//!
//! The [`AccountStore`] trait is the seam to the record store; the
//! [`service::AccountService`] runs account creation, update and deletion
//! against it.

pub mod memory;
pub mod queries;
pub mod service;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::account::Account;

/// Account store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Conflicting account: {0}")]
    Conflict(String),
}

/// Record store holding account rows.
///
/// Lookups return `Ok(None)` for missing rows; "not found" is never an error.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Account>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn create(&self, account: Account) -> Result<Account, StoreError>;

    async fn update(&self, account: Account) -> Result<Account, StoreError>;

    /// Delete an account. Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    async fn record_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Whether the store is reachable.
    async fn ping(&self) -> bool;
}
