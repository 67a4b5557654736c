//! In-memory account store, for tests and local development.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{AccountStore, StoreError};
use crate::models::account::Account;

/// Account store keyed by account ID.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<BTreeMap<i64, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with the given accounts.
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: RwLock::new(accounts.into_iter().map(|a| (a.id, a)).collect()),
        }
    }
}

fn email_taken(accounts: &BTreeMap<i64, Account>, email: &str, except: i64) -> bool {
    accounts
        .values()
        .any(|a| a.email == email && a.id != except)
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_all(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.accounts.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id) {
            return Err(StoreError::Conflict(format!("id {}", account.id)));
        }
        if email_taken(&accounts, &account.email, account.id) {
            return Err(StoreError::Conflict(format!("email {}", account.email)));
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update(&self, account: Account) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;
        if email_taken(&accounts, &account.email, account.id) {
            return Err(StoreError::Conflict(format!("email {}", account.email)));
        }
        match accounts.get_mut(&account.id) {
            Some(existing) => {
                *existing = account.clone();
                Ok(account)
            }
            None => Err(StoreError::Db(sqlx::Error::RowNotFound)),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.accounts.write().await.remove(&id).is_some())
    }

    async fn record_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(account) = self.accounts.write().await.get_mut(&id) {
            account.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}
