//! Account management: creation, update, lookup and deletion.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::AccountStore;
use crate::auth::AuthError;
use crate::auth::password::PasswordHasher;
use crate::auth::policy::PasswordPolicy;
use crate::bus::lifecycle::LifecyclePublisher;
use crate::models::account::{Account, NewAccount};

/// Account operations that enforce the password policy and announce deletions.
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    policy: Arc<PasswordPolicy>,
    hasher: PasswordHasher,
    events: LifecyclePublisher,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        policy: Arc<PasswordPolicy>,
        hasher: PasswordHasher,
        events: LifecyclePublisher,
    ) -> Self {
        Self {
            store,
            policy,
            hasher,
            events,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<Account>, AuthError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Account, AuthError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AuthError::AccountNotFound(id))
    }

    pub async fn exists(&self, id: i64) -> Result<bool, AuthError> {
        Ok(self.store.find_by_id(id).await?.is_some())
    }

    /// Create an account after validating and hashing its password.
    pub async fn create(&self, new: NewAccount) -> Result<Account, AuthError> {
        if self.exists(new.id).await? {
            return Err(AuthError::AccountExists(new.id));
        }

        let password_hash = self.checked_hash(&new.password)?;
        let account = Account {
            id: new.id,
            full_name: new.full_name,
            email: new.email,
            account_type: new.account_type,
            password_hash,
            created_at: Utc::now(),
            last_login_at: None,
        };

        let created = self.store.create(account).await?;
        info!(
            target: "audit",
            user_id = created.id,
            account_type = created.account_type.label(),
            timestamp = %Utc::now().to_rfc3339(),
            "account created"
        );
        Ok(created)
    }

    /// Replace an account's details and password.
    pub async fn update(&self, new: NewAccount) -> Result<Account, AuthError> {
        let existing = self
            .store
            .find_by_id(new.id)
            .await?
            .ok_or(AuthError::AccountNotFound(new.id))?;

        let password_hash = self.checked_hash(&new.password)?;
        let account = Account {
            id: new.id,
            full_name: new.full_name,
            email: new.email,
            account_type: new.account_type,
            password_hash,
            created_at: existing.created_at,
            last_login_at: existing.last_login_at,
        };

        let updated = self.store.update(account).await?;
        info!(
            target: "audit",
            user_id = updated.id,
            account_type = updated.account_type.label(),
            timestamp = %Utc::now().to_rfc3339(),
            "account updated"
        );
        Ok(updated)
    }

    /// Delete an account and announce it on the bus.
    ///
    /// Returns whether the store removed a row. The announcement never
    /// affects the result.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool, AuthError> {
        if !self.exists(id).await? {
            return Err(AuthError::AccountNotFound(id));
        }

        let deleted = self.store.delete(id).await?;
        if deleted {
            self.events.account_deleted(id).await;
            info!(
                target: "audit",
                user_id = id,
                timestamp = %Utc::now().to_rfc3339(),
                "account deleted"
            );
        } else {
            warn!(user_id = id, "account store reported no row deleted");
        }
        Ok(deleted)
    }

    fn checked_hash(&self, password: &str) -> Result<String, AuthError> {
        self.policy.validate(password)?;
        self.hasher.hash(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::memory::MemoryAccountStore;
    use crate::auth::PolicyViolation;
    use crate::auth::password::TEST_COST;
    use crate::bus::lifecycle::testing::RecordingBus;
    use crate::models::account::AccountType;

    struct Fixture {
        service: AccountService,
        store: Arc<MemoryAccountStore>,
        bus: Arc<RecordingBus>,
    }

    fn fixture_with(bus: RecordingBus) -> Fixture {
        let store = Arc::new(MemoryAccountStore::new());
        let bus = Arc::new(bus);
        let service = AccountService::new(
            store.clone(),
            Arc::new(PasswordPolicy::from_passwords(["superman"])),
            PasswordHasher::with_cost(TEST_COST),
            LifecyclePublisher::new(bus.clone()),
        );
        Fixture {
            service,
            store,
            bus,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingBus::default())
    }

    fn new_account(id: i64, password: &str) -> NewAccount {
        NewAccount {
            id,
            full_name: "John Doe".into(),
            email: format!("john{id}@doe.it"),
            account_type: AccountType::User,
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn create_hashes_password() {
        let f = fixture();
        let created = f
            .service
            .create(new_account(1, "Fontysict1234!"))
            .await
            .unwrap();
        assert_ne!(created.password_hash, "Fontysict1234!");
        assert!(PasswordHasher::new().verify("Fontysict1234!", &created.password_hash));
        assert!(f.store.find_by_id(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_rejects_policy_violations() {
        let f = fixture();
        let err = f
            .service
            .create(new_account(1, "superman"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Policy(PolicyViolation::CommonPassword)
        ));
        assert!(f.store.find_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_existing_id() {
        let f = fixture();
        f.service
            .create(new_account(1, "Fontysict1234!"))
            .await
            .unwrap();
        let err = f
            .service
            .create(new_account(1, "Fontysict1234!"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountExists(1)));
    }

    #[tokio::test]
    async fn update_missing_account_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .update(new_account(9, "Fontysict1234!"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountNotFound(9)));
    }

    #[tokio::test]
    async fn update_validates_and_rehashes() {
        let f = fixture();
        let created = f
            .service
            .create(new_account(1, "Fontysict1234!"))
            .await
            .unwrap();

        let err = f
            .service
            .update(new_account(1, "short"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Policy(PolicyViolation::InsufficientLength)
        ));

        let mut changed = new_account(1, "Another1234!Pass");
        changed.full_name = "Johnny Doe".into();
        let updated = f.service.update(changed).await.unwrap();
        assert_eq!(updated.full_name, "Johnny Doe");
        assert_eq!(updated.created_at, created.created_at);
        assert!(PasswordHasher::new().verify("Another1234!Pass", &updated.password_hash));
    }

    #[tokio::test]
    async fn delete_publishes_exactly_once() {
        let f = fixture();
        f.service
            .create(new_account(5, "Fontysict1234!"))
            .await
            .unwrap();

        assert!(f.service.delete_by_id(5).await.unwrap());

        let messages = f.bus.messages();
        assert_eq!(messages.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&messages[0].1).unwrap();
        assert_eq!(body, serde_json::json!({"userId": 5}));
    }

    #[tokio::test]
    async fn delete_succeeds_when_publish_fails() {
        let f = fixture_with(RecordingBus::failing());
        f.service
            .create(new_account(5, "Fontysict1234!"))
            .await
            .unwrap();

        assert!(f.service.delete_by_id(5).await.unwrap());
        assert!(f.store.find_by_id(5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_account_does_not_publish() {
        let f = fixture();
        let err = f.service.delete_by_id(3).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountNotFound(3)));
        assert!(f.bus.messages().is_empty());
    }
}
