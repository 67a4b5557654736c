//! Account domain models.
//!
//! These are internal domain models, distinct from the request/response
//! bodies defined in `warden_api::models`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of account. Persisted as an integer code.
///
/// Unknown codes normalize to [`AccountType::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum AccountType {
    Admin,
    User,
}

impl AccountType {
    /// Map a stored integer code to an account type.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => AccountType::Admin,
            _ => AccountType::User,
        }
    }

    /// Integer code used in storage and on the wire.
    pub fn code(self) -> i32 {
        match self {
            AccountType::Admin => 0,
            AccountType::User => 1,
        }
    }

    /// Human-readable label used in audit logs.
    pub fn label(self) -> &'static str {
        match self {
            AccountType::Admin => "Admin",
            AccountType::User => "User",
        }
    }
}

impl From<i32> for AccountType {
    fn from(code: i32) -> Self {
        AccountType::from_code(code)
    }
}

impl From<AccountType> for i32 {
    fn from(account_type: AccountType) -> Self {
        account_type.code()
    }
}

/// Persisted account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub account_type: AccountType,
    /// bcrypt hash. Never serialized into responses.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Account data submitted for creation or update, carrying the raw password.
#[derive(Clone)]
pub struct NewAccount {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub account_type: AccountType,
    pub password: String,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("id", &self.id)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("account_type", &self.account_type)
            .field("password", &"<redacted>")
            .finish()
    }
}
