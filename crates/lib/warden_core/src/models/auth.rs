//! Authentication domain models.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Issuer embedded in every session token.
pub const TOKEN_ISSUER: &str = "flyhorizons-user-service";

/// Audience embedded in every session token.
pub const TOKEN_AUDIENCE: &str = "flyhorizons-api";

/// Session token lifetime: 72 hours.
pub const SESSION_LIFETIME_HOURS: i64 = 72;

/// Decoded JWT payload, exactly as it was signed.
pub type ClaimMap = serde_json::Map<String, serde_json::Value>;

/// Login credentials. Request-scoped, never persisted.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Role granted by a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the account ID.
    pub sub: i64,
    pub email: String,
    /// Duplicate of `sub`, still read by the web front-end.
    pub account_id: i64,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    /// Build claims for an account, issued at `now` and valid for 72 hours.
    pub fn new(account_id: i64, email: &str, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            sub: account_id,
            email: email.to_string(),
            account_id,
            role,
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_LIFETIME_HOURS)).timestamp(),
        }
    }
}

/// Signed session token handed back to the client after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
}

/// Per-request authorization context projected from verified claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: String,
    pub email: String,
}

impl AuthContext {
    /// Project verified claims into a context.
    ///
    /// Returns `None` unless `sub` is an integer and `role`/`email` are strings.
    pub fn from_claims(claims: &ClaimMap) -> Option<Self> {
        let user_id = claims.get("sub")?.as_i64()?;
        let role = claims.get("role")?.as_str()?;
        let email = claims.get("email")?.as_str()?;
        Some(Self {
            user_id,
            role: role.to_string(),
            email: email.to_string(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}
