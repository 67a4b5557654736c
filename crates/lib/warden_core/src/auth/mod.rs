//! Authentication and authorization logic.
//!
//! Provides the password policy, password hashing, JWT signing and the
//! login flow, shared by `warden_api` and anything else that needs to
//! authenticate accounts.

pub mod jwt;
pub mod login;
pub mod password;
pub mod policy;

use thiserror::Error;

use crate::accounts::StoreError;
pub use policy::PolicyViolation;

/// Authentication and account errors.
///
/// Each variant maps to exactly one outward status at the HTTP boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    #[error("An error occurred while hashing the password. [Error code: 100]")]
    Hashing(String),

    #[error("Token signing failed")]
    Signing(String),

    #[error("The credentials provided are invalid. [Error code: 400]")]
    InvalidCredentials,

    #[error("The account type is invalid. [Error code: 401]")]
    InvalidAccountType,

    #[error("No account exists with ID {0}. [Error code: 404]")]
    AccountNotFound(i64),

    #[error("An account with ID {0} already exists. [Error code: 409]")]
    AccountExists(i64),

    #[error("Account store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Numeric error code reported to clients.
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Policy(v) => v.code(),
            AuthError::Hashing(_) => 100,
            AuthError::Signing(_) | AuthError::Store(_) => 500,
            AuthError::InvalidCredentials => 400,
            AuthError::InvalidAccountType => 401,
            AuthError::AccountNotFound(_) => 404,
            AuthError::AccountExists(_) => 409,
        }
    }
}
