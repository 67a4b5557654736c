//! Request and response bodies.

use serde::{Deserialize, Serialize};
use warden_core::models::account::{AccountType, NewAccount};
use warden_core::models::auth::Credentials;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Plain confirmation body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `POST /login` body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl From<LoginRequest> for Credentials {
    fn from(req: LoginRequest) -> Self {
        Credentials {
            email: req.email,
            password: req.password,
        }
    }
}

/// `POST /users` and `PUT /users` body.
#[derive(Deserialize)]
pub struct AccountRequest {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub account_type: AccountType,
    pub password: String,
}

impl From<AccountRequest> for NewAccount {
    fn from(req: AccountRequest) -> Self {
        NewAccount {
            id: req.id,
            full_name: req.full_name,
            email: req.email,
            account_type: req.account_type,
            password: req.password,
        }
    }
}

/// `GET /health` body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub database: bool,
    pub message_bus: bool,
}
