//! Login handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use warden_core::models::auth::{Credentials, SessionToken};

use crate::AppState;
use crate::client_ip::ClientIp;
use crate::error::AppResult;
use crate::models::LoginRequest;

/// `POST /login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SessionToken>)> {
    let Json(body) = body?;
    let credentials = Credentials::from(body);
    let token = state.login.login(&credentials, &ip).await?;
    Ok((StatusCode::CREATED, Json(token)))
}
