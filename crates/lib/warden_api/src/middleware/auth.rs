//! Authentication middleware: Bearer token extraction and JWT verification.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use warden_core::models::auth::AuthContext;

use crate::AppState;
use crate::error::AppError;

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies the JWT,
/// and injects the caller's [`AuthContext`] into request extensions.
///
/// Never touches the account store.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("missing or invalid Authorization header".into()))?;

    let claims = state.signer.verify(token).map_err(|e| {
        debug!(reason = %e, "bearer token rejected");
        AppError::Unauthorized("invalid JWT token".into())
    })?;

    let context = AuthContext::from_claims(&claims)
        .ok_or_else(|| AppError::Unauthorized("invalid JWT claims".into()))?;

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}
