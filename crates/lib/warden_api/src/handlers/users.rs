//! Account management handlers.
//!
//! Access rules: listing requires the admin role; reading, updating and
//! deleting are limited to the caller's own account.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use warden_core::models::account::{Account, NewAccount};
use warden_core::models::auth::AuthContext;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{AccountRequest, MessageResponse};

fn parse_user_id(raw: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::Validation("invalid userID".into()))
}

fn require_self(ctx: &AuthContext, id: i64) -> AppResult<()> {
    if ctx.user_id == id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "unauthorized: you can only access your own account".into(),
        ))
    }
}

/// `POST /users`: register a new account.
pub async fn create_handler(
    State(state): State<AppState>,
    body: Result<Json<AccountRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Account>)> {
    let Json(body) = body?;
    let account = state.accounts.create(NewAccount::from(body)).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// `GET /users`: list every account. Admin only.
pub async fn list_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<Vec<Account>>> {
    if !ctx.is_admin() {
        return Err(AppError::Forbidden(
            "unauthorized: admin access required".into(),
        ));
    }
    Ok(Json(state.accounts.get_all().await?))
}

/// `GET /users/{id}`
pub async fn get_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Account>> {
    let id = parse_user_id(&raw_id)?;
    require_self(&ctx, id)?;
    Ok(Json(state.accounts.get_by_id(id).await?))
}

/// `PUT /users`: replace the caller's own account.
pub async fn update_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<AccountRequest>, JsonRejection>,
) -> AppResult<Json<Account>> {
    let Json(body) = body?;
    require_self(&ctx, body.id)?;
    let account = state.accounts.update(NewAccount::from(body)).await?;
    Ok(Json(account))
}

/// `DELETE /users/{id}`
pub async fn delete_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_user_id(&raw_id)?;
    require_self(&ctx, id)?;
    if !state.accounts.delete_by_id(id).await? {
        return Err(AppError::Internal(format!("store reported no row deleted for {id}")));
    }
    Ok(Json(MessageResponse {
        message: "user deleted successfully".into(),
    }))
}
