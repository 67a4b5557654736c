//! # warden_api
//!
//! HTTP API library for Warden.

pub mod client_ip;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use warden_core::accounts::AccountStore;
use warden_core::accounts::service::AccountService;
use warden_core::auth::jwt::TokenSigner;
use warden_core::auth::login::LoginService;
use warden_core::auth::password::PasswordHasher;
use warden_core::auth::policy::PasswordPolicy;
use warden_core::bus::EventBus;
use warden_core::bus::lifecycle::LifecyclePublisher;
use warden_core::health::HealthStatus;

use crate::config::ApiConfig;
use crate::handlers::{auth, health, metrics, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub login: Arc<LoginService>,
    /// Verifies bearer tokens in the auth middleware.
    pub signer: Arc<TokenSigner>,
    /// Flags written by the health poller.
    pub health: HealthStatus,
    /// Renders the Prometheus exposition served at `/metrics`.
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Wire the domain services around the given collaborators.
    pub fn new(
        config: &ApiConfig,
        store: Arc<dyn AccountStore>,
        bus: Arc<dyn EventBus>,
        policy: PasswordPolicy,
        hasher: PasswordHasher,
        metrics: PrometheusHandle,
    ) -> Self {
        let signer = Arc::new(TokenSigner::new(config.jwt_secret.as_bytes()));
        let accounts = AccountService::new(
            store.clone(),
            Arc::new(policy),
            hasher,
            LifecyclePublisher::new(bus),
        );
        let login = LoginService::new(store, hasher, signer.clone());
        Self {
            accounts: Arc::new(accounts),
            login: Arc::new(login),
            signer,
            health: HealthStatus::new(),
            metrics,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `warden_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    warden_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/login", post(auth::login_handler))
        .route("/users", post(users::create_handler))
        .route("/health", get(health::health_handler))
        .route("/metrics", get(metrics::metrics_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(
            "/users",
            get(users::list_handler).put(users::update_handler),
        )
        .route(
            "/users/{id}",
            get(users::get_handler).delete(users::delete_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
