//! Warden identity and session API server binary.
//!
//! Connects the account database and the message bus, starts the health
//! poller and serves the HTTP API until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use warden_api::config::ApiConfig;
use warden_core::accounts::queries::PgAccountStore;
use warden_core::auth::password::PasswordHasher;
use warden_core::auth::policy::PasswordPolicy;
use warden_core::bus::USER_DELETED_QUEUE;
use warden_core::bus::amqp::AmqpBus;
use warden_core::health::{describe_health_metrics, poll_health};

/// CLI arguments for the API server. Everything else comes from the environment.
#[derive(Parser, Debug)]
#[command(name = "warden_server", about = "Warden identity and session API server")]
struct Args {
    /// Port to listen on. Overrides the port in `BIND_ADDR`.
    #[arg(long)]
    port: Option<u16>,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,
}

fn bind_addr(config: &ApiConfig, port: Option<u16>) -> String {
    match port {
        Some(port) => {
            let host = config
                .bind_addr
                .rsplit_once(':')
                .map_or(config.bind_addr.as_str(), |(host, _)| host);
            format!("{host}:{port}")
        }
        None => config.bind_addr.clone(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Wait for the health poller, logging a panic or cancellation instead of dropping it.
async fn join_poller(poller: JoinHandle<()>) {
    if let Err(e) = poller.await {
        warn!(error = %e, panicked = e.is_panic(), "health poller did not stop cleanly");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,warden_api=debug,warden_core=debug".into()),
        )
        .init();

    let args = Args::parse();
    let config = ApiConfig::from_env()?;
    let addr = bind_addr(&config, args.port);

    info!(version = warden_core::version(), ?config, "starting warden_server");

    let policy = PasswordPolicy::load(&config.common_passwords_path)?;

    info!(max_connections = args.max_connections, "configuring connection pool");
    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    warden_api::migrate(&pool).await?;

    let metrics = PrometheusBuilder::new().install_recorder()?;
    describe_health_metrics();

    let store = Arc::new(PgAccountStore::new(pool));
    let bus = Arc::new(AmqpBus::connect(&config.rabbitmq_url, &[USER_DELETED_QUEUE]).await?);

    let state = warden_api::AppState::new(
        &config,
        store.clone(),
        bus.clone(),
        policy,
        PasswordHasher::new(),
        metrics,
    );

    let poller_ct = CancellationToken::new();
    let poller = tokio::spawn(poll_health(
        store,
        bus.clone(),
        state.health.clone(),
        config.health_poll_interval,
        poller_ct.clone(),
    ));

    let app = warden_api::router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    let api_result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    poller_ct.cancel();
    join_poller(poller).await;

    if let Err(e) = bus.close().await {
        warn!(error = %e, "failed to close message bus connection");
    }

    api_result?;

    Ok(())
}
