//! Collaborator health status.
//!
//! A background poller samples the account store and the event bus and
//! publishes the result as read-only flags for the `/health` endpoint and
//! as gauges for `/metrics`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{describe_gauge, gauge};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::accounts::AccountStore;
use crate::bus::EventBus;

/// Default interval between health samples.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Gauge names, as scraped by the existing dashboards.
pub const DATABASE_HEALTH_GAUGE: &str = "mssql_db_health";
pub const MESSAGE_BUS_HEALTH_GAUGE: &str = "rabbitmq_health";

/// Register help text for the health gauges with the installed recorder.
pub fn describe_health_metrics() {
    describe_gauge!(
        DATABASE_HEALTH_GAUGE,
        "Database health status: 1 for up, 0 for down"
    );
    describe_gauge!(
        MESSAGE_BUS_HEALTH_GAUGE,
        "RabbitMQ health status: 1 for up, 0 for down"
    );
}

fn up_down(up: bool) -> f64 {
    if up { 1.0 } else { 0.0 }
}

/// Latest health sample. Cheap to clone; all clones share the same flags.
#[derive(Debug, Clone, Default)]
pub struct HealthStatus {
    database: Arc<AtomicBool>,
    message_bus: Arc<AtomicBool>,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn database_up(&self) -> bool {
        self.database.load(Ordering::Relaxed)
    }

    pub fn message_bus_up(&self) -> bool {
        self.message_bus.load(Ordering::Relaxed)
    }

    pub fn is_healthy(&self) -> bool {
        self.database_up() && self.message_bus_up()
    }

    fn record(&self, database: bool, message_bus: bool) {
        self.database.store(database, Ordering::Relaxed);
        self.message_bus.store(message_bus, Ordering::Relaxed);
        gauge!(DATABASE_HEALTH_GAUGE).set(up_down(database));
        gauge!(MESSAGE_BUS_HEALTH_GAUGE).set(up_down(message_bus));
    }

    /// Take one sample of both collaborators.
    pub async fn sample(&self, store: &dyn AccountStore, bus: &dyn EventBus) {
        let database = store.ping().await;
        let message_bus = bus.is_connected();
        self.record(database, message_bus);
        debug!(database, message_bus, "health sample");
    }
}

/// Sample health every `interval` until `cancel` fires.
pub async fn poll_health(
    store: Arc<dyn AccountStore>,
    bus: Arc<dyn EventBus>,
    status: HealthStatus,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => status.sample(store.as_ref(), bus.as_ref()).await,
        }
    }
    info!("health poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::memory::MemoryAccountStore;
    use crate::bus::lifecycle::testing::RecordingBus;

    #[test]
    fn starts_unhealthy() {
        let status = HealthStatus::new();
        assert!(!status.database_up());
        assert!(!status.message_bus_up());
        assert!(!status.is_healthy());
    }

    #[tokio::test]
    async fn sample_reflects_collaborators() {
        let status = HealthStatus::new();
        let store = MemoryAccountStore::new();

        status.sample(&store, &RecordingBus::default()).await;
        assert!(status.is_healthy());

        status.sample(&store, &RecordingBus::failing()).await;
        assert!(status.database_up());
        assert!(!status.message_bus_up());
        assert!(!status.is_healthy());
    }

    #[tokio::test]
    async fn clones_share_flags() {
        let status = HealthStatus::new();
        let view = status.clone();
        status
            .sample(&MemoryAccountStore::new(), &RecordingBus::default())
            .await;
        assert!(view.is_healthy());
    }

    #[test]
    fn record_sets_gauges() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let status = HealthStatus::new();

        metrics::with_local_recorder(&recorder, || {
            describe_health_metrics();
            status.record(true, false);
        });

        let rendered = handle.render();
        let value = |name: &str| -> f64 {
            rendered
                .lines()
                .find_map(|l| l.strip_prefix(name)?.strip_prefix(' '))
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or_else(|| panic!("{name} missing from:\n{rendered}"))
        };
        assert_eq!(value(DATABASE_HEALTH_GAUGE), 1.0);
        assert_eq!(value(MESSAGE_BUS_HEALTH_GAUGE), 0.0);
        assert!(rendered.contains("# HELP rabbitmq_health"), "{rendered}");
    }

    #[tokio::test(start_paused = true)]
    async fn poller_samples_until_cancelled() {
        let status = HealthStatus::new();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_health(
            Arc::new(MemoryAccountStore::new()),
            Arc::new(RecordingBus::default()),
            status.clone(),
            Duration::from_secs(10),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(status.is_healthy());

        cancel.cancel();
        handle.await.unwrap();
    }
}
