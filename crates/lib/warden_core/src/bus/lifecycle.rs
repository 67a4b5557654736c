//! Account lifecycle announcements.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::{EventBus, JSON_CONTENT_TYPE, USER_DELETED_QUEUE};

/// Payload of the `user_deleted` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDeletedEvent {
    pub user_id: i64,
}

/// Publishes account lifecycle events, fire-and-forget.
#[derive(Clone)]
pub struct LifecyclePublisher {
    bus: Arc<dyn EventBus>,
}

impl LifecyclePublisher {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }

    /// Announce a completed deletion.
    ///
    /// Call only after the store confirmed the row is gone. Failures are
    /// logged and swallowed: at most one delivery, no retry.
    pub async fn account_deleted(&self, user_id: i64) {
        let payload = match serde_json::to_vec(&AccountDeletedEvent { user_id }) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(user_id, error = %e, "failed to encode account deletion event");
                return;
            }
        };

        match self
            .bus
            .publish(USER_DELETED_QUEUE, &payload, JSON_CONTENT_TYPE)
            .await
        {
            Ok(()) => debug!(user_id, queue = USER_DELETED_QUEUE, "published account deletion event"),
            Err(e) => warn!(
                user_id,
                queue = USER_DELETED_QUEUE,
                error = %e,
                "failed to publish account deletion event"
            ),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingBus;
    use super::*;

    #[tokio::test]
    async fn publishes_user_id_as_json() {
        let bus = Arc::new(RecordingBus::default());
        LifecyclePublisher::new(bus.clone()).account_deleted(42).await;

        let messages = bus.messages();
        assert_eq!(messages.len(), 1);
        let (queue, payload, content_type) = &messages[0];
        assert_eq!(queue, "user_deleted");
        assert_eq!(content_type, "application/json");
        let body: serde_json::Value = serde_json::from_slice(payload).unwrap();
        assert_eq!(body, serde_json::json!({"userId": 42}));
    }

    #[tokio::test]
    async fn publish_failure_is_swallowed() {
        let bus = Arc::new(RecordingBus::failing());
        LifecyclePublisher::new(bus.clone()).account_deleted(7).await;
        assert_eq!(bus.messages().len(), 1);
    }
}
