//! Message bus publishing.
//!
//! [`EventBus`] is the publish-only seam to the message broker. The AMQP
//! implementation lives in [`amqp`]; [`lifecycle`] announces account events
//! on top of it.

pub mod amqp;
pub mod lifecycle;

use async_trait::async_trait;
use thiserror::Error;

/// Durable queue receiving account deletion events.
pub const USER_DELETED_QUEUE: &str = "user_deleted";

/// Content type of every published event.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Event bus errors.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("AMQP error: {0}")]
    Amqp(#[from] lapin::Error),

    #[error("Bus unavailable: {0}")]
    Unavailable(String),
}

/// Publish sink for events. No delivery acknowledgment is tracked.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish `payload` to the named queue.
    async fn publish(&self, queue: &str, payload: &[u8], content_type: &str)
    -> Result<(), BusError>;

    /// Whether the underlying connection is currently open.
    fn is_connected(&self) -> bool;
}
