//! AMQP (RabbitMQ) event bus.

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tracing::info;

use super::{BusError, EventBus};

/// Reply code sent when closing the channel and connection.
const REPLY_SUCCESS: u16 = 200;

/// Connection plus a single publishing channel.
///
/// Owned by the process that composes the services; call [`AmqpBus::close`]
/// on shutdown.
pub struct AmqpBus {
    connection: Connection,
    channel: Channel,
}

impl AmqpBus {
    /// Connect and declare each queue as durable.
    pub async fn connect(url: &str, queues: &[&str]) -> Result<Self, BusError> {
        let connection = Connection::connect(url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        for queue in queues {
            channel
                .queue_declare(
                    queue,
                    QueueDeclareOptions {
                        durable: true,
                        ..QueueDeclareOptions::default()
                    },
                    FieldTable::default(),
                )
                .await?;
            info!(queue, "declared durable queue");
        }

        Ok(Self {
            connection,
            channel,
        })
    }

    /// Close the channel, then the connection.
    pub async fn close(&self) -> Result<(), BusError> {
        self.channel.close(REPLY_SUCCESS, "shutdown").await?;
        self.connection.close(REPLY_SUCCESS, "shutdown").await?;
        info!("AMQP connection closed");
        Ok(())
    }
}

#[async_trait]
impl EventBus for AmqpBus {
    async fn publish(
        &self,
        queue: &str,
        payload: &[u8],
        content_type: &str,
    ) -> Result<(), BusError> {
        if !self.is_connected() {
            return Err(BusError::Unavailable("connection is closed".into()));
        }
        // Default exchange: the routing key is the queue name.
        let _confirm = self
            .channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_content_type(content_type.to_string().into()),
            )
            .await?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection.status().connected() && self.channel.status().connected()
    }
}
