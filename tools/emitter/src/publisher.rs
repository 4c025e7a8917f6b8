//! Paced publishing onto the message channel
//!
//! Serializes each record into its JSON message and sends it as one
//! `Delivery`, waiting the configured interval between messages. The
//! channel is bounded; a full channel makes the publisher wait, a closed
//! one stops it.

use std::time::Duration;

use decade_stats::consumer::Delivery;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use types::record::YearRecord;

use crate::config::EmitterConfig;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("channel closed by consumer after {sent} messages")]
    ChannelClosed { sent: u64 },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Publishes records to the channel, one per tick.
#[derive(Debug, Clone)]
pub struct Publisher {
    topic: String,
    interval: Duration,
}

impl Publisher {
    pub fn new(config: &EmitterConfig) -> Self {
        Self {
            topic: config.topic.clone(),
            interval: config.interval,
        }
    }

    pub fn with_interval(topic: impl Into<String>, interval: Duration) -> Self {
        Self {
            topic: topic.into(),
            interval,
        }
    }

    /// Publish every record in order. Returns the number of messages sent.
    pub async fn publish_all(
        &self,
        records: &[YearRecord],
        tx: &mpsc::Sender<Delivery>,
    ) -> Result<u64, PublishError> {
        info!(
            topic = %self.topic,
            records = records.len(),
            "Starting message production"
        );

        let mut sent = 0u64;
        for record in records {
            if sent > 0 && !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }

            let payload = record.to_message()?;
            debug!(topic = %self.topic, offset = sent, payload = %payload, "Sending message");

            if tx.send(Delivery::new(sent, payload)).await.is_err() {
                warn!(topic = %self.topic, sent, "Consumer hung up, stopping production");
                return Err(PublishError::ChannelClosed { sent });
            }
            sent += 1;
        }

        info!(topic = %self.topic, sent, "Message production finished");
        Ok(sent)
    }
}
