use std::{marker::PhantomData, time::Instant};

use redis::AsyncCommands;
use serde::Serialize;
use tracing::{debug, info};

use crate::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Connection string, e.g. `redis://localhost:6379`.
    pub uri: String,
    pub queue: String,
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("unable to connect to redis: {0}")]
    Connection(#[source] redis::RedisError),
    #[error("unable to encode message: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("LPUSH to queue '{queue}' failed: {source}")]
    Delivery {
        queue: String,
        #[source]
        source: redis::RedisError,
    },
}

/// Pushes JSON encoded messages onto the head of a redis list.
///
/// A fresh connection is opened per message, nothing is pooled.
#[derive(Debug)]
pub struct RedisQueueNotifier<T> {
    config: QueueConfig,
    _message: PhantomData<fn(T)>,
}

impl<T> RedisQueueNotifier<T> {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            _message: PhantomData,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl<T> Notifier for RedisQueueNotifier<T>
where
    T: Serialize + Send + 'static,
{
    type Message = T;
    type Error = QueueError;

    async fn notify(&self, message: Self::Message) -> Result<(), Self::Error> {
        let start = Instant::now();

        let bytes = serde_json::to_vec(&message)?;
        debug!("[Queue] Encoded message into {} bytes", bytes.len());

        let client =
            redis::Client::open(self.config.uri.as_str()).map_err(QueueError::Connection)?;
        let mut conn = client
            .get_async_connection()
            .await
            .map_err(QueueError::Connection)?;

        let _: i64 = conn
            .lpush(&self.config.queue, bytes)
            .await
            .map_err(|source| QueueError::Delivery {
                queue: self.config.queue.clone(),
                source,
            })?;

        info!(
            "[Queue] Pushed message onto '{}' in {:?}",
            self.config.queue,
            start.elapsed()
        );

        Ok(())
    }
}
