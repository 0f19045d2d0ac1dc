pub mod config;
pub mod dispatch;
pub mod record;

use tattle_notifiers::notifiers::{
    governator::{GovernatorNotifier, NotifyError},
    redis_queue::{QueueError, RedisQueueNotifier},
};
use tracing::info;

pub use config::{Cli, Config, ConfigError, Target};
pub use dispatch::{dispatch, DispatchError};
pub use record::FailureRecord;

/// Files the failure described by `config` with both the queue and the governator.
pub async fn tattle(config: &Config) -> Result<(), DispatchError<QueueError, NotifyError>> {
    let queue = RedisQueueNotifier::new(config.queue.clone());
    let governator = GovernatorNotifier::new(config.governator.clone());

    let record = config.record();
    let cancellation = config.cancellation();

    info!(
        "Delivering to queue '{}' and governator at {}",
        config.queue.queue, config.governator.uri
    );

    dispatch(&queue, &governator, record, cancellation).await
}
