use std::{error::Error, fmt, time::Instant};

use tattle_notifiers::{notifiers::governator::CancellationRequest, Notifier};
use tracing::{debug, error, info};

use crate::record::FailureRecord;

/// Outcome of a dispatch where at least one sink failed.
///
/// Each field is `None` when that sink delivered successfully.
#[derive(Debug)]
pub struct DispatchError<Q, N> {
    pub queue: Option<Q>,
    pub notification: Option<N>,
}

impl<Q: fmt::Display, N: fmt::Display> fmt::Display for DispatchError<Q, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.queue, &self.notification) {
            (Some(queue), Some(notification)) => {
                write!(f, "queue error: {queue}\nnotification error: {notification}")
            }
            (Some(queue), None) => write!(f, "queue error: {queue}"),
            (None, Some(notification)) => write!(f, "notification error: {notification}"),
            (None, None) => write!(f, "no sink failed"),
        }
    }
}

impl<Q, N> Error for DispatchError<Q, N>
where
    Q: Error + 'static,
    N: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match (&self.queue, &self.notification) {
            (Some(queue), None) => Some(queue),
            (None, Some(notification)) => Some(notification),
            _ => None,
        }
    }
}

/// Pushes `record` onto the queue and posts `cancellation` to the governator at the same time.
///
/// Both deliveries always run to completion; a failure in one never cancels the other.
pub async fn dispatch<Q, G>(
    queue: &Q,
    governator: &G,
    record: FailureRecord,
    cancellation: CancellationRequest,
) -> Result<(), DispatchError<Q::Error, G::Error>>
where
    Q: Notifier<Message = FailureRecord> + Sync,
    G: Notifier<Message = CancellationRequest> + Sync,
{
    let start = Instant::now();
    info!("Tattling on {} ({})", record.body.request.metadata.job_type, record.index);

    let (queue_response, governator_response) =
        futures::join!(queue.notify(record), governator.notify(cancellation));

    debug!("Finished trying to deliver to both sinks");

    let queue = queue_response.err();
    if let Some(queue_error) = &queue {
        error!("Queue delivery failed: {queue_error}");
    }

    let notification = governator_response.err();
    if let Some(notification_error) = &notification {
        error!("Governator notification failed: {notification_error}");
    }

    info!("Dispatch finished in {:?}", start.elapsed());

    match (queue, notification) {
        (None, None) => Ok(()),
        (queue, notification) => Err(DispatchError {
            queue,
            notification,
        }),
    }
}
