#![warn(clippy::all)]

pub mod notifiers;

#[async_trait::async_trait]
pub trait Notifier {
    type Message;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Delivers a single message. Implementations make exactly one attempt.
    async fn notify(&self, message: Self::Message) -> Result<(), Self::Error>;
}
