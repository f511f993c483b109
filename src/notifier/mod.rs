pub mod telegram;

use async_trait::async_trait;

pub use telegram::TelegramNotifier;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to reach notification endpoint")]
    Transport(#[from] reqwest::Error),

    #[error("notification rejected: {status} - {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers alert text to a human-facing channel.
///
/// Called concurrently from every target pipeline of a round.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;

    fn name(&self) -> &str;
}

/// Writes alerts to the log. Used when no delivery channel is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        log::info!("Alert (not delivered, no channel configured): {message}");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
