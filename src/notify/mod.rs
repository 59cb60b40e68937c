pub mod messages;
mod twilio;

use async_trait::async_trait;
use thiserror::Error;

pub use twilio::TwilioNotifier;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway timed out")]
    Timeout,
    #[error("gateway transport error: {0}")]
    Transport(String),
    #[error("gateway rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

/// Outbound text delivery to a phone number.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns the provider's delivery id.
    async fn send(&self, to: &str, body: &str) -> Result<String, GatewayError>;
}
