//! Message delivery to the destination chat

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ReviewNotifierError;

/// A pre-authenticated client able to deliver text to a destination
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait MessageSender: Send + Sync {
    /// Get the sender type name (e.g. "telegram")
    fn type_name(&self) -> &str;

    async fn send_message(&self, destination: &str, text: &str) -> crate::Result<()>;
}

/// Sends notification text to one configured destination.
///
/// Failures are returned to the caller as [`ReviewNotifierError::Delivery`];
/// retry decisions belong to the poll loop.
pub struct Notifier {
    destination: String,
    sender: Arc<dyn MessageSender>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("destination", &self.destination)
            .field("sender", &self.sender.type_name())
            .finish()
    }
}

impl Notifier {
    pub fn new(destination: impl Into<String>, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            destination: destination.into(),
            sender,
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub async fn notify(&self, text: &str) -> crate::Result<()> {
        match self.sender.send_message(&self.destination, text).await {
            Ok(()) => {
                tracing::info!("Message sent");
                Ok(())
            }
            Err(e @ ReviewNotifierError::Delivery(_)) => Err(e),
            Err(e) => Err(ReviewNotifierError::Delivery(format!(
                "{} send failed: {}",
                self.sender.type_name(),
                e
            ))),
        }
    }
}
