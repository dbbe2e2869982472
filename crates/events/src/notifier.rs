//! The notification delivery seam.

use ptp_core::types::DbId;

use crate::event::PtpEvent;

/// The user a notification is addressed to.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub user_id: DbId,
    pub email: String,
}

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

/// Delivers job outcome events to users.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &Recipient, event: &PtpEvent) -> Result<(), NotifyError>;
}

/// Fallback notifier that only logs, for deployments without SMTP.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: &Recipient, event: &PtpEvent) -> Result<(), NotifyError> {
        tracing::info!(
            user_id = recipient.user_id,
            volume_id = event.volume_id(),
            subject = event.subject(),
            "notification (email not configured)"
        );
        Ok(())
    }
}
