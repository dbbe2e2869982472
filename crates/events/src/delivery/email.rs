//! Email notification delivery via SMTP.
//!
//! [`EmailNotifier`] wraps the `lettre` async SMTP transport to send the
//! plain-text job outcome mails. Configuration is loaded from environment
//! variables; if `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns
//! `None` and the caller should fall back to [`crate::LogNotifier`].

use crate::event::PtpEvent;
use crate::notifier::{Notifier, NotifyError, Recipient};

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@ptp.local";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured.
    ///
    /// | Variable        | Required | Default              |
    /// |-----------------|----------|----------------------|
    /// | `SMTP_HOST`     | yes      |                      |
    /// | `SMTP_PORT`     | no       | `587`                |
    /// | `SMTP_FROM`     | no       | `noreply@ptp.local`  |
    /// | `SMTP_USER`     | no       |                      |
    /// | `SMTP_PASSWORD` | no       |                      |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Sends job outcome emails via SMTP.
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    /// Create a new email notifier with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, recipient: &Recipient, event: &PtpEvent) -> Result<(), NotifyError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(recipient.email.parse()?)
            .subject(event.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(event.body())
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(password)) = (&self.config.smtp_user, &self.config.smtp_password)
        {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        let mailer = builder.build();
        mailer.send(email).await?;

        tracing::debug!(
            user_id = recipient.user_id,
            volume_id = event.volume_id(),
            "notification email sent"
        );
        Ok(())
    }
}
