//! Notification events for the conversion pipeline.
//!
//! - [`PtpEvent`] - the job outcome events and their mail copy.
//! - [`Notifier`] - delivery seam consumed by the pipeline.
//! - [`delivery::email`] - SMTP delivery via `lettre`.
//! - [`LogNotifier`] - tracing-only fallback when SMTP is not configured.

pub mod delivery;
pub mod event;
pub mod notifier;

pub use delivery::email::{EmailConfig, EmailNotifier};
pub use event::PtpEvent;
pub use notifier::{LogNotifier, Notifier, NotifyError, Recipient};
