//! Job outcome events and their user-facing copy.

use ptp_core::types::DbId;

/// A conversion job outcome, addressed to the user who started the job.
///
/// Failure events deliberately carry no error detail: operational detail
/// stays in the logs, the user only learns that the job failed.
#[derive(Debug, Clone, PartialEq)]
pub enum PtpEvent {
    /// The job finished; `converted_any` is false when every chunk came
    /// back empty.
    JobConcluded {
        volume_id: DbId,
        volume_name: String,
        converted_any: bool,
    },
    /// The job failed and was rolled back.
    JobFailed {
        volume_id: DbId,
        volume_name: String,
    },
}

impl PtpEvent {
    /// Mail subject line.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::JobConcluded { .. } => {
                "Your point to polygon conversion job has concluded successfully"
            }
            Self::JobFailed { .. } => "Your point to polygon conversion job has failed",
        }
    }

    /// Mail body text.
    pub fn body(&self) -> String {
        match self {
            Self::JobConcluded {
                volume_name,
                converted_any,
                ..
            } => {
                let mut body = format!(
                    "The point to polygon conversion for volume {volume_name} has concluded successfully."
                );
                if !converted_any {
                    body.push_str(" However, no annotations were converted.");
                }
                body
            }
            Self::JobFailed { volume_name, .. } => {
                format!("The point to polygon conversion for volume {volume_name} has failed.")
            }
        }
    }

    /// The volume the job ran on.
    pub fn volume_id(&self) -> DbId {
        match self {
            Self::JobConcluded { volume_id, .. } | Self::JobFailed { volume_id, .. } => *volume_id,
        }
    }
}
