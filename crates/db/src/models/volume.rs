//! Volume model.

use ptp_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Attribute bag key holding the in-flight conversion job id.
pub const PTP_JOB_ID_ATTR: &str = "ptp_job_id";

/// A row from the `volumes` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Volume {
    pub id: DbId,
    pub name: String,
    /// Schema-less attribute bag; `ptp_job_id` marks an in-flight job.
    pub attrs: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Volume {
    /// Return the conversion job id recorded on this volume, if any.
    pub fn ptp_job_id(&self) -> Option<&str> {
        self.attrs
            .as_ref()
            .and_then(|attrs| attrs.get(PTP_JOB_ID_ATTR))
            .and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(attrs: Option<serde_json::Value>) -> Volume {
        Volume {
            id: 1,
            name: "test".to_string(),
            attrs,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn job_id_read_from_attrs() {
        let v = volume(Some(serde_json::json!({"ptp_job_id": "abc-123"})));
        assert_eq!(v.ptp_job_id(), Some("abc-123"));
    }

    #[test]
    fn job_id_absent() {
        assert_eq!(volume(None).ptp_job_id(), None);
        assert_eq!(volume(Some(serde_json::json!({}))).ptp_job_id(), None);
    }
}
