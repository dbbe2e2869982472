//! Repository for the `volumes` table and the conversion job marker.

use sqlx::PgPool;

use ptp_core::types::DbId;

use crate::models::volume::{Volume, PTP_JOB_ID_ATTR};

/// Column list for `volumes` queries.
const COLUMNS: &str = "id, name, attrs, created_at, updated_at";

/// Provides volume lookups and job marker bookkeeping.
pub struct VolumeRepo;

impl VolumeRepo {
    /// Find a volume by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Volume>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM volumes WHERE id = $1");
        sqlx::query_as::<_, Volume>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record `job_id` as the volume's active conversion job, but only if
    /// no job is currently recorded. Returns whether the marker was
    /// acquired. This is the admission-time mutual exclusion: at most one
    /// conversion job per volume.
    pub async fn try_set_ptp_job(
        pool: &PgPool,
        volume_id: DbId,
        job_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE volumes \
             SET attrs = COALESCE(attrs, '{}'::jsonb) || jsonb_build_object($2::text, $3::text), \
                 updated_at = NOW() \
             WHERE id = $1 AND (attrs IS NULL OR NOT attrs ? $2)",
        )
        .bind(volume_id)
        .bind(PTP_JOB_ID_ATTR)
        .bind(job_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the job marker wherever it holds exactly `job_id`.
    ///
    /// Matching on the job id value rather than the volume id means a slow
    /// straggler cannot clear a marker set by a newer job, and calling this
    /// twice is a no-op. Returns the number of markers cleared.
    pub async fn clear_ptp_job(pool: &PgPool, job_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE volumes \
             SET attrs = attrs - $1, updated_at = NOW() \
             WHERE attrs ->> $1 = $2",
        )
        .bind(PTP_JOB_ID_ATTR)
        .bind(job_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
