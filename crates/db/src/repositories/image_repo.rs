//! Repository for the `images` table.

use sqlx::PgConnection;

use ptp_core::types::DbId;

/// Provides image queries for the conversion pipeline.
pub struct ImageRepo;

impl ImageRepo {
    /// Return the next page of image ids for a volume, in ascending id
    /// order, strictly greater than `after_id`. Keyset pagination keeps
    /// the per-chunk memory bounded regardless of volume size.
    pub async fn id_page(
        conn: &mut PgConnection,
        volume_id: DbId,
        after_id: DbId,
        limit: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM images \
             WHERE volume_id = $1 AND id > $2 \
             ORDER BY id ASC \
             LIMIT $3",
        )
        .bind(volume_id)
        .bind(after_id)
        .bind(limit)
        .fetch_all(conn)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
