//! Repository for the `image_annotations` and `image_annotation_labels`
//! tables.
//!
//! All methods take `&mut PgConnection` so the conversion job can run its
//! reads and writes inside one transaction.

use sqlx::PgConnection;

use ptp_core::types::DbId;
use ptp_core::Shape;

use crate::models::annotation::{
    InsertedAnnotation, NewAnnotationLabel, NewPolygonAnnotation, PointAnnotation,
};

/// Provides annotation extraction and bulk insertion.
pub struct AnnotationRepo;

impl AnnotationRepo {
    /// Fetch every point annotation on the given images of a volume,
    /// joined with its labels and its image's file handle, ordered by
    /// annotation id. An annotation with several labels yields one row
    /// per label.
    pub async fn points_for_images(
        conn: &mut PgConnection,
        volume_id: DbId,
        image_ids: &[DbId],
    ) -> Result<Vec<PointAnnotation>, sqlx::Error> {
        sqlx::query_as::<_, PointAnnotation>(
            "SELECT a.id, a.image_id, a.points, a.shape_id, al.label_id, i.filename \
             FROM image_annotations a \
             JOIN image_annotation_labels al ON al.annotation_id = a.id \
             JOIN images i ON i.id = a.image_id \
             WHERE i.volume_id = $1 \
               AND a.image_id = ANY($2) \
               AND a.shape_id = $3 \
             ORDER BY a.id ASC",
        )
        .bind(volume_id)
        .bind(image_ids)
        .bind(Shape::Point.id())
        .fetch_all(conn)
        .await
    }

    /// Bulk-insert polygon annotations in one statement, returning the
    /// generated ids in input order.
    ///
    /// The `UNNEST` source preserves array order, so the `RETURNING` rows
    /// line up positionally with `annotations`. This is what lets the
    /// caller zip label rows onto the new ids without re-reading the table.
    pub async fn insert_polygons(
        conn: &mut PgConnection,
        annotations: &[NewPolygonAnnotation],
    ) -> Result<Vec<InsertedAnnotation>, sqlx::Error> {
        let image_ids: Vec<DbId> = annotations.iter().map(|a| a.image_id).collect();
        let points: Vec<serde_json::Value> = annotations
            .iter()
            .map(|a| serde_json::json!(a.points))
            .collect();

        sqlx::query_as::<_, InsertedAnnotation>(
            "INSERT INTO image_annotations (image_id, shape_id, points, created_at, updated_at) \
             SELECT u.image_id, $3, u.points, NOW(), NOW() \
             FROM UNNEST($1::bigint[], $2::jsonb[]) AS u(image_id, points) \
             RETURNING id, image_id",
        )
        .bind(&image_ids)
        .bind(&points)
        .bind(Shape::Polygon.id())
        .fetch_all(conn)
        .await
    }

    /// Bulk-insert annotation labels in one statement. `annotation_ids`
    /// and `labels` must be parallel, as produced by zipping the result of
    /// [`Self::insert_polygons`] onto the staged labels.
    pub async fn insert_labels(
        conn: &mut PgConnection,
        annotation_ids: &[DbId],
        labels: &[NewAnnotationLabel],
    ) -> Result<(), sqlx::Error> {
        debug_assert_eq!(annotation_ids.len(), labels.len());

        let label_ids: Vec<DbId> = labels.iter().map(|l| l.label_id).collect();
        let user_ids: Vec<DbId> = labels.iter().map(|l| l.user_id).collect();
        let confidences: Vec<f32> = labels.iter().map(|l| l.confidence).collect();

        sqlx::query(
            "INSERT INTO image_annotation_labels \
                 (annotation_id, label_id, user_id, confidence, created_at, updated_at) \
             SELECT u.annotation_id, u.label_id, u.user_id, u.confidence, NOW(), NOW() \
             FROM UNNEST($1::bigint[], $2::bigint[], $3::bigint[], $4::real[]) \
                 AS u(annotation_id, label_id, user_id, confidence)",
        )
        .bind(annotation_ids)
        .bind(&label_ids)
        .bind(&user_ids)
        .bind(&confidences)
        .execute(conn)
        .await?;
        Ok(())
    }
}
