//! Shared row fixtures for the db integration tests.

use sqlx::PgPool;

use ptp_core::types::DbId;
use ptp_core::Shape;

/// A volume with one user and one label, ready to hang images and
/// annotations off.
pub struct Fixture {
    pub volume_id: DbId,
    pub user_id: DbId,
    pub label_id: DbId,
}

impl Fixture {
    pub async fn new(pool: &PgPool) -> Self {
        let (volume_id,): (DbId,) =
            sqlx::query_as("INSERT INTO volumes (name) VALUES ('test volume') RETURNING id")
                .fetch_one(pool)
                .await
                .unwrap();
        let (user_id,): (DbId,) =
            sqlx::query_as("INSERT INTO users (email) VALUES ('annotator@example.com') RETURNING id")
                .fetch_one(pool)
                .await
                .unwrap();
        let (label_id,): (DbId,) =
            sqlx::query_as("INSERT INTO labels (name) VALUES ('coral') RETURNING id")
                .fetch_one(pool)
                .await
                .unwrap();
        Self {
            volume_id,
            user_id,
            label_id,
        }
    }

    pub async fn image(&self, pool: &PgPool, filename: &str) -> DbId {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO images (volume_id, filename) VALUES ($1, $2) RETURNING id",
        )
        .bind(self.volume_id)
        .bind(filename)
        .fetch_one(pool)
        .await
        .unwrap();
        id
    }

    pub async fn annotation(
        &self,
        pool: &PgPool,
        image_id: DbId,
        shape: Shape,
        points: &[f64],
    ) -> DbId {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO image_annotations (image_id, shape_id, points) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(image_id)
        .bind(shape.id())
        .bind(serde_json::json!(points))
        .fetch_one(pool)
        .await
        .unwrap();
        id
    }

    pub async fn label(&self, pool: &PgPool, annotation_id: DbId) -> DbId {
        self.label_with(pool, annotation_id, self.label_id).await
    }

    pub async fn label_with(&self, pool: &PgPool, annotation_id: DbId, label_id: DbId) -> DbId {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO image_annotation_labels \
                 (annotation_id, label_id, user_id, confidence) \
             VALUES ($1, $2, $3, 1.0) RETURNING id",
        )
        .bind(annotation_id)
        .bind(label_id)
        .bind(self.user_id)
        .fetch_one(pool)
        .await
        .unwrap();
        id
    }
}
