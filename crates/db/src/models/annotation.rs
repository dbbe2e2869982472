//! Annotation models and DTOs.

use ptp_core::types::DbId;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A point annotation joined with one of its labels and its image's file
/// handle, as produced by the extraction query. An annotation carrying
/// several labels yields one row per label.
#[derive(Debug, Clone, FromRow)]
pub struct PointAnnotation {
    pub id: DbId,
    pub image_id: DbId,
    pub points: Json<Vec<f64>>,
    pub shape_id: DbId,
    pub label_id: DbId,
    pub filename: String,
}

/// A polygon annotation staged for bulk insertion.
#[derive(Debug, Clone, Serialize)]
pub struct NewPolygonAnnotation {
    pub image_id: DbId,
    pub points: Vec<f64>,
}

/// An annotation label staged for bulk insertion. The annotation id is
/// assigned at flush time from the ids the insert returns.
#[derive(Debug, Clone, Serialize)]
pub struct NewAnnotationLabel {
    pub label_id: DbId,
    pub user_id: DbId,
    pub confidence: f32,
}

/// Generated id and owning image of a freshly inserted annotation,
/// returned in insertion order.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct InsertedAnnotation {
    pub id: DbId,
    pub image_id: DbId,
}
