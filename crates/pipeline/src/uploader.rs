//! Ordered bulk upload of converted annotations.
//!
//! Consumes parsed result records, stages polygon annotation and label
//! rows, and flushes them in bounded chunks inside the job transaction.
//! The bulk insert returns the generated annotation ids in input order,
//! which is what lets each staged label find its annotation without
//! re-reading the table.

use std::collections::BTreeMap;

use sqlx::PgConnection;

use ptp_core::geometry::validate_polygon_coordinates;
use ptp_core::types::DbId;
use ptp_db::models::annotation::{NewAnnotationLabel, NewPolygonAnnotation};
use ptp_db::repositories::AnnotationRepo;

use crate::error::PipelineError;
use crate::hook::ReprocessHook;
use crate::parser::ResultParser;

/// The conversion is authoritative, not a probabilistic suggestion, so
/// every created label carries full confidence.
const CONVERTED_LABEL_CONFIDENCE: f32 = 1.0;

/// Uploads parsed conversion results as polygon annotations.
pub struct AnnotationUploader {
    user_id: DbId,
    insert_chunk_size: usize,
}

impl AnnotationUploader {
    /// `user_id` is the job-initiating user, who is attributed on every
    /// created label.
    pub fn new(user_id: DbId, insert_chunk_size: usize) -> Self {
        Self {
            user_id,
            insert_chunk_size,
        }
    }

    /// Drain `parser` and persist every convertible record. Records whose
    /// points are null are dropped silently; the model legitimately fails
    /// on some points. Returns the number of annotations created.
    pub async fn upload(
        &self,
        conn: &mut PgConnection,
        parser: &mut ResultParser,
        hook: &dyn ReprocessHook,
    ) -> Result<u64, PipelineError> {
        let mut annotations: Vec<NewPolygonAnnotation> = Vec::new();
        let mut labels: Vec<NewAnnotationLabel> = Vec::new();
        let mut total = 0u64;

        while let Some(chunk) = parser.next_chunk()? {
            for record in chunk {
                let Some(points) = record.points else {
                    continue;
                };
                validate_polygon_coordinates(&points).map_err(|e| {
                    PipelineError::MalformedResult {
                        path: parser.path().display().to_string(),
                        reason: format!("annotation {}: {e}", record.annotation_id),
                    }
                })?;

                annotations.push(NewPolygonAnnotation {
                    image_id: record.image_id,
                    points,
                });
                labels.push(NewAnnotationLabel {
                    label_id: record.label_id,
                    user_id: self.user_id,
                    confidence: CONVERTED_LABEL_CONFIDENCE,
                });

                if annotations.len() >= self.insert_chunk_size {
                    total += self.flush(conn, &mut annotations, &mut labels, hook).await?;
                }
            }
        }

        if !annotations.is_empty() {
            total += self.flush(conn, &mut annotations, &mut labels, hook).await?;
        }
        Ok(total)
    }

    /// Flush the staged rows: one bulk annotation insert, one bulk label
    /// insert zipped onto the returned ids, then one reprocessing
    /// dispatch per affected image with exactly that image's new ids.
    async fn flush(
        &self,
        conn: &mut PgConnection,
        annotations: &mut Vec<NewPolygonAnnotation>,
        labels: &mut Vec<NewAnnotationLabel>,
        hook: &dyn ReprocessHook,
    ) -> Result<u64, PipelineError> {
        let inserted = AnnotationRepo::insert_polygons(conn, annotations).await?;
        let ids: Vec<DbId> = inserted.iter().map(|a| a.id).collect();
        AnnotationRepo::insert_labels(conn, &ids, labels).await?;

        let mut by_image: BTreeMap<DbId, Vec<DbId>> = BTreeMap::new();
        for annotation in &inserted {
            by_image
                .entry(annotation.image_id)
                .or_default()
                .push(annotation.id);
        }
        for (image_id, only) in by_image {
            hook.dispatch(image_id, &only).await?;
        }

        let count = inserted.len() as u64;
        annotations.clear();
        labels.clear();
        Ok(count)
    }
}
