//! Chunked extraction of point annotations.
//!
//! For one chunk of images, pulls every labelled point annotation out of
//! the database, groups it by image, writes the grouping to the scratch
//! input artifact for the conversion script, and reports which image
//! files the chunk needs. Images without any qualifying annotation are
//! left out so the model is never invoked on them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use sqlx::PgConnection;

use ptp_core::types::DbId;
use ptp_db::repositories::AnnotationRepo;

use crate::error::PipelineError;
use crate::fetch::ImageHandle;

/// One point annotation as serialized into the script input artifact.
#[derive(Debug, Clone, Serialize)]
pub struct InputAnnotation {
    pub annotation_id: DbId,
    pub points: Vec<f64>,
    pub shape: DbId,
    pub image: DbId,
    pub label: DbId,
}

/// The extraction result for one chunk of images.
#[derive(Debug, Default)]
pub struct ChunkExtraction {
    /// Point annotations grouped by image id, in annotation id order.
    pub annotations_by_image: BTreeMap<DbId, Vec<InputAnnotation>>,
    /// Distinct file handles of the images that have qualifying
    /// annotations, in image id order.
    pub handles: Vec<ImageHandle>,
}

impl ChunkExtraction {
    /// True when no image in the chunk had a labelled point annotation.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Extracts point annotations for one volume, chunk by chunk.
pub struct AnnotationExtractor {
    volume_id: DbId,
}

impl AnnotationExtractor {
    pub fn new(volume_id: DbId) -> Self {
        Self { volume_id }
    }

    /// Extract the labelled point annotations on `image_ids` and write
    /// the script input artifact, truncating any previous artifact at
    /// that path. A chunk without qualifying annotations produces an
    /// empty extraction, never an error.
    pub async fn extract(
        &self,
        conn: &mut PgConnection,
        image_ids: &[DbId],
        input_file: &Path,
    ) -> Result<ChunkExtraction, PipelineError> {
        let rows = AnnotationRepo::points_for_images(conn, self.volume_id, image_ids).await?;

        let mut extraction = ChunkExtraction::default();
        let mut filenames: BTreeMap<DbId, String> = BTreeMap::new();
        for row in rows {
            extraction
                .annotations_by_image
                .entry(row.image_id)
                .or_default()
                .push(InputAnnotation {
                    annotation_id: row.id,
                    points: row.points.0.clone(),
                    shape: row.shape_id,
                    image: row.image_id,
                    label: row.label_id,
                });
            filenames.entry(row.image_id).or_insert(row.filename);
        }
        extraction.handles = filenames
            .into_iter()
            .map(|(image_id, filename)| ImageHandle { image_id, filename })
            .collect();

        if let Some(parent) = input_file.parent() {
            crate::runner::create_private_dir(parent).await?;
        }
        let json = serde_json::to_vec(&extraction.annotations_by_image)?;
        tokio::fs::write(input_file, json).await?;

        Ok(extraction)
    }
}
