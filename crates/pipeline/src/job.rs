//! The conversion job orchestrator.
//!
//! One job converts the point annotations of one volume. The admission
//! layer records the job id on the volume's attribute bag before the job
//! starts (at most one job per volume); the job itself drives the chunked
//! extract/fetch/convert/upload loop inside a single transaction, then
//! notifies the initiating user, clears the marker, and deletes its
//! scratch artifacts, on failure as well as on success.

use std::path::{Path, PathBuf};

use sqlx::PgPool;

use ptp_core::types::{DbId, JobId};
use ptp_core::PtpConfig;
use ptp_db::models::{User, Volume};
use ptp_db::repositories::{ImageRepo, VolumeRepo};
use ptp_events::{Notifier, PtpEvent, Recipient};

use crate::error::PipelineError;
use crate::extractor::AnnotationExtractor;
use crate::fetch::{write_image_map, ImageFetcher};
use crate::hook::ReprocessHook;
use crate::parser::{ResultParser, DEFAULT_LINE_CHUNK_SIZE};
use crate::runner::ModelRunner;
use crate::uploader::AnnotationUploader;

/// The scratch artifacts of one job, namespaced by volume id so that
/// concurrent jobs on different volumes never share paths.
#[derive(Debug, Clone)]
pub struct ScratchPaths {
    /// Image-id to annotation-list JSON map read by the script.
    pub input_file: PathBuf,
    /// Image-id to local-path JSON map read by the script.
    pub images_file: PathBuf,
    /// CSV result artifact written by the script.
    pub output_file: PathBuf,
}

impl ScratchPaths {
    pub fn for_volume(tmp_dir: &Path, volume_id: DbId) -> Self {
        let input_dir = tmp_dir.join("ptp").join("input-files");
        Self {
            input_file: input_dir.join(format!("{volume_id}.json")),
            images_file: input_dir.join(format!("{volume_id}_images.json")),
            output_file: tmp_dir
                .join("ptp")
                .join(format!("{volume_id}_converted_annotations.csv")),
        }
    }

    fn all(&self) -> [&Path; 3] {
        [&self.input_file, &self.images_file, &self.output_file]
    }
}

/// Converts every point annotation of one volume into a polygon
/// annotation by running the external segmentation model.
pub struct PtpJob {
    volume: Volume,
    user: User,
    job_id: JobId,
    config: PtpConfig,
    paths: ScratchPaths,
}

impl PtpJob {
    /// `job_id` must already be recorded as the volume's active job
    /// marker; see [`VolumeRepo::try_set_ptp_job`].
    pub fn new(volume: Volume, user: User, job_id: JobId, config: PtpConfig) -> Self {
        let paths = ScratchPaths::for_volume(&config.tmp_dir, volume.id);
        Self {
            volume,
            user,
            job_id,
            config,
            paths,
        }
    }

    /// Execute the job. Regardless of outcome the initiating user is
    /// notified, the job marker is cleared, and the scratch artifacts are
    /// deleted; the original error is re-raised for the caller to record.
    pub async fn handle(
        &self,
        pool: &PgPool,
        fetcher: &dyn ImageFetcher,
        notifier: &dyn Notifier,
        hook: &dyn ReprocessHook,
    ) -> Result<(), PipelineError> {
        tracing::info!(
            volume_id = self.volume.id,
            job_id = %self.job_id,
            "starting point to polygon conversion"
        );

        let result = self.run(pool, fetcher, hook).await;

        let event = match &result {
            Ok(total) => {
                tracing::info!(
                    volume_id = self.volume.id,
                    converted = total,
                    "conversion concluded"
                );
                PtpEvent::JobConcluded {
                    volume_id: self.volume.id,
                    volume_name: self.volume.name.clone(),
                    converted_any: *total > 0,
                }
            }
            Err(e) => {
                tracing::error!(volume_id = self.volume.id, error = %e, "conversion failed");
                PtpEvent::JobFailed {
                    volume_id: self.volume.id,
                    volume_name: self.volume.name.clone(),
                }
            }
        };

        let recipient = Recipient {
            user_id: self.user.id,
            email: self.user.email.clone(),
        };
        // A lost notification must not fail (or un-fail) the job.
        if let Err(e) = notifier.notify(&recipient, &event).await {
            tracing::warn!(user_id = self.user.id, error = %e, "notification delivery failed");
        }

        self.cleanup(pool).await;

        result.map(|_| ())
    }

    /// The chunked conversion loop. All database mutations happen inside
    /// one transaction: a mid-pipeline failure leaves no partial polygon
    /// set visible.
    async fn run(
        &self,
        pool: &PgPool,
        fetcher: &dyn ImageFetcher,
        hook: &dyn ReprocessHook,
    ) -> Result<u64, PipelineError> {
        let extractor = AnnotationExtractor::new(self.volume.id);
        let uploader = AnnotationUploader::new(self.user.id, self.config.insert_chunk_size);
        let runner = ModelRunner::new(self.config.clone());

        let mut tx = pool.begin().await?;
        let mut after_id = 0;
        let mut total = 0u64;

        // A result artifact surviving a previous hard-killed job must not
        // be read as this job's first chunk.
        match tokio::fs::remove_file(&self.paths.output_file).await {
            Ok(()) => {
                tracing::warn!(
                    path = %self.paths.output_file.display(),
                    "removed stale result artifact"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        loop {
            let image_ids = ImageRepo::id_page(
                &mut *tx,
                self.volume.id,
                after_id,
                self.config.image_chunk_size,
            )
            .await?;
            let Some(&last_id) = image_ids.last() else {
                break;
            };
            after_id = last_id;

            let extraction = extractor
                .extract(&mut *tx, &image_ids, &self.paths.input_file)
                .await?;
            if extraction.is_empty() {
                tracing::debug!(after_id, "chunk has no point annotations, skipping");
                continue;
            }

            let fetched = fetcher.batch(&extraction.handles).await?;
            write_image_map(&fetched, &self.paths.images_file).await?;

            runner.run(&self.paths).await?;

            // The script writes no result artifact when it converted
            // nothing in this chunk.
            if !tokio::fs::try_exists(&self.paths.output_file).await? {
                tracing::debug!(after_id, "no result artifact for chunk, nothing converted");
                continue;
            }

            let mut parser = ResultParser::open(&self.paths.output_file, DEFAULT_LINE_CHUNK_SIZE)?;
            total += uploader.upload(&mut *tx, &mut parser, hook).await?;

            // Consume the artifact so a chunk that converts nothing does
            // not re-upload the previous chunk's results.
            tokio::fs::remove_file(&self.paths.output_file).await?;
        }

        tx.commit().await?;
        Ok(total)
    }

    /// Clear the job marker and delete the scratch artifacts. Both are
    /// idempotent; deletion of already-absent files is not an error.
    async fn cleanup(&self, pool: &PgPool) {
        if let Err(e) = VolumeRepo::clear_ptp_job(pool, &self.job_id.to_string()).await {
            tracing::warn!(job_id = %self.job_id, error = %e, "failed to clear job marker");
        }
        for path in self.paths.all() {
            if let Err(e) = tokio::fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "failed to delete scratch file");
                }
            }
        }
    }
}
