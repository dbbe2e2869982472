//! Downstream reprocessing dispatch.
//!
//! Every image that gained annotations must have its cached derivatives
//! (thumbnails, feature vectors) re-derived. That work lives outside this
//! system; the pipeline only dispatches, once per image per flush, with
//! the ids of exactly the annotations created in that flush.

use ptp_core::types::DbId;

/// Error type for reprocessing dispatch failures.
#[derive(Debug, thiserror::Error)]
#[error("reprocessing dispatch failed for image {image_id}: {reason}")]
pub struct HookError {
    pub image_id: DbId,
    pub reason: String,
}

/// Triggers downstream per-image reindexing.
#[async_trait::async_trait]
pub trait ReprocessHook: Send + Sync {
    /// Dispatch reprocessing of `image_id`, restricted to the given
    /// annotation ids.
    async fn dispatch(&self, image_id: DbId, only: &[DbId]) -> Result<(), HookError>;
}

/// Hook for deployments where the reprocessing consumer is not wired up;
/// records the dispatch in the log and succeeds.
pub struct LogHook;

#[async_trait::async_trait]
impl ReprocessHook for LogHook {
    async fn dispatch(&self, image_id: DbId, only: &[DbId]) -> Result<(), HookError> {
        tracing::info!(image_id, annotations = only.len(), "reprocessing dispatched");
        Ok(())
    }
}
