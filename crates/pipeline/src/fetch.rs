//! Batch image fetching.
//!
//! The pipeline only needs one thing from image storage: given the file
//! handles of a chunk of images, resolve each to a local filesystem path
//! the conversion script can open. The returned paths are only guaranteed
//! valid until the next `batch` call.

use std::path::{Path, PathBuf};

use ptp_core::types::DbId;

/// The storage-resolvable handle of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    pub image_id: DbId,
    pub filename: String,
}

/// A handle resolved to a local path, in the order it was requested.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub handle: ImageHandle,
    pub local_path: PathBuf,
}

/// Error type for image fetch failures.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("image file '{0}' not found in storage")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolves image file handles to local paths, batched per chunk.
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Resolve `handles` to local paths. The result is parallel to the
    /// input: same length, same order.
    async fn batch(&self, handles: &[ImageHandle]) -> Result<Vec<FetchedImage>, FetchError>;
}

/// Fetcher for images stored on a locally mounted disk.
///
/// Resolves each handle's filename directly under the configured root,
/// which is expected to be the storage directory of the volume being
/// converted.
pub struct DiskFetcher {
    root: PathBuf,
}

impl DiskFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, handle: &ImageHandle) -> PathBuf {
        self.root.join(&handle.filename)
    }
}

#[async_trait::async_trait]
impl ImageFetcher for DiskFetcher {
    async fn batch(&self, handles: &[ImageHandle]) -> Result<Vec<FetchedImage>, FetchError> {
        let mut fetched = Vec::with_capacity(handles.len());
        for handle in handles {
            let local_path = self.resolve(handle);
            if !tokio::fs::try_exists(&local_path).await? {
                return Err(FetchError::NotFound(handle.filename.clone()));
            }
            fetched.push(FetchedImage {
                handle: handle.clone(),
                local_path,
            });
        }
        Ok(fetched)
    }
}

/// Write the image-id to local-path scratch artifact consumed by the
/// conversion script.
pub async fn write_image_map(
    fetched: &[FetchedImage],
    images_file: &Path,
) -> Result<(), crate::PipelineError> {
    let map: std::collections::BTreeMap<DbId, &Path> = fetched
        .iter()
        .map(|f| (f.handle.image_id, f.local_path.as_path()))
        .collect();
    let json = serde_json::to_vec(&map)?;
    tokio::fs::write(images_file, json).await?;
    Ok(())
}
