//! Pipeline error type.
//!
//! Every variant is fatal to the job: the orchestrator's failure path
//! notifies the user, clears the job marker, deletes scratch artifacts,
//! and re-raises. Tolerated conditions (missing per-chunk result file,
//! wrong-arity result rows, null conversion results) never surface here.

use crate::fetch::FetchError;
use crate::hook::HookError;

/// Error type for the conversion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The model checkpoint was absent and could not be downloaded.
    #[error("failed to download model checkpoint from '{url}': {reason}")]
    CheckpointDownload { url: String, reason: String },

    /// The conversion script exited non-zero. Carries the captured
    /// combined output for the logs.
    #[error("conversion script '{script}' failed with exit code {exit_code}:\n{output}")]
    ModelFailed {
        script: String,
        exit_code: i32,
        output: String,
    },

    /// The result artifact exists but is zero-length.
    #[error("no annotations were converted")]
    EmptyResult,

    /// The result artifact has a wrong header or undecodable fields.
    #[error("annotation result file '{path}' is malformed: {reason}")]
    MalformedResult { path: String, reason: String },

    /// An image file could not be resolved to a local path.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The downstream reprocessing dispatch failed.
    #[error(transparent)]
    Hook(#[from] HookError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
