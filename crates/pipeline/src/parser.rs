//! Streaming decode of the CSV result artifact.
//!
//! The conversion script writes one row per attempted conversion with the
//! exact header `annotation_id,points,image_id,label_id`. The `points`
//! field is a bracketed JSON number list, or empty/`null` when the model
//! could not produce a boundary for that point. Records are yielded in
//! bounded chunks so the uploader can insert in bulk without holding the
//! whole result set in memory.

use std::fs::File;
use std::path::{Path, PathBuf};

use ptp_core::types::DbId;

use crate::error::PipelineError;

/// The exact expected column ordering of the result artifact.
pub const RESULT_COLUMNS: [&str; 4] = ["annotation_id", "points", "image_id", "label_id"];

/// Number of result rows decoded per chunk.
pub const DEFAULT_LINE_CHUNK_SIZE: usize = 10_000;

/// One decoded result row. `points` is `None` when the model reported
/// that it could not convert this point; such records create no rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub annotation_id: DbId,
    pub points: Option<Vec<f64>>,
    pub image_id: DbId,
    pub label_id: DbId,
}

/// Streaming, non-restartable reader over one result artifact.
#[derive(Debug)]
pub struct ResultParser {
    reader: csv::Reader<File>,
    path: PathBuf,
    line_chunk_size: usize,
}

impl ResultParser {
    /// Open a result artifact and validate it up front: a zero-length
    /// file means nothing was converted at all, a header that is not
    /// exactly [`RESULT_COLUMNS`] means the artifact is malformed. Both
    /// are fatal. A missing file is also an I/O error here; the caller
    /// decides beforehand whether a missing artifact is a skip.
    pub fn open(path: &Path, line_chunk_size: usize) -> Result<Self, PipelineError> {
        if std::fs::metadata(path)?.len() == 0 {
            return Err(PipelineError::EmptyResult);
        }

        // Rows with a wrong field count must be tolerated, so the reader
        // is flexible and the header is checked by hand.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut header = csv::StringRecord::new();
        reader.read_record(&mut header)?;
        if header.iter().ne(RESULT_COLUMNS) {
            return Err(Self::malformed(path, "unexpected header"));
        }

        Ok(Self {
            reader,
            path: path.to_path_buf(),
            line_chunk_size,
        })
    }

    /// Decode the next chunk of records, up to the configured chunk size.
    /// Returns `None` when the artifact is exhausted. Rows whose field
    /// count does not match the header are skipped silently; this
    /// tolerates trailing blank lines.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<ResultRecord>>, PipelineError> {
        let mut chunk = Vec::new();
        let mut row = csv::StringRecord::new();

        while chunk.len() < self.line_chunk_size {
            if !self.reader.read_record(&mut row)? {
                break;
            }
            if row.len() != RESULT_COLUMNS.len() {
                continue;
            }
            chunk.push(self.decode(&row)?);
        }

        if chunk.is_empty() {
            Ok(None)
        } else {
            Ok(Some(chunk))
        }
    }

    /// The artifact this parser reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(&self, row: &csv::StringRecord) -> Result<ResultRecord, PipelineError> {
        let points_text = row[1].trim();
        let points = if points_text.is_empty() {
            None
        } else {
            serde_json::from_str::<Option<Vec<f64>>>(points_text)
                .map_err(|e| Self::malformed(&self.path, &format!("bad points field: {e}")))?
        };

        Ok(ResultRecord {
            annotation_id: self.decode_id(&row[0], "annotation_id")?,
            points,
            image_id: self.decode_id(&row[2], "image_id")?,
            label_id: self.decode_id(&row[3], "label_id")?,
        })
    }

    fn decode_id(&self, field: &str, column: &str) -> Result<DbId, PipelineError> {
        field
            .trim()
            .parse()
            .map_err(|_| Self::malformed(&self.path, &format!("bad {column} '{field}'")))
    }

    fn malformed(path: &Path, reason: &str) -> PipelineError {
        PipelineError::MalformedResult {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
