//! Shared fixtures for the pipeline integration tests: database rows, a
//! fake conversion script, and recording collaborator doubles. Each test
//! binary uses its own subset.
#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sqlx::PgPool;

use ptp_core::types::DbId;
use ptp_core::{PtpConfig, Shape};
use ptp_events::{Notifier, NotifyError, PtpEvent, Recipient};
use ptp_pipeline::{HookError, ReprocessHook};

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

    /// Insert a labelled point annotation, returning the annotation id.
    pub async fn point_annotation(&self, pool: &PgPool, image_id: DbId, x: f64, y: f64) -> DbId {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO image_annotations (image_id, shape_id, points) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(image_id)
        .bind(Shape::Point.id())
        .bind(serde_json::json!([x, y]))
        .fetch_one(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO image_annotation_labels \
                 (annotation_id, label_id, user_id, confidence) \
             VALUES ($1, $2, $3, 1.0)",
        )
        .bind(id)
        .bind(self.label_id)
        .bind(self.user_id)
        .execute(pool)
        .await
        .unwrap();
        id
    }

    pub async fn polygon_count(&self, pool: &PgPool) -> i64 {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM image_annotations a \
             JOIN images i ON i.id = a.image_id \
             WHERE i.volume_id = $1 AND a.shape_id = $2",
        )
        .bind(self.volume_id)
        .bind(Shape::Polygon.id())
        .fetch_one(pool)
        .await
        .unwrap();
        count
    }
}

/// The behaviour of the fake conversion script.
pub enum ScriptBehaviour<'a> {
    /// Write the given CSV content to the output artifact.
    WriteResult(&'a str),
    /// Write a zero-length output artifact.
    WriteEmptyResult,
    /// Exit successfully without writing an output artifact.
    WriteNothing,
    /// Print to stderr and exit non-zero.
    Fail { stderr: &'a str, exit_code: i32 },
}

/// Write a bash script standing in for the Python conversion script. It
/// scans its arguments for `--output-file` like the real script would and
/// additionally touches a sentinel file so tests can assert whether the
/// model was invoked at all.
pub fn fake_model_script(dir: &Path, behaviour: ScriptBehaviour<'_>) -> PathBuf {
    let path = dir.join("fake_ptp.sh");
    let sentinel = invocation_sentinel(dir);
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "#!/bin/bash").unwrap();
    writeln!(f, "touch {}", sentinel.display()).unwrap();
    writeln!(f, "out=\"\"").unwrap();
    writeln!(f, "while [ $# -gt 0 ]; do").unwrap();
    writeln!(f, "  if [ \"$1\" = \"--output-file\" ]; then out=\"$2\"; fi").unwrap();
    writeln!(f, "  shift").unwrap();
    writeln!(f, "done").unwrap();
    match behaviour {
        ScriptBehaviour::WriteResult(csv) => {
            writeln!(f, "cat > \"$out\" <<'PTPEOF'").unwrap();
            write!(f, "{csv}").unwrap();
            writeln!(f, "PTPEOF").unwrap();
        }
        ScriptBehaviour::WriteEmptyResult => {
            writeln!(f, ": > \"$out\"").unwrap();
        }
        ScriptBehaviour::WriteNothing => {
            writeln!(f, "exit 0").unwrap();
        }
        ScriptBehaviour::Fail { stderr, exit_code } => {
            writeln!(f, "echo \"{stderr}\" >&2").unwrap();
            writeln!(f, "exit {exit_code}").unwrap();
        }
    }
    path
}

/// The sentinel file the fake script touches on invocation.
pub fn invocation_sentinel(dir: &Path) -> PathBuf {
    dir.join("model_was_invoked")
}

/// Build a config wired to the fake script, a pre-created checkpoint,
/// and tmp/storage directories under `dir`.
pub fn test_config(dir: &Path, script: PathBuf) -> PtpConfig {
    let model_path = dir.join("checkpoint.pth");
    std::fs::write(&model_path, b"weights").unwrap();
    std::fs::create_dir_all(dir.join("storage")).unwrap();
    PtpConfig {
        tmp_dir: dir.join("tmp"),
        storage_root: dir.join("storage"),
        python: PathBuf::from("/bin/bash"),
        script,
        model_path,
        model_url: "http://127.0.0.1:9/unreachable".to_string(),
        model_type: "vit_h".to_string(),
        device: None,
        image_chunk_size: 100,
        insert_chunk_size: 5000,
    }
}

/// Notifier double that records every delivered event.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<(DbId, PtpEvent)>>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &Recipient, event: &PtpEvent) -> Result<(), NotifyError> {
        self.events
            .lock()
            .unwrap()
            .push((recipient.user_id, event.clone()));
        Ok(())
    }
}

/// Hook double that always fails, for exercising the failure path after
/// rows have already been inserted.
pub struct FailingHook;

#[async_trait::async_trait]
impl ReprocessHook for FailingHook {
    async fn dispatch(&self, image_id: DbId, _only: &[DbId]) -> Result<(), HookError> {
        Err(HookError {
            image_id,
            reason: "queue unavailable".to_string(),
        })
    }
}

/// Reprocess hook double that records every dispatch.
#[derive(Default)]
pub struct RecordingHook {
    pub dispatches: Mutex<Vec<(DbId, Vec<DbId>)>>,
}

#[async_trait::async_trait]
impl ReprocessHook for RecordingHook {
    async fn dispatch(&self, image_id: DbId, only: &[DbId]) -> Result<(), HookError> {
        self.dispatches
            .lock()
            .unwrap()
            .push((image_id, only.to_vec()));
        Ok(())
    }
}
