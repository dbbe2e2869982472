//! Pipeline configuration.
//!
//! All knobs for the conversion pipeline live in one immutable struct that
//! is loaded from the environment once and passed into the components at
//! construction time.

use std::path::PathBuf;

/// Default number of images processed per extraction chunk.
pub const DEFAULT_IMAGE_CHUNK_SIZE: i64 = 100;

/// Default number of annotations inserted per flush.
pub const DEFAULT_INSERT_CHUNK_SIZE: usize = 5000;

/// Default number of result rows decoded per parser chunk.
pub const DEFAULT_LINE_CHUNK_SIZE: usize = 10_000;

/// Default SAM checkpoint download URL.
const DEFAULT_MODEL_URL: &str =
    "https://dl.fbaipublicfiles.com/segment_anything/sam_vit_h_4b8939.pth";

/// Default SAM model type.
const DEFAULT_MODEL_TYPE: &str = "vit_h";

/// Default Python interpreter.
const DEFAULT_PYTHON: &str = "/usr/bin/python3";

/// Configuration for the point-to-polygon conversion pipeline.
#[derive(Debug, Clone)]
pub struct PtpConfig {
    /// Directory where scratch artifacts are written.
    pub tmp_dir: PathBuf,
    /// Root directory holding the volume image files.
    pub storage_root: PathBuf,
    /// Path to the Python interpreter.
    pub python: PathBuf,
    /// Path to the conversion script.
    pub script: PathBuf,
    /// Local path of the model checkpoint.
    pub model_path: PathBuf,
    /// URL from which to download the checkpoint when it is absent locally.
    pub model_url: String,
    /// The SAM model type tag passed to the script.
    pub model_type: String,
    /// Optional device selector (cpu, cuda, mps).
    pub device: Option<String>,
    /// Number of images processed per chunk.
    pub image_chunk_size: i64,
    /// Number of annotations inserted per flush.
    pub insert_chunk_size: usize,
}

impl PtpConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                 | Default                                   |
    /// |--------------------------|-------------------------------------------|
    /// | `PTP_TMP_DIR`            | the system temp directory                 |
    /// | `PTP_STORAGE_ROOT`       | `/var/lib/ptp/images`                     |
    /// | `PTP_PYTHON`             | `/usr/bin/python3`                        |
    /// | `PTP_SCRIPT`             | `/var/lib/ptp/scripts/ptp.py`             |
    /// | `PTP_MODEL_PATH`         | `/var/lib/ptp/sam_checkpoint.pth`         |
    /// | `PTP_MODEL_URL`          | the public SAM ViT-H checkpoint URL       |
    /// | `PTP_MODEL_TYPE`         | `vit_h`                                   |
    /// | `PTP_DEVICE`             | unset (script decides)                    |
    /// | `PTP_IMAGE_CHUNK_SIZE`   | `100`                                     |
    /// | `PTP_INSERT_CHUNK_SIZE`  | `5000`                                    |
    ///
    /// Unparseable or non-positive chunk sizes fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            tmp_dir: path_var("PTP_TMP_DIR").unwrap_or_else(std::env::temp_dir),
            storage_root: path_var("PTP_STORAGE_ROOT")
                .unwrap_or_else(|| PathBuf::from("/var/lib/ptp/images")),
            python: path_var("PTP_PYTHON").unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON)),
            script: path_var("PTP_SCRIPT")
                .unwrap_or_else(|| PathBuf::from("/var/lib/ptp/scripts/ptp.py")),
            model_path: path_var("PTP_MODEL_PATH")
                .unwrap_or_else(|| PathBuf::from("/var/lib/ptp/sam_checkpoint.pth")),
            model_url: std::env::var("PTP_MODEL_URL")
                .unwrap_or_else(|_| DEFAULT_MODEL_URL.to_string()),
            model_type: std::env::var("PTP_MODEL_TYPE")
                .unwrap_or_else(|_| DEFAULT_MODEL_TYPE.to_string()),
            device: std::env::var("PTP_DEVICE").ok(),
            image_chunk_size: positive_or(
                parsed_var("PTP_IMAGE_CHUNK_SIZE"),
                DEFAULT_IMAGE_CHUNK_SIZE,
            ),
            insert_chunk_size: positive_or(
                parsed_var("PTP_INSERT_CHUNK_SIZE"),
                DEFAULT_INSERT_CHUNK_SIZE,
            ),
        }
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    std::env::var_os(name).map(PathBuf::from)
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Chunk sizes must be positive: zero or negative values would flow into
/// SQL `LIMIT` clauses and flush thresholds. Fall back like an
/// unparseable value does.
fn positive_or<T: PartialOrd + Default>(value: Option<T>, default: T) -> T {
    match value {
        Some(v) if v > T::default() => v,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var driven paths are covered implicitly by from_env defaults;
    // setting process-wide env vars in parallel tests is racy, so only the
    // default path is asserted here.
    #[test]
    fn defaults_are_sane() {
        let config = PtpConfig::from_env();
        assert_eq!(config.model_type, DEFAULT_MODEL_TYPE);
        assert_eq!(config.image_chunk_size, DEFAULT_IMAGE_CHUNK_SIZE);
        assert_eq!(config.insert_chunk_size, DEFAULT_INSERT_CHUNK_SIZE);
        assert!(config.model_url.starts_with("https://"));
    }

    #[test]
    fn non_positive_chunk_sizes_fall_back_to_defaults() {
        assert_eq!(
            positive_or(Some(-5i64), DEFAULT_IMAGE_CHUNK_SIZE),
            DEFAULT_IMAGE_CHUNK_SIZE
        );
        assert_eq!(
            positive_or(Some(0i64), DEFAULT_IMAGE_CHUNK_SIZE),
            DEFAULT_IMAGE_CHUNK_SIZE
        );
        assert_eq!(
            positive_or(Some(0usize), DEFAULT_INSERT_CHUNK_SIZE),
            DEFAULT_INSERT_CHUNK_SIZE
        );
        assert_eq!(positive_or(Some(250i64), DEFAULT_IMAGE_CHUNK_SIZE), 250);
        assert_eq!(
            positive_or(None::<i64>, DEFAULT_IMAGE_CHUNK_SIZE),
            DEFAULT_IMAGE_CHUNK_SIZE
        );
    }
}
