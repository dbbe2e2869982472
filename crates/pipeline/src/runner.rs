//! External conversion script invocation.
//!
//! Builds and runs the Python segmentation script synchronously, one
//! invocation per chunk. The script reads the two scratch input artifacts
//! and writes the CSV result artifact; a non-zero exit code is fatal for
//! the whole job and carries the captured output.

use std::path::Path;
use std::process::Stdio;

use ptp_core::PtpConfig;

use crate::error::PipelineError;
use crate::job::ScratchPaths;

/// Runs the external point-to-polygon conversion script.
pub struct ModelRunner {
    config: PtpConfig,
}

impl ModelRunner {
    pub fn new(config: PtpConfig) -> Self {
        Self { config }
    }

    /// Download the model checkpoint if it is not present locally.
    ///
    /// The download is attempted exactly once per call; failure is fatal
    /// and must not be swallowed, otherwise the script would start and
    /// fail with a far less useful error.
    pub async fn ensure_checkpoint(&self) -> Result<(), PipelineError> {
        if tokio::fs::try_exists(&self.config.model_path).await? {
            return Ok(());
        }

        if let Some(parent) = self.config.model_path.parent() {
            create_private_dir(parent).await?;
        }

        let url = &self.config.model_url;
        tracing::info!(url, "downloading model checkpoint");

        let download = async {
            let response = reqwest::get(url).await?.error_for_status()?;
            response.bytes().await
        };
        let bytes = download.await.map_err(|e| PipelineError::CheckpointDownload {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(&self.config.model_path, &bytes).await?;
        Ok(())
    }

    /// Run the conversion script over one chunk's scratch artifacts.
    ///
    /// Ensures the checkpoint and the result directory exist, then spawns
    /// the interpreter and waits for it, capturing combined output.
    pub async fn run(&self, paths: &ScratchPaths) -> Result<(), PipelineError> {
        self.ensure_checkpoint().await?;

        if let Some(parent) = paths.output_file.parent() {
            create_private_dir(parent).await?;
        }

        let mut command = tokio::process::Command::new(&self.config.python);
        command
            .arg("-u")
            .arg(&self.config.script)
            .arg("--image-paths-file")
            .arg(&paths.images_file)
            .arg("--input-file")
            .arg(&paths.input_file)
            .arg("--model-type")
            .arg(&self.config.model_type)
            .arg("--model-path")
            .arg(&self.config.model_path)
            .arg("--output-file")
            .arg(&paths.output_file)
            .stdin(Stdio::null());
        if let Some(device) = &self.config.device {
            command.arg("--device").arg(device);
        }

        let output = command.output().await?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(PipelineError::ModelFailed {
                script: self.config.script.display().to_string(),
                exit_code: output.status.code().unwrap_or(-1),
                output: combined,
            });
        }
        Ok(())
    }
}

/// Create a directory (and its parents) readable only by the service
/// user, succeeding if it already exists.
pub(crate) async fn create_private_dir(dir: &Path) -> Result<(), std::io::Error> {
    if tokio::fs::try_exists(dir).await? {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700)).await?;
    }
    Ok(())
}
