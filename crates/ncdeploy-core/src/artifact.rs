//! Image build and artifact serialization
//!
//! The deployment artifact is the gzip-compressed `save` output of the built
//! image, written to a fixed temporary path. The path is owned by a
//! [`TempArtifact`] guard so the file is removed on every exit path,
//! success or failure.

use std::fs::File;
use std::process::{Command, Stdio};

use camino::{Utf8Path, Utf8PathBuf};

use crate::remote::RemoteHost;
use crate::runtime::ContainerRuntime;
use crate::settings::Settings;
use crate::{Error, Result};

/// Scoped temporary file, removed when dropped
#[derive(Debug)]
pub struct TempArtifact {
    path: Utf8PathBuf,
}

impl TempArtifact {
    /// Take ownership of a temporary path. Removal is unconditional on drop,
    /// so the guard must be created before the file is produced.
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path, error = %e, "Failed to remove temporary artifact");
            } else {
                tracing::debug!(path = %self.path, "Removed temporary artifact");
            }
        }
    }
}

/// Builds the deployable image and serializes it for transfer
pub struct ArtifactPipeline<'a> {
    settings: &'a Settings,
    runtime: ContainerRuntime,
}

impl<'a> ArtifactPipeline<'a> {
    pub fn new(settings: &'a Settings, runtime: ContainerRuntime) -> Self {
        Self { settings, runtime }
    }

    /// Build the local image from the configured build context.
    ///
    /// Failure here is fatal and happens before any remote state is touched.
    pub fn build_image(&self) -> Result<()> {
        let image_ref = self.settings.image_ref();
        tracing::info!(image = %image_ref, "Building image");

        let status = Command::new(self.runtime.program())
            .args(["build", "-t", &image_ref])
            .arg(self.settings.image.build_context.as_str())
            .status()?;

        if !status.success() {
            return Err(Error::deploy(
                format!("Image build failed for {}", image_ref),
                "Fix the build errors above; no remote state was touched",
            ));
        }

        Ok(())
    }

    /// Serialize the built image to the fixed compressed artifact path.
    ///
    /// The guard is created before the pipeline runs so a partially written
    /// file is cleaned up when either process fails.
    pub fn save_compressed(&self) -> Result<TempArtifact> {
        let image_ref = self.settings.image_ref();
        let artifact = TempArtifact::new(self.settings.artifact_local_path());
        tracing::info!(image = %image_ref, path = %artifact.path(), "Serializing image");

        let mut save = Command::new(self.runtime.program())
            .args(["save", &image_ref])
            .stdout(Stdio::piped())
            .spawn()?;

        let save_stdout = save.stdout.take().ok_or_else(|| {
            Error::deploy(
                format!("Could not capture {} save output", self.runtime),
                "This is likely a bug in ncdeploy",
            )
        })?;

        let out_file = File::create(artifact.path())?;
        let mut gzip = Command::new("gzip")
            .stdin(Stdio::from(save_stdout))
            .stdout(Stdio::from(out_file))
            .spawn()?;

        let save_status = save.wait()?;
        let gzip_status = gzip.wait()?;

        if !save_status.success() {
            return Err(Error::deploy(
                format!("{} save failed for {}", self.runtime, image_ref),
                "Check that the image was built and the engine is healthy",
            ));
        }
        if !gzip_status.success() {
            return Err(Error::deploy(
                "gzip failed while compressing the image artifact".to_string(),
                "Check free space under /tmp",
            ));
        }

        Ok(artifact)
    }

    /// Transfer the artifact to the remote staging directory.
    ///
    /// Returns the artifact path as referenced inside remote commands.
    pub fn transfer(&self, host: &RemoteHost, artifact: &TempArtifact) -> Result<String> {
        let file_name = self.settings.artifact_file_name();
        host.upload(
            artifact.path(),
            &self.settings.remote_data_path(&file_name),
        )?;
        Ok(format!("{}/data/{}", self.settings.remote_root(), file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_artifact_removes_file_on_drop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("image.tar.gz")).unwrap();
        std::fs::write(&path, b"artifact").unwrap();

        {
            let _guard = TempArtifact::new(path.clone());
            assert!(path.exists());
        }

        assert!(!path.exists());
    }

    #[test]
    fn test_temp_artifact_tolerates_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("never-created.tar.gz")).unwrap();

        // Dropping a guard whose file was never produced must not panic
        let guard = TempArtifact::new(path);
        drop(guard);
    }
}
