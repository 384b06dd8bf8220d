//! Remote deployment orchestration
//!
//! The full pipeline: build the image locally, serialize it to a compressed
//! artifact, transfer it, replace the remote instance, and verify the new
//! instance is running. Re-running the pipeline converges to the same end
//! state; each mutating step checks current state first.

use crate::artifact::ArtifactPipeline;
use crate::lifecycle::LifecycleController;
use crate::remote::RemoteHost;
use crate::runtime;
use crate::settings::Settings;
use crate::setup;
use crate::state::DeployState;
use crate::Result;

/// Manager for the remote deployment pipeline
pub struct DeployManager<'a> {
    settings: &'a Settings,
}

impl<'a> DeployManager<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Deploy the service to a remote host.
    ///
    /// Local failures abort before any remote state is touched. The local
    /// artifact is removed on every exit path; the remote artifact copy is
    /// removed after a successful load.
    pub fn deploy(&self, host: &RemoteHost) -> Result<()> {
        runtime::require_tools(&["ssh", "scp", "gzip"])?;
        host.probe()?;

        let state_path = self.settings.deploy_state_path(host.target());
        if let Some(previous) = DeployState::load(&state_path)? {
            tracing::info!(
                host = host.target(),
                image = %previous.image,
                tag = %previous.tag,
                at = %previous.timestamp,
                "Previous deployment found"
            );
        }

        let local_runtime = runtime::require_local()?;
        let remote_runtime = runtime::require_remote(host)?;

        let pipeline = ArtifactPipeline::new(self.settings, local_runtime);
        pipeline.build_image()?;
        let artifact = pipeline.save_compressed()?;

        // First-time targets are bootstrapped rather than failed
        if !setup::layout_exists(host, self.settings)? {
            tracing::info!(host = host.target(), "Remote layout missing, running setup");
            setup::ensure_layout(host, self.settings)?;
        }

        let remote_artifact = pipeline.transfer(host, &artifact)?;

        let controller = LifecycleController::new(host, remote_runtime, self.settings);
        controller.remove()?;

        tracing::info!(host = host.target(), "Loading image into remote engine");
        let script = format!("{} load -i {}", remote_runtime.program(), remote_artifact);
        host.exec_checked(&script, "Image load")?;

        // Staging copy and dangling images are reclaimed best-effort
        let script = format!("rm -f {}", remote_artifact);
        if let Err(e) = host.exec_checked(&script, "Remote artifact removal") {
            tracing::warn!(host = host.target(), error = %e, "Could not remove remote artifact copy");
        }
        self.prune_dangling_images(host, remote_runtime);

        controller.run()?;

        let state = DeployState::new(
            self.settings.image.name.as_str(),
            self.settings.image.tag.as_str(),
            remote_runtime.program(),
        );
        state.save(&state_path)?;

        tracing::info!(
            host = host.target(),
            image = %self.settings.image_ref(),
            port = self.settings.remote.port,
            "Deployment complete"
        );
        Ok(())
    }

    /// Prune dangling images left behind by repeated loads. Never fatal.
    fn prune_dangling_images(&self, host: &RemoteHost, rt: runtime::ContainerRuntime) {
        let script = format!("{} image prune -f", rt.program());
        match host.exec(&script) {
            Ok(output) if output.status.success() => {
                tracing::debug!(host = host.target(), "Pruned dangling images");
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                tracing::warn!(
                    host = host.target(),
                    stderr = %stderr.trim(),
                    "Image prune failed"
                );
            }
            Err(e) => {
                tracing::warn!(host = host.target(), error = %e, "Image prune failed");
            }
        }
    }
}
