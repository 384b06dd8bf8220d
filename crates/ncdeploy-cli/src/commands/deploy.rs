//! Deploy command implementation

use camino::Utf8Path;
use clap::Args;
use miette::{IntoDiagnostic, Result};
use ncdeploy_core::deploy::DeployManager;
use ncdeploy_core::remote::RemoteHost;
use ncdeploy_core::Settings;

/// Arguments for the deploy command
#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Target host (user@host)
    pub host: String,
}

/// Run the deploy command
pub fn run(project_root: &Utf8Path, args: DeployArgs) -> Result<()> {
    let settings = Settings::load(project_root).into_diagnostic()?;
    let host = RemoteHost::new(args.host).into_diagnostic()?;

    tracing::info!(
        host = host.target(),
        image = %settings.image_ref(),
        "Deploying to remote host"
    );

    let manager = DeployManager::new(&settings);
    manager.deploy(&host).into_diagnostic()?;

    tracing::info!("Deployment complete!");
    Ok(())
}
