//! Start command implementation

use camino::Utf8Path;
use clap::Args;
use miette::{IntoDiagnostic, Result};
use ncdeploy_core::lifecycle::LifecycleController;
use ncdeploy_core::remote::RemoteHost;
use ncdeploy_core::{runtime, Settings};

/// Arguments for the start command
#[derive(Debug, Args)]
pub struct StartArgs {
    /// Target host (user@host)
    pub host: String,
}

/// Run the start command
pub fn run(project_root: &Utf8Path, args: StartArgs) -> Result<()> {
    let settings = Settings::load(project_root).into_diagnostic()?;
    let host = RemoteHost::new(args.host).into_diagnostic()?;

    runtime::require_tools(&["ssh"]).into_diagnostic()?;
    host.probe().into_diagnostic()?;
    let rt = runtime::require_remote(&host).into_diagnostic()?;

    let controller = LifecycleController::new(&host, rt, &settings);
    controller.start().into_diagnostic()?;

    Ok(())
}
