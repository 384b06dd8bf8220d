//! Setup command implementation

use camino::Utf8Path;
use clap::Args;
use miette::{IntoDiagnostic, Result};
use ncdeploy_core::remote::RemoteHost;
use ncdeploy_core::{runtime, setup, Settings};

/// Arguments for the setup command
#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Target host (user@host)
    pub host: String,
}

/// Run the setup command
pub fn run(project_root: &Utf8Path, args: SetupArgs) -> Result<()> {
    let settings = Settings::load(project_root).into_diagnostic()?;
    let host = RemoteHost::new(args.host).into_diagnostic()?;

    runtime::require_tools(&["ssh"]).into_diagnostic()?;
    setup::run(&host, &settings).into_diagnostic()?;

    Ok(())
}
