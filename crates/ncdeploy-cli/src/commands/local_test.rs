//! Local-test command implementation

use camino::Utf8Path;
use clap::Args;
use miette::{IntoDiagnostic, Result};
use ncdeploy_core::local::LocalOrchestrator;
use ncdeploy_core::Settings;

/// Arguments for the local-test command
#[derive(Debug, Args)]
pub struct LocalTestArgs {}

/// Run the local-test command
pub fn run(project_root: &Utf8Path, _args: LocalTestArgs) -> Result<()> {
    let settings = Settings::load(project_root).into_diagnostic()?;

    let orchestrator = LocalOrchestrator::new(&settings, project_root);
    orchestrator.smoke_test().into_diagnostic()?;

    Ok(())
}
