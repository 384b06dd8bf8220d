//! Local-start command implementation

use camino::Utf8Path;
use clap::Args;
use miette::{IntoDiagnostic, Result};
use ncdeploy_core::local::{LocalOrchestrator, LocalStartOptions};
use ncdeploy_core::Settings;

/// Arguments for the local-start command
#[derive(Debug, Args)]
pub struct LocalStartArgs {
    /// Also provision a local database
    #[arg(long)]
    pub with_db: bool,

    /// Tear down any previous local instance first
    #[arg(long)]
    pub clean: bool,

    /// Force a fresh image build (container strategies)
    #[arg(long)]
    pub rebuild: bool,

    /// Run directly on the host, skipping container strategies
    #[arg(long)]
    pub no_container: bool,
}

/// Run the local-start command
pub fn run(project_root: &Utf8Path, args: LocalStartArgs) -> Result<()> {
    let settings = Settings::load(project_root).into_diagnostic()?;

    let orchestrator = LocalOrchestrator::new(&settings, project_root);
    orchestrator
        .start(LocalStartOptions {
            with_db: args.with_db,
            clean: args.clean,
            rebuild: args.rebuild,
            no_container: args.no_container,
        })
        .into_diagnostic()?;

    Ok(())
}
