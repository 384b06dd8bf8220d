//! Import-data command implementation

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use miette::{IntoDiagnostic, Result};
use ncdeploy_core::import::DataImporter;
use ncdeploy_core::remote::RemoteHost;
use ncdeploy_core::Settings;

/// Arguments for the import-data command
#[derive(Debug, Args)]
pub struct ImportDataArgs {
    /// Target host (user@host)
    pub host: String,

    /// Local data directory (default: the configured output directory)
    pub local_path: Option<Utf8PathBuf>,
}

/// Run the import-data command
pub fn run(project_root: &Utf8Path, args: ImportDataArgs) -> Result<()> {
    let settings = Settings::load(project_root).into_diagnostic()?;
    let host = RemoteHost::new(args.host).into_diagnostic()?;

    let importer = DataImporter::new(&settings);
    importer
        .import(&host, args.local_path.as_deref())
        .into_diagnostic()?;

    tracing::info!("Import complete!");
    Ok(())
}
