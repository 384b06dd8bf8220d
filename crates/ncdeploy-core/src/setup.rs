//! Remote directory layout setup
//!
//! Creates the fixed layout every other remote operation relies on:
//!
//! ```text
//! ~/<remote-dir>/config/config.yaml     read-only mount for the container
//! ~/<remote-dir>/output/{collected,reports,verdicts}
//! ~/<remote-dir>/data/                  transient staging for transfers
//! ```
//!
//! Setup is idempotent; an existing configuration file is never overwritten.

use crate::appconfig;
use crate::remote::RemoteHost;
use crate::settings::Settings;
use crate::{Error, Result};

/// Probe the host and create the remote layout
pub fn run(host: &RemoteHost, settings: &Settings) -> Result<()> {
    host.probe()?;
    ensure_layout(host, settings)
}

/// Create the remote directory layout and the default configuration file.
///
/// Assumes reachability has already been verified. Safe to call on an
/// already-set-up host.
pub fn ensure_layout(host: &RemoteHost, settings: &Settings) -> Result<()> {
    let root = settings.remote_root();

    tracing::info!(host = host.target(), dir = %root, "Creating remote directory layout");

    let script = format!(
        "mkdir -p {root}/config {root}/output/collected {root}/output/reports \
         {root}/output/verdicts {root}/data",
        root = root
    );
    host.exec_checked(&script, "Remote directory creation")?;

    let config_path = format!("{}/config/config.yaml", root);
    let exists = host.exec_test(&format!("test -f {}", config_path))?;
    if exists {
        tracing::info!(host = host.target(), "Remote configuration already exists, keeping it");
    } else {
        let script = format!("cat > {}", config_path);
        let output = host.exec_with_stdin(&script, appconfig::default_config_yaml())?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::deploy(
                format!(
                    "Failed to write default configuration on {}: {}",
                    host.target(),
                    stderr.trim()
                ),
                "Check remote permissions under the deployment directory",
            ));
        }
        tracing::info!(host = host.target(), path = %config_path, "Wrote default remote configuration");
    }

    tracing::info!(host = host.target(), "Remote setup complete");
    Ok(())
}

/// Whether the remote layout exists (checked against the config directory)
pub fn layout_exists(host: &RemoteHost, settings: &Settings) -> Result<bool> {
    host.exec_test(&format!("test -d {}/config", settings.remote_root()))
}
