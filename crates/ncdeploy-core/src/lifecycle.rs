//! Container instance lifecycle control
//!
//! Drives the named container instance through its states with idempotent
//! transitions. Every mutating transition is followed by a verification read
//! of the instance status before the operation is reported complete.
//!
//! The instance status is parsed into a typed [`InstanceState`] in one place
//! instead of substring-matching free-form status text at every decision
//! site.

use std::time::Duration;

use crate::remote::RemoteHost;
use crate::runtime::ContainerRuntime;
use crate::settings::Settings;
use crate::{Error, Result};

/// Settle delay between a mutating engine command and its verification read
const VERIFY_SETTLE: Duration = Duration::from_secs(2);

/// Lifecycle state of the named container instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    /// No container with the configured name exists
    Absent,
    /// Container exists but is not running (created, exited, paused, dead)
    Stopped,
    /// Container is up
    Running,
    /// Container is stuck in a restart loop
    Restarting,
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InstanceState::Absent => "absent",
            InstanceState::Stopped => "stopped",
            InstanceState::Running => "running",
            InstanceState::Restarting => "restarting",
        };
        f.write_str(s)
    }
}

/// Map an engine status line (`ps --format {{.Status}}`) to a typed state.
///
/// Both supported engines prefix a live container's status with "Up" and a
/// restart-looping one with "Restarting"; everything else that still has a
/// status line (Exited, Created, Paused, Dead) is a stopped container.
pub fn parse_status(raw: &str) -> InstanceState {
    let status = raw.trim();
    if status.is_empty() {
        InstanceState::Absent
    } else if status.starts_with("Up") {
        InstanceState::Running
    } else if status.starts_with("Restarting") {
        InstanceState::Restarting
    } else {
        InstanceState::Stopped
    }
}

/// Controls the lifecycle of the named instance on a remote host
pub struct LifecycleController<'a> {
    host: &'a RemoteHost,
    runtime: ContainerRuntime,
    settings: &'a Settings,
}

impl<'a> LifecycleController<'a> {
    pub fn new(host: &'a RemoteHost, runtime: ContainerRuntime, settings: &'a Settings) -> Self {
        Self {
            host,
            runtime,
            settings,
        }
    }

    fn container(&self) -> &str {
        &self.settings.remote.container
    }

    /// Read the current instance state
    pub fn status(&self) -> Result<InstanceState> {
        let script = format!(
            "{} ps -a --filter name=^{}$ --format '{{{{.Status}}}}'",
            self.runtime.program(),
            self.container()
        );
        let output = self.host.exec_checked(&script, "Status query")?;
        let raw = String::from_utf8_lossy(&output.stdout);
        Ok(parse_status(&raw))
    }

    /// Start a stopped instance. Idempotent: an already-running instance is
    /// reported as success with no action. A missing instance is a fatal
    /// precondition failure; start never creates one implicitly.
    pub fn start(&self) -> Result<()> {
        match self.status()? {
            InstanceState::Running => {
                tracing::info!(
                    container = self.container(),
                    host = self.host.target(),
                    "Container is already running, nothing to do"
                );
                Ok(())
            }
            InstanceState::Absent => Err(Error::precondition(
                format!(
                    "Container '{}' does not exist on {}",
                    self.container(),
                    self.host.target()
                ),
                format!("Deploy it first: ncdeploy deploy {}", self.host.target()),
            )),
            InstanceState::Stopped | InstanceState::Restarting => {
                tracing::info!(
                    container = self.container(),
                    host = self.host.target(),
                    "Starting container"
                );
                let script = format!("{} start {}", self.runtime.program(), self.container());
                self.host.exec_checked(&script, "Container start")?;
                self.verify_running()
            }
        }
    }

    /// Stop a running instance. Idempotent: a missing or already-stopped
    /// instance is reported as success with no action.
    pub fn stop(&self) -> Result<()> {
        match self.status()? {
            InstanceState::Absent => {
                tracing::info!(
                    container = self.container(),
                    host = self.host.target(),
                    "No container found, nothing to stop"
                );
                Ok(())
            }
            InstanceState::Stopped => {
                tracing::info!(
                    container = self.container(),
                    host = self.host.target(),
                    "Container is already stopped"
                );
                Ok(())
            }
            InstanceState::Running | InstanceState::Restarting => {
                tracing::info!(
                    container = self.container(),
                    host = self.host.target(),
                    "Stopping container"
                );
                let script = format!("{} stop {}", self.runtime.program(), self.container());
                self.host.exec_checked(&script, "Container stop")?;

                std::thread::sleep(VERIFY_SETTLE);
                match self.status()? {
                    InstanceState::Running | InstanceState::Restarting => Err(Error::deploy(
                        format!(
                            "Container '{}' is still running after stop",
                            self.container()
                        ),
                        format!(
                            "Inspect it on the host: ssh {} '{} ps -a'",
                            self.host.target(),
                            self.runtime.program()
                        ),
                    )),
                    InstanceState::Stopped | InstanceState::Absent => Ok(()),
                }
            }
        }
    }

    /// Remove the instance entirely, stopping it first when needed.
    /// Idempotent: absence is not an error. Used by deploy before loading a
    /// new image so the fixed name is never duplicated.
    pub fn remove(&self) -> Result<()> {
        match self.status()? {
            InstanceState::Absent => {
                tracing::debug!(
                    container = self.container(),
                    "No existing container to remove"
                );
                return Ok(());
            }
            InstanceState::Running | InstanceState::Restarting => {
                tracing::info!(
                    container = self.container(),
                    host = self.host.target(),
                    "Stopping existing container"
                );
                let script = format!("{} stop {}", self.runtime.program(), self.container());
                self.host.exec_checked(&script, "Container stop")?;
            }
            InstanceState::Stopped => {}
        }

        tracing::info!(
            container = self.container(),
            host = self.host.target(),
            "Removing existing container"
        );
        let script = format!("{} rm {}", self.runtime.program(), self.container());
        self.host.exec_checked(&script, "Container removal")?;

        match self.status()? {
            InstanceState::Absent => Ok(()),
            state => Err(Error::deploy(
                format!(
                    "Container '{}' still present ({}) after removal",
                    self.container(),
                    state
                ),
                format!(
                    "Remove it manually: ssh {} '{} rm -f {}'",
                    self.host.target(),
                    self.runtime.program(),
                    self.container()
                ),
            )),
        }
    }

    /// Create and start a new instance from the deployed image: fixed name,
    /// restart policy, port binding, config mounted read-only and output
    /// mounted read-write.
    pub fn run(&self) -> Result<()> {
        let remote_root = self.settings.remote_root();
        let port = self.settings.remote.port;
        let script = format!(
            "{prog} run -d --name {name} --restart unless-stopped -p {port}:8000 \
             -v {root}/config/config.yaml:/app/config/config.yaml:ro \
             -v {root}/output:/app/output \
             {image}",
            prog = self.runtime.program(),
            name = self.container(),
            port = port,
            root = remote_root,
            image = self.settings.image_ref(),
        );

        tracing::info!(
            container = self.container(),
            host = self.host.target(),
            port,
            "Starting new container"
        );
        self.host.exec_checked(&script, "Container run")?;
        self.verify_running()
    }

    /// Verification read after a mutating transition: the instance must
    /// report running, otherwise the operation failed.
    fn verify_running(&self) -> Result<()> {
        std::thread::sleep(VERIFY_SETTLE);
        match self.status()? {
            InstanceState::Running => {
                tracing::info!(
                    container = self.container(),
                    host = self.host.target(),
                    "Container is running"
                );
                Ok(())
            }
            state => Err(Error::deploy(
                format!(
                    "Container '{}' is {} instead of running",
                    self.container(),
                    state
                ),
                format!(
                    "Inspect the logs: ssh {} '{} logs {}'",
                    self.host.target(),
                    self.runtime.program(),
                    self.container()
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_running() {
        assert_eq!(parse_status("Up 3 hours"), InstanceState::Running);
        assert_eq!(
            parse_status("Up 5 seconds (healthy)"),
            InstanceState::Running
        );
    }

    #[test]
    fn test_parse_status_restarting() {
        assert_eq!(
            parse_status("Restarting (1) 2 seconds ago"),
            InstanceState::Restarting
        );
    }

    #[test]
    fn test_parse_status_stopped() {
        assert_eq!(parse_status("Exited (0) 2 hours ago"), InstanceState::Stopped);
        assert_eq!(parse_status("Created"), InstanceState::Stopped);
        assert_eq!(parse_status("Dead"), InstanceState::Stopped);
    }

    #[test]
    fn test_parse_status_absent() {
        assert_eq!(parse_status(""), InstanceState::Absent);
        assert_eq!(parse_status("  \n"), InstanceState::Absent);
    }
}
