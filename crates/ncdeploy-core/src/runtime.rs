//! Container runtime detection
//!
//! Discovers which container engine is usable on a target, locally or over
//! SSH. Podman is preferred over docker when both are present. Detection is a
//! read-only probe; absence maps to `None` and callers decide whether that is
//! fatal.

use std::process::{Command, Stdio};

use crate::remote::RemoteHost;
use crate::{Error, Result};

/// A supported container engine with its subcommand vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRuntime {
    Podman,
    Docker,
}

impl ContainerRuntime {
    /// Engines in preference order
    pub const PREFERENCE: [ContainerRuntime; 2] =
        [ContainerRuntime::Podman, ContainerRuntime::Docker];

    /// Executable name for this engine
    pub fn program(&self) -> &'static str {
        match self {
            ContainerRuntime::Podman => "podman",
            ContainerRuntime::Docker => "docker",
        }
    }

    /// Whether this engine's `compose` subcommand is usable locally
    pub fn has_compose_subcommand(&self) -> bool {
        Command::new(self.program())
            .args(["compose", "version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl std::fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

/// Detect the usable container engine on the local machine.
///
/// Probes each engine's executable with `--version`; the first one that runs
/// successfully wins.
pub fn detect_local() -> Option<ContainerRuntime> {
    for runtime in ContainerRuntime::PREFERENCE {
        let available = Command::new(runtime.program())
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);

        if available {
            tracing::debug!(runtime = %runtime, "Detected local container runtime");
            return Some(runtime);
        }
    }
    None
}

/// Detect the usable container engine on a remote host.
///
/// Runs `command -v <engine>` through the SSH channel in preference order.
/// SSH transport failures propagate; a missing engine is `Ok(None)`.
pub fn detect_remote(host: &RemoteHost) -> Result<Option<ContainerRuntime>> {
    for runtime in ContainerRuntime::PREFERENCE {
        let script = format!("command -v {} >/dev/null 2>&1", runtime.program());
        if host.exec(&script)?.status.success() {
            tracing::debug!(runtime = %runtime, host = host.target(), "Detected remote container runtime");
            return Ok(Some(runtime));
        }
    }
    Ok(None)
}

/// Detect the local engine, failing when none is usable
pub fn require_local() -> Result<ContainerRuntime> {
    detect_local().ok_or_else(|| {
        Error::runtime(
            "No supported container runtime found on this machine",
            "Install podman or docker and ensure it is on PATH",
        )
    })
}

/// Detect the remote engine, failing when none is usable
pub fn require_remote(host: &RemoteHost) -> Result<ContainerRuntime> {
    detect_remote(host)?.ok_or_else(|| {
        Error::runtime(
            format!(
                "No supported container runtime found on {}",
                host.target()
            ),
            "Install podman or docker on the remote host",
        )
    })
}

/// Check whether an executable is reachable through PATH.
///
/// Used for the upfront required-tool checks (ssh, scp, gzip, tar, curl)
/// before any remote state is touched.
pub fn tool_in_path(name: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };

    for dir in std::env::split_paths(&path) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Ok(metadata) = std::fs::metadata(&candidate) {
                    if metadata.permissions().mode() & 0o111 != 0 {
                        return true;
                    }
                }
                continue;
            }
            #[cfg(not(unix))]
            return true;
        }
    }
    false
}

/// Verify that all required local tools exist before starting an operation
pub fn require_tools(tools: &[&str]) -> Result<()> {
    for tool in tools {
        if !tool_in_path(tool) {
            return Err(Error::connectivity(
                format!("Required local tool '{}' not found", tool),
                format!("Install '{}' and ensure it is on PATH", tool),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_names() {
        assert_eq!(ContainerRuntime::Podman.program(), "podman");
        assert_eq!(ContainerRuntime::Docker.program(), "docker");
    }

    #[test]
    fn test_preference_order_is_podman_first() {
        assert_eq!(ContainerRuntime::PREFERENCE[0], ContainerRuntime::Podman);
        assert_eq!(ContainerRuntime::PREFERENCE[1], ContainerRuntime::Docker);
    }

    #[test]
    fn test_tool_in_path_finds_sh() {
        // /bin/sh exists on any Unix system this tool targets
        assert!(tool_in_path("sh"));
    }

    #[test]
    fn test_tool_in_path_rejects_unknown() {
        assert!(!tool_in_path("definitely-not-a-real-tool-12345"));
    }

    #[test]
    fn test_require_tools_reports_missing_tool() {
        let err = require_tools(&["sh", "definitely-not-a-real-tool-12345"]).unwrap_err();
        assert!(err
            .to_string()
            .contains("definitely-not-a-real-tool-12345"));
    }
}
