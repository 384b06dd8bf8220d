//! SSH remote execution and file transfer
//!
//! All remote interaction goes through [`RemoteHost`]: a bounded no-op probe,
//! remote command execution, and scp-based file transfer. Authentication is
//! always non-interactive (`BatchMode=yes`); an unreachable host is fatal for
//! the whole operation and is never retried.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use camino::Utf8Path;

use crate::{Error, Result};

/// Connect timeout for the initial reachability probe, in seconds.
/// Subsequent commands run to completion without an enforced timeout.
const SSH_CONNECT_TIMEOUT_SECS: u32 = 10;

/// A remote deployment target reachable over SSH
#[derive(Debug, Clone)]
pub struct RemoteHost {
    target: String,
}

impl RemoteHost {
    /// Create a remote host from a `user@host` identity string
    pub fn new(target: impl Into<String>) -> Result<Self> {
        let target = target.into();
        if target.is_empty() || !target.contains('@') || target.chars().any(char::is_whitespace) {
            return Err(Error::config(
                format!("Invalid remote host '{}'", target),
                "Pass the target as user@host, e.g. deploy@news.example.com",
            ));
        }
        Ok(Self { target })
    }

    /// The `user@host` identity string
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Verify the host is reachable with key-based authentication.
    ///
    /// Runs a no-op remote command with a bounded connect timeout. Failure is
    /// fatal to the caller; SSH problems do not self-resolve within one
    /// invocation, so there is no retry.
    pub fn probe(&self) -> Result<()> {
        tracing::info!(host = %self.target, "Checking SSH connectivity");

        let status = Command::new("ssh")
            .arg("-o")
            .arg(format!("ConnectTimeout={}", SSH_CONNECT_TIMEOUT_SECS))
            .arg("-o")
            .arg("BatchMode=yes")
            .arg(&self.target)
            .arg("true")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if !status.success() {
            return Err(Error::connectivity(
                format!("Cannot reach {} via SSH", self.target),
                "Check that the host is up and that key-based authentication is configured \
                 (ssh-copy-id)",
            ));
        }

        tracing::debug!(host = %self.target, "SSH connectivity OK");
        Ok(())
    }

    /// Run a shell command on the remote host and capture its output.
    ///
    /// A non-zero remote exit status is not an error at this level; callers
    /// inspect `Output::status` and decide.
    pub fn exec(&self, script: &str) -> Result<Output> {
        tracing::debug!(host = %self.target, script, "Running remote command");

        let output = Command::new("ssh")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg(&self.target)
            .arg(script)
            .output()?;

        Ok(output)
    }

    /// Run a remote command, feeding `input` to its stdin.
    ///
    /// Used to place generated file content on the remote host without a
    /// local temporary file.
    pub fn exec_with_stdin(&self, script: &str, input: &str) -> Result<Output> {
        tracing::debug!(host = %self.target, script, "Running remote command with stdin");

        let mut child = Command::new("ssh")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg(&self.target)
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        Ok(output)
    }

    /// Run a remote command and fail with a deploy error when it exits
    /// non-zero. `context` names the step for the error message.
    pub fn exec_checked(&self, script: &str, context: &str) -> Result<Output> {
        let output = self.exec(script)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::deploy(
                format!("{} failed on {}: {}", context, self.target, stderr.trim()),
                "Inspect the remote host state and re-run; operations are idempotent",
            ));
        }
        Ok(output)
    }

    /// Check a remote test expression, mapping exit status to a boolean
    pub fn exec_test(&self, expression: &str) -> Result<bool> {
        let output = self.exec(expression)?;
        Ok(output.status.success())
    }

    /// Transfer a local file to a path relative to the remote home directory
    pub fn upload(&self, local: &Utf8Path, remote_path: &str) -> Result<()> {
        tracing::info!(
            host = %self.target,
            src = %local,
            dst = remote_path,
            "Transferring file"
        );

        let status = Command::new("scp")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg(local.as_str())
            .arg(format!("{}:{}", self.target, remote_path))
            .status()?;

        if !status.success() {
            return Err(Error::connectivity(
                format!(
                    "Failed to transfer {} to {}:{}",
                    local, self.target, remote_path
                ),
                "Check SSH connectivity, remote disk space, and that the remote directory exists",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_user_at_host() {
        let host = RemoteHost::new("deploy@news.example.com").unwrap();
        assert_eq!(host.target(), "deploy@news.example.com");
    }

    #[test]
    fn test_rejects_missing_user() {
        assert!(RemoteHost::new("news.example.com").is_err());
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert!(RemoteHost::new("").is_err());
        assert!(RemoteHost::new("user@host extra").is_err());
    }
}
