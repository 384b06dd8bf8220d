//! Deploy state records
//!
//! After a successful deployment a small record is written under the local
//! state directory so the operator can see what was last shipped to a host.

use camino::Utf8Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Record of the last successful deployment to one host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployState {
    /// Timestamp of the deployment
    pub timestamp: DateTime<Utc>,
    /// Image name that was deployed
    pub image: String,
    /// Image tag that was deployed
    pub tag: String,
    /// Remote container runtime used
    pub runtime: String,
}

impl DeployState {
    /// Create a new deploy state stamped with the current time
    pub fn new(image: impl Into<String>, tag: impl Into<String>, runtime: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            image: image.into(),
            tag: tag.into(),
            runtime: runtime.into(),
        }
    }

    /// Load deploy state from a file
    pub fn load(path: &Utf8Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let state: Self = serde_json::from_str(&content).map_err(|e| {
            Error::deploy(
                format!("Failed to parse deploy state: {}", e),
                "The deploy state file may be corrupted. Try deleting it.",
            )
        })?;

        Ok(Some(state))
    }

    /// Save deploy state to a file
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| {
            Error::deploy(
                format!("Failed to serialize deploy state: {}", e),
                "This is likely a bug in ncdeploy",
            )
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_deploy_state_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let state_path = Utf8Path::from_path(temp_dir.path())
            .unwrap()
            .join("last_deploy.json");

        let state = DeployState::new("newscollector", "latest", "podman");
        state.save(&state_path).unwrap();

        let loaded = DeployState::load(&state_path).unwrap().unwrap();

        assert_eq!(loaded.image, "newscollector");
        assert_eq!(loaded.tag, "latest");
        assert_eq!(loaded.runtime, "podman");
    }

    #[test]
    fn test_deploy_state_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let state_path = Utf8Path::from_path(temp_dir.path())
            .unwrap()
            .join("nonexistent.json");

        let result = DeployState::load(&state_path).unwrap();
        assert!(result.is_none());
    }
}
