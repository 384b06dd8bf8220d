//! Deployment settings parsing and merging
//!
//! This module handles parsing of `ncdeploy.toml` and `ncdeploy.local.toml`
//! files. Every component takes an explicit [`Settings`] reference; there are
//! no process-wide deployment constants.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Main settings structure for ncdeploy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Image build settings
    pub image: ImageSettings,

    /// Remote deployment settings
    pub remote: RemoteSettings,

    /// Local run settings
    pub local: LocalSettings,
}

/// Image build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Image name (default: "newscollector")
    pub name: String,

    /// Image tag (default: "latest")
    pub tag: String,

    /// Build context directory (default: ".")
    pub build_context: Utf8PathBuf,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            name: "newscollector".to_string(),
            tag: "latest".to_string(),
            build_context: Utf8PathBuf::from("."),
        }
    }
}

/// Remote deployment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Container name on the target host (default: "newscollector")
    pub container: String,

    /// Deployment directory under the remote home (default: "newscollector")
    pub dir: String,

    /// Host port bound to the container port (default: 8000)
    pub port: u16,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            container: "newscollector".to_string(),
            dir: "newscollector".to_string(),
            port: 8000,
        }
    }
}

/// Local run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    /// Local output directory, also the import-data default (default: "output")
    pub output_dir: Utf8PathBuf,

    /// State directory for ncdeploy internal files (default: ".ncdeploy")
    pub state_dir: Utf8PathBuf,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            output_dir: Utf8PathBuf::from("output"),
            state_dir: Utf8PathBuf::from(".ncdeploy"),
        }
    }
}

impl Settings {
    /// Load settings from a project directory.
    ///
    /// This loads `ncdeploy.toml` and optionally merges `ncdeploy.local.toml`
    /// if it exists. Both files are optional; defaults cover the stock
    /// newscollector deployment.
    pub fn load(root: &Utf8Path) -> Result<Self> {
        let settings_path = root.join("ncdeploy.toml");
        let local_settings_path = root.join("ncdeploy.local.toml");

        let base = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            toml::from_str::<toml::Value>(&content)?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };

        let local = if local_settings_path.exists() {
            let content = std::fs::read_to_string(&local_settings_path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        } else {
            None
        };

        let merged = if let Some(local) = local {
            merge_toml_values(base, local)
        } else {
            base
        };

        let settings: Settings = merged.try_into()?;

        Ok(settings)
    }

    /// Load settings from a string (for testing)
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Full image reference, `<name>:<tag>`
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image.name, self.image.tag)
    }

    /// Fixed local path for the serialized image artifact
    pub fn artifact_local_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("/tmp/{}-image.tar.gz", self.image.name))
    }

    /// Artifact file name on the remote staging directory
    pub fn artifact_file_name(&self) -> String {
        format!("{}-image.tar.gz", self.image.name)
    }

    /// Remote deployment directory as referenced inside SSH commands
    pub fn remote_root(&self) -> String {
        format!("~/{}", self.remote.dir)
    }

    /// Remote staging path for an uploaded file, relative to the remote home
    /// (the form scp expects)
    pub fn remote_data_path(&self, file_name: &str) -> String {
        format!("{}/data/{}", self.remote.dir, file_name)
    }

    /// Local state file recording the last deployment to a host
    pub fn deploy_state_path(&self, host: &str) -> Utf8PathBuf {
        self.local
            .state_dir
            .join("deploy")
            .join(host)
            .join("last_deploy.json")
    }
}

/// Merge two TOML values:
/// - Tables: recursively merged
/// - Arrays: local replaces base (not merged)
/// - Primitives: local overrides base
fn merge_toml_values(base: toml::Value, local: toml::Value) -> toml::Value {
    match (base, local) {
        (toml::Value::Table(mut base_table), toml::Value::Table(local_table)) => {
            for (key, local_value) in local_table {
                if let Some(base_value) = base_table.remove(&key) {
                    base_table.insert(key, merge_toml_values(base_value, local_value));
                } else {
                    base_table.insert(key, local_value);
                }
            }
            toml::Value::Table(base_table)
        }
        // For arrays and primitives, local completely overrides base
        (_, local) => local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.image.name, "newscollector");
        assert_eq!(settings.image.tag, "latest");
        assert_eq!(settings.image.build_context, Utf8PathBuf::from("."));
        assert_eq!(settings.remote.container, "newscollector");
        assert_eq!(settings.remote.dir, "newscollector");
        assert_eq!(settings.remote.port, 8000);
        assert_eq!(settings.local.output_dir, Utf8PathBuf::from("output"));
        assert_eq!(settings.local.state_dir, Utf8PathBuf::from(".ncdeploy"));
    }

    #[test]
    fn test_parse_minimal_settings() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings.image_ref(), "newscollector:latest");
    }

    #[test]
    fn test_parse_full_settings() {
        let content = r#"
[image]
name = "collector"
tag = "v2"
build_context = "service"

[remote]
container = "collector"
dir = "apps/collector"
port = 9000

[local]
output_dir = "data/out"
"#;

        let settings = Settings::parse(content).unwrap();

        assert_eq!(settings.image_ref(), "collector:v2");
        assert_eq!(settings.image.build_context, Utf8PathBuf::from("service"));
        assert_eq!(settings.remote.container, "collector");
        assert_eq!(settings.remote.port, 9000);
        assert_eq!(settings.remote_root(), "~/apps/collector");
        assert_eq!(settings.local.output_dir, Utf8PathBuf::from("data/out"));
        // state_dir not set, default preserved
        assert_eq!(settings.local.state_dir, Utf8PathBuf::from(".ncdeploy"));
    }

    #[test]
    fn test_path_helpers() {
        let settings = Settings::default();

        assert_eq!(
            settings.artifact_local_path(),
            Utf8PathBuf::from("/tmp/newscollector-image.tar.gz")
        );
        assert_eq!(
            settings.remote_data_path("newscollector-image.tar.gz"),
            "newscollector/data/newscollector-image.tar.gz"
        );
        assert_eq!(
            settings.deploy_state_path("user@host"),
            Utf8PathBuf::from(".ncdeploy/deploy/user@host/last_deploy.json")
        );
    }

    #[test]
    fn test_merge_settings_via_toml_value() {
        let base = r#"
[image]
name = "collector"
tag = "v1"

[remote]
port = 9000
"#;

        let local = r#"
[image]
tag = "v2"
"#;

        let base_value: toml::Value = toml::from_str(base).unwrap();
        let local_value: toml::Value = toml::from_str(local).unwrap();
        let merged_value = merge_toml_values(base_value, local_value);
        let merged: Settings = merged_value.try_into().unwrap();

        // tag should be overridden by local
        assert_eq!(merged.image.tag, "v2");
        // name should be from base (local didn't define it)
        assert_eq!(merged.image.name, "collector");
        // port should be from base
        assert_eq!(merged.remote.port, 9000);
    }

    #[test]
    fn test_load_from_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(temp_dir.path()).unwrap();

        std::fs::write(
            root.join("ncdeploy.toml"),
            "[image]\ntag = \"v1\"\n\n[remote]\nport = 9000\n",
        )
        .unwrap();
        std::fs::write(root.join("ncdeploy.local.toml"), "[image]\ntag = \"dev\"\n").unwrap();

        let settings = Settings::load(root).unwrap();

        // Local should override base
        assert_eq!(settings.image.tag, "dev");
        // Base value should be preserved for non-overridden fields
        assert_eq!(settings.remote.port, 9000);
    }

    #[test]
    fn test_load_missing_settings_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(temp_dir.path()).unwrap();

        let settings = Settings::load(root).unwrap();

        assert_eq!(settings.image_ref(), "newscollector:latest");
    }
}
