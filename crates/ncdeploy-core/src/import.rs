//! Data import into a running remote deployment
//!
//! Packages a local output tree into a compressed archive, ships it to the
//! remote staging directory, and extracts it into the remote output tree.
//! Imports are validated against a live service: the target instance must be
//! running before any transfer happens.

use std::process::Command;

use camino::Utf8Path;
use walkdir::WalkDir;

use crate::artifact::TempArtifact;
use crate::lifecycle::{InstanceState, LifecycleController};
use crate::remote::RemoteHost;
use crate::runtime;
use crate::settings::Settings;
use crate::setup;
use crate::{Error, Result};

/// Fixed local path for the packaged import bundle
const BUNDLE_LOCAL_PATH: &str = "/tmp/ncdeploy-import.tar.gz";
/// Bundle file name in the remote staging directory
const BUNDLE_FILE_NAME: &str = "import.tar.gz";

/// Data category inferred from a bundle's top-level directory names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Collected,
    Reports,
    Verdicts,
}

impl Classification {
    /// Directory name carrying this classification
    pub fn dir_name(&self) -> &'static str {
        match self {
            Classification::Collected => "collected",
            Classification::Reports => "reports",
            Classification::Verdicts => "verdicts",
        }
    }

    fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "collected" => Some(Classification::Collected),
            "reports" => Some(Classification::Reports),
            "verdicts" => Some(Classification::Verdicts),
            _ => None,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One recognized subtree of an import bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedDir {
    pub class: Classification,
    /// Number of JSON files under the subtree
    pub json_files: usize,
}

/// Inspect a local tree's top-level subdirectories against the fixed
/// classification set. An empty result means the bundle is generic.
pub fn classify_bundle(local: &Utf8Path) -> Result<Vec<ClassifiedDir>> {
    let mut classes = Vec::new();

    for entry in std::fs::read_dir(local)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(class) = Classification::from_dir_name(name) {
            let json_files = count_json_files(entry.path().as_path());
            classes.push(ClassifiedDir { class, json_files });
        }
    }

    classes.sort_by_key(|c| c.class.dir_name());
    Ok(classes)
}

/// Count `*.json` files under a directory tree
fn count_json_files(dir: &std::path::Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .count()
}

/// Imports local data into a running remote deployment
pub struct DataImporter<'a> {
    settings: &'a Settings,
}

impl<'a> DataImporter<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Import a local directory tree into the remote output tree.
    ///
    /// `local_path` defaults to the conventional local output directory when
    /// the caller passes `None`.
    pub fn import(&self, host: &RemoteHost, local_path: Option<&Utf8Path>) -> Result<()> {
        let local = local_path.unwrap_or(&self.settings.local.output_dir);

        if !local.is_dir() {
            return Err(Error::precondition(
                format!("Local data path '{}' does not exist", local),
                "Pass an existing directory: ncdeploy import-data <host> <path>",
            ));
        }

        runtime::require_tools(&["ssh", "scp", "tar"])?;
        host.probe()?;

        let remote_runtime = runtime::require_remote(host)?;

        if !setup::layout_exists(host, self.settings)? {
            return Err(Error::precondition(
                format!("Remote layout missing on {}", host.target()),
                format!("Run setup first: ncdeploy setup {}", host.target()),
            ));
        }

        // Imports are validated against a live service, not a stopped one
        let controller = LifecycleController::new(host, remote_runtime, self.settings);
        let state = controller.status()?;
        if state != InstanceState::Running {
            return Err(Error::precondition(
                format!(
                    "Container '{}' is not running on {} (state: {})",
                    self.settings.remote.container,
                    host.target(),
                    state
                ),
                format!("Start it first: ncdeploy start {}", host.target()),
            ));
        }

        let classes = classify_bundle(local)?;

        let bundle = self.package(local)?;
        let remote_staging = self.settings.remote_data_path(BUNDLE_FILE_NAME);
        host.upload(bundle.path(), &remote_staging)?;

        let remote_bundle = format!("{}/data/{}", self.settings.remote_root(), BUNDLE_FILE_NAME);
        let script = format!(
            "tar -xzf {} -C {}/output",
            remote_bundle,
            self.settings.remote_root()
        );
        let output = host.exec(&script)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::import(
                format!(
                    "Failed to extract bundle on {}: {}",
                    host.target(),
                    stderr.trim()
                ),
                "Check remote disk space and permissions under the output directory",
            ));
        }

        // Staging copy removal is best-effort
        let script = format!("rm -f {}", remote_bundle);
        match host.exec(&script) {
            Ok(output) if output.status.success() => {}
            Ok(_) | Err(_) => {
                tracing::warn!(host = host.target(), "Could not remove remote staging bundle");
            }
        }

        self.report(host, local, &classes);
        Ok(())
    }

    /// Package the local tree so extraction lands its contents directly
    /// under the remote output directory.
    fn package(&self, local: &Utf8Path) -> Result<TempArtifact> {
        let bundle = TempArtifact::new(BUNDLE_LOCAL_PATH.into());
        tracing::info!(src = %local, bundle = %bundle.path(), "Packaging import bundle");

        let status = Command::new("tar")
            .args(["-czf", bundle.path().as_str(), "-C", local.as_str(), "."])
            .status()?;

        if !status.success() {
            return Err(Error::import(
                format!("Failed to package '{}'", local),
                "Check read permissions and free space under /tmp",
            ));
        }

        Ok(bundle)
    }

    fn report(&self, host: &RemoteHost, local: &Utf8Path, classes: &[ClassifiedDir]) {
        if classes.is_empty() {
            tracing::info!(
                host = host.target(),
                src = %local,
                "Imported bundle without a recognized classification; inspect it with: \
                 ssh {} 'ls -R {}/output'",
                host.target(),
                self.settings.remote_root()
            );
            return;
        }

        for entry in classes {
            tracing::info!(
                host = host.target(),
                classification = %entry.class,
                json_files = entry.json_files,
                "Imported {} JSON file(s) into {}",
                entry.json_files,
                entry.class
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn utf8(path: &std::path::Path) -> Utf8PathBuf {
        Utf8PathBuf::try_from(path.to_path_buf()).unwrap()
    }

    #[test]
    fn test_classifies_reports_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = utf8(temp_dir.path());
        std::fs::create_dir_all(root.join("reports/acme")).unwrap();
        std::fs::write(root.join("reports/acme/2026-01-01.json"), "{}").unwrap();
        std::fs::write(root.join("reports/summary.json"), "{}").unwrap();
        std::fs::write(root.join("reports/notes.txt"), "n/a").unwrap();

        let classes = classify_bundle(&root).unwrap();

        assert_eq!(
            classes,
            vec![ClassifiedDir {
                class: Classification::Reports,
                json_files: 2
            }]
        );
    }

    #[test]
    fn test_classifies_mixed_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = utf8(temp_dir.path());
        std::fs::create_dir_all(root.join("collected")).unwrap();
        std::fs::create_dir_all(root.join("verdicts")).unwrap();
        std::fs::create_dir_all(root.join("scratch")).unwrap();
        std::fs::write(root.join("collected/a.json"), "{}").unwrap();
        std::fs::write(root.join("verdicts/v.json"), "{}").unwrap();
        std::fs::write(root.join("scratch/x.json"), "{}").unwrap();

        let classes = classify_bundle(&root).unwrap();

        let names: Vec<_> = classes.iter().map(|c| c.class.dir_name()).collect();
        assert_eq!(names, vec!["collected", "verdicts"]);
        assert!(classes.iter().all(|c| c.json_files == 1));
    }

    #[test]
    fn test_unrecognized_tree_is_generic() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = utf8(temp_dir.path());
        std::fs::create_dir_all(root.join("misc")).unwrap();
        std::fs::write(root.join("top-level.json"), "{}").unwrap();

        let classes = classify_bundle(&root).unwrap();
        assert!(classes.is_empty());
    }

    #[test]
    fn test_missing_local_path_is_rejected_before_any_transfer() {
        let settings = Settings::default();
        let importer = DataImporter::new(&settings);
        let host = RemoteHost::new("user@host").unwrap();

        let missing = Utf8PathBuf::from("/definitely/not/here");
        let err = importer.import(&host, Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::Precondition { .. }));
    }
}
