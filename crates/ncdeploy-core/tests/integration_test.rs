//! Integration tests for local bootstrap and import classification

use camino::Utf8PathBuf;
use ncdeploy_core::import::{classify_bundle, Classification};
use ncdeploy_core::local::LocalOrchestrator;
use ncdeploy_core::Settings;

fn utf8_root(temp: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp path should be valid UTF-8")
}

#[test]
fn test_bootstrap_then_classify_own_output_tree() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8_root(&temp);
    let settings = Settings::default();

    let orchestrator = LocalOrchestrator::new(&settings, root.clone());
    orchestrator.bootstrap().expect("bootstrap should succeed");

    // The bootstrapped output tree carries all three classifications
    let output_dir = root.join("output");
    std::fs::write(output_dir.join("collected/twitter.json"), "[]").unwrap();
    std::fs::write(output_dir.join("reports/acme.json"), "{}").unwrap();

    let classes = classify_bundle(&output_dir).expect("classification should succeed");
    let names: Vec<_> = classes.iter().map(|c| c.class).collect();
    assert_eq!(
        names,
        vec![
            Classification::Collected,
            Classification::Reports,
            Classification::Verdicts
        ]
    );

    let collected = classes
        .iter()
        .find(|c| c.class == Classification::Collected)
        .unwrap();
    assert_eq!(collected.json_files, 1);

    let verdicts = classes
        .iter()
        .find(|c| c.class == Classification::Verdicts)
        .unwrap();
    assert_eq!(verdicts.json_files, 0);
}

#[test]
fn test_bootstrap_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8_root(&temp);
    let settings = Settings::default();

    let orchestrator = LocalOrchestrator::new(&settings, root.clone());
    orchestrator.bootstrap().unwrap();

    // Operator fills in credentials
    let config = root.join("config/config.yaml");
    std::fs::write(&config, "twitter:\n  bearer_token: \"token\"\n").unwrap();

    // A second bootstrap must keep the operator's configuration
    orchestrator.bootstrap().unwrap();
    let content = std::fs::read_to_string(&config).unwrap();
    assert!(content.contains("token"));
}

#[test]
fn test_settings_drive_layout_paths() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8_root(&temp);

    std::fs::write(
        root.join("ncdeploy.toml"),
        "[local]\noutput_dir = \"exports\"\n",
    )
    .unwrap();

    let settings = Settings::load(&root).unwrap();
    let orchestrator = LocalOrchestrator::new(&settings, root.clone());
    orchestrator.bootstrap().unwrap();

    assert!(root.join("exports/collected").is_dir());
    assert!(!root.join("output").exists());
}
