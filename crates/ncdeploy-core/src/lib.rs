//! ncdeploy-core - Core library for ncdeploy
//!
//! This crate provides the deployment machinery for the newscollector
//! service, including:
//! - Container runtime detection (podman preferred over docker)
//! - SSH connectivity probing and file transfer
//! - The build-save-transfer-load-run deployment pipeline
//! - Idempotent container lifecycle control (start/stop/status)
//! - Data import into a running remote deployment
//! - Local execution strategies (compose, standalone compose, host)

pub mod appconfig;
pub mod artifact;
pub mod compose;
pub mod deploy;
pub mod error;
pub mod import;
pub mod lifecycle;
pub mod local;
pub mod remote;
pub mod runtime;
pub mod settings;
pub mod setup;
pub mod state;

pub use error::{Error, Result};
pub use settings::Settings;
