//! Error types for ncdeploy

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for ncdeploy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ncdeploy
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Connectivity error (unreachable host, missing local tool)
    #[error("Connectivity error: {message}")]
    Connectivity {
        message: String,
        #[help]
        help: String,
    },

    /// No supported container runtime found
    #[error("Runtime error: {message}")]
    Runtime {
        message: String,
        #[help]
        help: String,
    },

    /// An operation precondition was not met
    #[error("Precondition error: {message}")]
    Precondition {
        message: String,
        #[help]
        help: String,
    },

    /// Deployment error
    #[error("Deploy error: {message}")]
    Deploy {
        message: String,
        #[help]
        help: String,
    },

    /// Data import error
    #[error("Import error: {message}")]
    Import {
        message: String,
        #[help]
        help: String,
    },

    /// Local execution error
    #[error("Local run error: {message}")]
    Local {
        message: String,
        #[help]
        help: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[help]
        help: String,
    },
}

impl Error {
    /// Create a connectivity error
    pub fn connectivity(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a runtime-absence error
    pub fn runtime(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a precondition error
    pub fn precondition(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a deployment error
    pub fn deploy(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Deploy {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a data import error
    pub fn import(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Import {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a local execution error
    pub fn local(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Local {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }
}
