// ABOUTME: Application-wide error types for gantry.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("manifest file not found in {0}")]
    ManifestNotFound(PathBuf),

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("container runtime unavailable: {0}")]
    Runtime(String),

    #[error("release failed for: {}", failed.join(", "))]
    ReleaseFailed { failed: Vec<String> },

    #[error(transparent)]
    Input(#[from] crate::types::ReleaseInputError),

    #[error(transparent)]
    Prepare(#[from] crate::build::PrepareError),

    #[error(transparent)]
    Release(#[from] crate::release::ReleaseError),

    #[error(transparent)]
    Gate(#[from] crate::gate::GateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
