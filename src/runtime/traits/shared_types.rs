// ABOUTME: Shared types used across runtime trait definitions.
// ABOUTME: BuildRequest parameters and RegistryAuth credentials.

use crate::types::ServiceName;
use std::collections::HashMap;

/// Parameters for one image build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Service the build belongs to; used to attribute output and failures.
    pub service: ServiceName,
    /// Entry name of the build instructions inside the context archive.
    pub dockerfile_name: String,
    /// Build arguments threaded into the build.
    pub build_args: HashMap<String, String>,
    /// Labels applied to the built image.
    pub labels: HashMap<String, String>,
    /// Disable layer caching for this build.
    pub nocache: bool,
}

/// Registry authentication credentials.
#[derive(Debug, Clone)]
pub struct RegistryAuth {
    /// Username.
    pub username: String,
    /// Password or API token.
    pub password: String,
    /// Registry server (e.g., "ghcr.io"). None means the default registry.
    pub server: Option<String>,
}
