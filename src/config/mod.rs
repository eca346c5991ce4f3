// ABOUTME: Manifest types and parsing for gantry.yml.
// ABOUTME: Handles YAML parsing, service selection, and the init template.

mod env_value;
mod gate;
mod registry;
mod service;

pub use env_value::{EnvValue, resolve_env_map};
pub use gate::{CheckConfig, GateManifest};
pub use registry::{PushPolicy, RegistryConfig};
pub use service::{OverrideBindingConfig, ServiceManifest};

use crate::error::{Error, Result};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILENAME: &str = "gantry.yml";
pub const MANIFEST_FILENAME_ALT: &str = "gantry.yaml";
pub const MANIFEST_FILENAME_HIDDEN: &str = ".gantry.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub registry: RegistryConfig,

    #[serde(deserialize_with = "deserialize_services")]
    pub services: NonEmpty<ServiceManifest>,

    #[serde(default)]
    pub preflight: GateManifest,
}

impl Manifest {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(MANIFEST_FILENAME),
            dir.join(MANIFEST_FILENAME_ALT),
            dir.join(MANIFEST_FILENAME_HIDDEN),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ManifestNotFound(dir.to_path_buf()))
    }

    /// Selects services by name, preserving manifest order. An empty filter
    /// selects everything; a name matching no service is an error.
    pub fn select_services(&self, filter: &[String]) -> Result<Vec<&ServiceManifest>> {
        if filter.is_empty() {
            return Ok(self.services.iter().collect());
        }

        for name in filter {
            if !self.services.iter().any(|s| s.name.as_str() == name) {
                return Err(Error::UnknownService(name.clone()));
            }
        }

        Ok(self
            .services
            .iter()
            .filter(|s| filter.iter().any(|name| s.name.as_str() == name))
            .collect())
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for service in &self.services {
            if !seen.insert(service.name.as_str()) {
                return Err(Error::InvalidManifest(format!(
                    "duplicate service name: {}",
                    service.name
                )));
            }
        }
        Ok(())
    }
}

pub fn init_manifest(dir: &Path, force: bool) -> Result<PathBuf> {
    let manifest_path = dir.join(MANIFEST_FILENAME);

    if manifest_path.exists() && !force {
        return Err(Error::AlreadyExists(manifest_path));
    }

    std::fs::write(&manifest_path, template_yaml())?;

    Ok(manifest_path)
}

fn template_yaml() -> &'static str {
    r#"# gantry release manifest
# Each service builds one image per release, tagged <prefix>-<version>
# in the shared repository below.

registry:
  repository: someuser/myapp
  # Credentials come from the environment so this file can be committed.
  username:
    env: DOCKER_USERNAME
  api_key:
    env: DOCKER_API_KEY
  # push:
  #   attempts: 3
  #   backoff: 2s

services:
  - name: api
    base_image: python:3.12-slim
    context: ./api
    install:
      - pip install --no-cache-dir -r requirements.txt
    # Config files baked into the image after the source copy. Candidates
    # are tried from the bundled default up; the last one present in the
    # context wins, so a local override beats the shipped example.
    overrides:
      - candidates:
          - prompts/system.txt.example
          - prompts/system.txt
        destination: /app/prompts/system.txt
    entrypoint: ["./entrypoint.sh"]
    args: ["serve"]

  - name: web
    base_image: node:22-slim
    context: ./web
    install:
      - npm ci
      - npm run build
    entrypoint: ["node", "server.js"]

# Checks that must pass before a release is triggered.
# preflight:
#   exclude:
#     - vendor
#   checks:
#     - name: format
#       command: ["ruff", "format", "--check"]
#       fix_command: ["ruff", "format"]
#       extensions: ["py"]
"#
}

// Custom deserializers

pub(crate) fn deserialize_image_ref<'de, D>(
    deserializer: D,
) -> std::result::Result<crate::types::ImageRef, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    crate::types::ImageRef::parse(&s).map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_image_repository<'de, D>(
    deserializer: D,
) -> std::result::Result<crate::types::ImageRef, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let reference = deserialize_image_ref(deserializer)?;
    if reference.tag().is_some() || reference.digest().is_some() {
        return Err(serde::de::Error::custom(
            "repository must not include a tag or digest; tags are derived per service",
        ));
    }
    Ok(reference)
}

fn deserialize_services<'de, D>(
    deserializer: D,
) -> std::result::Result<NonEmpty<ServiceManifest>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let services: Vec<ServiceManifest> = Vec::deserialize(deserializer)?;

    NonEmpty::from_vec(services)
        .ok_or_else(|| serde::de::Error::custom("at least one service is required"))
}
