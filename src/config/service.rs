// ABOUTME: Per-service build configuration - base image, install steps,
// ABOUTME: override bindings, and the entrypoint baked into the image.

use crate::types::{ImageRef, ImageTag, ServiceName};
use nonempty::NonEmpty;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::PathBuf;

use super::env_value::EnvValue;

/// One buildable service. Each service produces one image per release,
/// tagged `<prefix>-<version>` in the shared repository.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceManifest {
    #[serde(deserialize_with = "deserialize_service_name")]
    pub name: ServiceName,
    /// Image the build starts from, e.g. `python:3.12-slim`.
    #[serde(deserialize_with = "super::deserialize_image_ref")]
    pub base_image: ImageRef,
    /// Build context directory, relative to the manifest.
    pub context: PathBuf,
    /// Shell commands run before the source copy, in order. Opaque to the
    /// orchestrator; a failing step fails this service's build only.
    #[serde(default)]
    pub install: Vec<String>,
    #[serde(default = "default_workdir")]
    pub workdir: String,
    /// Override file bindings, applied after the source copy.
    #[serde(default)]
    pub overrides: Vec<OverrideBindingConfig>,
    #[serde(deserialize_with = "deserialize_entrypoint")]
    pub entrypoint: NonEmpty<String>,
    /// Default arguments for the entrypoint, overridable at `docker run`.
    #[serde(default)]
    pub args: Vec<String>,
    /// Tag prefix for this service's images. Defaults to the service name.
    #[serde(default, deserialize_with = "deserialize_tag_prefix")]
    pub tag_prefix: Option<String>,
    /// Extra build arguments beyond the version pair, resolved per run.
    #[serde(default)]
    pub build_args: HashMap<String, EnvValue>,
}

impl ServiceManifest {
    pub fn tag_prefix(&self) -> &str {
        self.tag_prefix.as_deref().unwrap_or(self.name.as_str())
    }
}

fn default_workdir() -> String {
    "/app".to_string()
}

/// Binds a config file into the image. Candidates are listed from the
/// bundled default up to the most specific operator override; the last
/// candidate that exists in the build context wins. The first candidate is
/// expected to ship with the source tree so resolution always produces a
/// file.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideBindingConfig {
    #[serde(deserialize_with = "deserialize_candidates")]
    pub candidates: NonEmpty<PathBuf>,
    /// Absolute path inside the image the chosen file is copied to.
    pub destination: String,
}

fn deserialize_service_name<'de, D>(deserializer: D) -> Result<ServiceName, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    ServiceName::new(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_entrypoint<'de, D>(deserializer: D) -> Result<NonEmpty<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<String>::deserialize(deserializer)?;
    NonEmpty::from_vec(items)
        .ok_or_else(|| serde::de::Error::custom("entrypoint must have at least one element"))
}

fn deserialize_candidates<'de, D>(deserializer: D) -> Result<NonEmpty<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<PathBuf>::deserialize(deserializer)?;
    NonEmpty::from_vec(items)
        .ok_or_else(|| serde::de::Error::custom("candidates must have at least one path"))
}

fn deserialize_tag_prefix<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(prefix) => {
            ImageTag::new(&prefix).map_err(serde::de::Error::custom)?;
            Ok(Some(prefix))
        }
        None => Ok(None),
    }
}
