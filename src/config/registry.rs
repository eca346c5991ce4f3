// ABOUTME: Registry configuration - target repository, credentials, push policy.
// ABOUTME: Credentials resolve from the environment or the local docker config.

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;
use crate::runtime::RegistryAuth;
use crate::types::ImageRef;
use serde::Deserialize;
use std::time::Duration;

use super::env_value::EnvValue;

/// Where release images are pushed and how.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Target repository, e.g. `someuser/myapp`. Every service pushes to this
    /// repository under its own tag prefix.
    #[serde(deserialize_with = "super::deserialize_image_repository")]
    pub repository: ImageRef,
    pub username: Option<EnvValue>,
    pub api_key: Option<EnvValue>,
    #[serde(default)]
    pub push: PushPolicy,
}

/// Retry policy for pushes. Transient registry errors are retried with a
/// doubling backoff; `attempts` counts the first try.
#[derive(Debug, Clone, Deserialize)]
pub struct PushPolicy {
    #[serde(default = "default_push_attempts")]
    pub attempts: u32,
    #[serde(default = "default_push_backoff", with = "humantime_serde")]
    pub backoff: Duration,
}

impl Default for PushPolicy {
    fn default() -> Self {
        Self {
            attempts: default_push_attempts(),
            backoff: default_push_backoff(),
        }
    }
}

fn default_push_attempts() -> u32 {
    3
}

fn default_push_backoff() -> Duration {
    Duration::from_secs(2)
}

impl RegistryConfig {
    /// Resolves push credentials. Manifest-declared credentials win; when the
    /// manifest declares none, falls back to the local docker config for the
    /// target registry and records a warning so the fallback is visible.
    ///
    /// Returns `None` when no credentials are available anywhere. Pushes then
    /// go out anonymously and the registry decides.
    pub fn credentials(&self, diagnostics: &Diagnostics) -> Result<Option<RegistryAuth>> {
        if let (Some(username), Some(api_key)) = (&self.username, &self.api_key) {
            return Ok(Some(RegistryAuth {
                username: username.resolve()?,
                password: api_key.resolve()?,
                server: self.repository.registry().map(str::to_string),
            }));
        }

        let server = self.repository.registry().unwrap_or("docker.io");
        match crate::runtime::stored_credentials(server) {
            Some(creds) => {
                diagnostics.warn(Warning::credential_fallback(format!(
                    "credentials for {server} taken from the local docker config"
                )));
                Ok(Some(creds))
            }
            None => Ok(None),
        }
    }
}
