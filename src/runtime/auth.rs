// ABOUTME: Fallback registry credentials from the local docker config.
// ABOUTME: Reads config.json auths entries; credential helpers are not consulted.

use super::traits::RegistryAuth;
use base64::Engine;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct DockerConfigFile {
    #[serde(default)]
    auths: HashMap<String, AuthEntry>,
}

#[derive(Debug, Deserialize)]
struct AuthEntry {
    auth: Option<String>,
}

/// Looks up stored credentials for `server` in the local docker config
/// (`$DOCKER_CONFIG/config.json` or `~/.docker/config.json`).
///
/// Used only when the manifest declares no credentials. Returns `None` when
/// the config is absent, unparsable, or has no usable entry. Credential
/// helpers are not invoked; operators relying on one should declare
/// credentials in the manifest instead.
pub fn stored_credentials(server: &str) -> Option<RegistryAuth> {
    stored_credentials_in(&default_config_path()?, server)
}

pub(crate) fn stored_credentials_in(config_path: &Path, server: &str) -> Option<RegistryAuth> {
    if !config_path.is_file() {
        tracing::debug!("no docker config at {}", config_path.display());
        return None;
    }

    let content = std::fs::read_to_string(config_path).ok()?;
    let config: DockerConfigFile = match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::debug!("unparsable docker config at {}: {}", config_path.display(), e);
            return None;
        }
    };

    for key in lookup_keys(server) {
        if let Some(entry) = config.auths.get(&key)
            && let Some(auth_b64) = &entry.auth
            && let Some(credentials) = decode_auth(auth_b64, server)
        {
            tracing::debug!("found stored credentials for {} under {}", server, key);
            return Some(credentials);
        }
    }

    None
}

fn default_config_path() -> Option<PathBuf> {
    let dir = match std::env::var("DOCKER_CONFIG") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => dirs::home_dir()?.join(".docker"),
    };
    Some(dir.join("config.json"))
}

/// Docker Hub entries are stored under the legacy index URL, so the lookup
/// tries the aliases too.
fn lookup_keys(server: &str) -> Vec<String> {
    if server == "docker.io" {
        vec![
            "docker.io".to_string(),
            "https://index.docker.io/v1/".to_string(),
            "index.docker.io".to_string(),
        ]
    } else {
        vec![server.to_string(), format!("https://{server}")]
    }
}

fn decode_auth(auth_b64: &str, server: &str) -> Option<RegistryAuth> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(auth_b64)
        .ok()?;
    let auth_str = String::from_utf8(decoded).ok()?;
    let (username, password) = auth_str.split_once(':')?;

    Some(RegistryAuth {
        username: username.to_string(),
        password: password.to_string(),
        server: Some(server.to_string()),
    })
}
