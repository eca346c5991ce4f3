// ABOUTME: Local runtime detection across Docker and Podman sockets.
// ABOUTME: Honors DOCKER_HOST first, then probes well-known socket paths.

use super::types::{RuntimeInfo, RuntimeType};
use std::path::Path;

/// Error during runtime detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container runtime found (checked DOCKER_HOST and Docker/Podman sockets)")]
    NoRuntimeFound,

    #[error("unsupported DOCKER_HOST value {0:?}: only unix:// sockets are supported")]
    UnsupportedHost(String),
}

const DOCKER_SOCKET: &str = "/var/run/docker.sock";
const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";

/// Detect the container runtime on the local system.
///
/// Detection order:
/// 1. `DOCKER_HOST` environment variable (unix:// sockets only)
/// 2. Docker socket (`/var/run/docker.sock`)
/// 3. Rootful Podman socket (`/run/podman/podman.sock`)
/// 4. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
pub fn detect_local() -> Result<RuntimeInfo, DetectionError> {
    if let Ok(host) = std::env::var("DOCKER_HOST")
        && !host.is_empty()
    {
        let Some(path) = host.strip_prefix("unix://") else {
            return Err(DetectionError::UnsupportedHost(host));
        };
        return Ok(RuntimeInfo {
            runtime_type: RuntimeType::Docker,
            socket_path: path.to_string(),
        });
    }

    if Path::new(DOCKER_SOCKET).exists() {
        return Ok(RuntimeInfo {
            runtime_type: RuntimeType::Docker,
            socket_path: DOCKER_SOCKET.to_string(),
        });
    }

    if Path::new(ROOTFUL_PODMAN).exists() {
        return Ok(RuntimeInfo {
            runtime_type: RuntimeType::Podman,
            socket_path: ROOTFUL_PODMAN.to_string(),
        });
    }

    if let Some(uid) = get_uid() {
        let rootless_socket = format!("/run/user/{}/podman/podman.sock", uid);
        if Path::new(&rootless_socket).exists() {
            return Ok(RuntimeInfo {
                runtime_type: RuntimeType::Podman,
                socket_path: rootless_socket,
            });
        }
    }

    Err(DetectionError::NoRuntimeFound)
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        // Fall back to reading /proc/self/status
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}
