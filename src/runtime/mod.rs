// ABOUTME: Container runtime layer - detection, connection, and image ops.
// ABOUTME: Speaks the Docker-compatible API; Podman sockets work unchanged.

mod auth;
mod bollard;
mod detection;
mod error;
pub mod fakes;
mod traits;
mod types;

pub use auth::stored_credentials;
pub use bollard::{BollardRuntime, ConnectionError};
pub use detection::{DetectionError, detect_local};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use traits::{BuildRequest, ImageError, ImageOps, RegistryAuth};
pub use types::{RuntimeInfo, RuntimeType};

/// Detects the local runtime, connects, and verifies it answers.
pub async fn connect() -> Result<BollardRuntime, RuntimeError> {
    let info = detect_local()?;
    tracing::debug!(
        runtime = %info.runtime_type,
        socket = %info.socket_path,
        "connecting to container runtime"
    );

    let runtime = BollardRuntime::connect(&info)?;
    runtime.ping().await?;

    Ok(runtime)
}
