// ABOUTME: Shared helper for connecting to the local container runtime.
// ABOUTME: Maps detection and connection failures to actionable messages.

use gantry::error::{Error, Result};
use gantry::output::Output;
use gantry::runtime::{self, BollardRuntime, RuntimeErrorKind};

/// Connect to the local container runtime.
///
/// Failures come back as a single `Error::Runtime` with a hint about what
/// to check, since a missing daemon and a misconfigured DOCKER_HOST read
/// identically from the raw error.
pub async fn connect_to_runtime(output: &Output) -> Result<BollardRuntime> {
    output.progress("  → Connecting to container runtime...");

    runtime::connect().await.map_err(|e| {
        if let Some(details) = e.connection_details() {
            tracing::debug!(details = %details, "runtime connection failed");
        }
        let hint = match e.kind() {
            RuntimeErrorKind::NoRuntimeFound => {
                "no Docker or Podman socket was found; is the daemon running?"
            }
            RuntimeErrorKind::UnsupportedHost => "DOCKER_HOST must point at a unix:// socket",
            RuntimeErrorKind::ConnectionFailed => {
                "the runtime socket exists but did not answer"
            }
        };
        Error::Runtime(format!("{e}; {hint}"))
    })
}
