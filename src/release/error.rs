// ABOUTME: Error types for release pipeline stages.
// ABOUTME: Every variant names the failing service so reports stay attributable.

use crate::types::ServiceName;

/// Errors that can occur while releasing a single service.
///
/// Each variant carries the service name; outside of `InvalidTag` (which is
/// raised before any build starts) these errors terminate one service
/// without touching the others.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    /// The tag prefix and version do not combine into a valid registry tag.
    #[error("cannot assemble release tag for service {service}: {reason}")]
    InvalidTag { service: ServiceName, reason: String },

    /// Override resolution, build-arg resolution, or context packing failed.
    #[error("failed to prepare build for service {service}: {reason}")]
    PrepareFailed { service: ServiceName, reason: String },

    /// The image build failed. Failing install steps surface here, since
    /// they run as build steps inside the engine.
    #[error("build failed for service {service}: {reason}")]
    BuildFailed { service: ServiceName, reason: String },

    /// The built image could not be tagged for the registry.
    #[error("failed to tag image for service {service}: {reason}")]
    TagFailed { service: ServiceName, reason: String },

    /// The push failed after exhausting its retry attempts.
    #[error("push failed for service {service} after {attempts} attempt(s): {reason}")]
    PushFailed {
        service: ServiceName,
        attempts: u32,
        reason: String,
    },
}

impl ReleaseError {
    /// The service this error belongs to.
    pub fn service(&self) -> &ServiceName {
        match self {
            ReleaseError::InvalidTag { service, .. }
            | ReleaseError::PrepareFailed { service, .. }
            | ReleaseError::BuildFailed { service, .. }
            | ReleaseError::TagFailed { service, .. }
            | ReleaseError::PushFailed { service, .. } => service,
        }
    }
}
