// ABOUTME: Release run report - per-service outcomes and run provenance.
// ABOUTME: Overall success drives the exit code; serializes for --json output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::types::{ImageDigest, ServiceName, TriggerKind, Version};

use super::error::ReleaseError;

/// Terminal state of one service within a release run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// The tagged image is in the registry.
    Pushed,
    /// Preparation or the image build failed.
    BuildFailed,
    /// Tagging or pushing failed, retries included.
    PushFailed,
    /// The run deadline expired before the service reached a terminal state.
    TimedOut,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Pushed => write!(f, "pushed"),
            ServiceStatus::BuildFailed => write!(f, "build failed"),
            ServiceStatus::PushFailed => write!(f, "push failed"),
            ServiceStatus::TimedOut => write!(f, "timed out"),
        }
    }
}

/// How one service ended up.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceOutcome {
    pub service: ServiceName,
    pub status: ServiceStatus,
    /// Full reference the image was (or would have been) pushed under.
    pub image_tag: String,
    /// Content digest reported by the registry, when it sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<ImageDigest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl ServiceOutcome {
    pub fn pushed(
        service: ServiceName,
        image_tag: String,
        digest: Option<ImageDigest>,
        duration: Duration,
    ) -> Self {
        Self {
            service,
            status: ServiceStatus::Pushed,
            image_tag,
            digest,
            error: None,
            duration,
        }
    }

    /// Outcome for a pipeline error; the terminal state follows the failing
    /// step (prepare and build are build-stage, tag and push are push-stage).
    pub fn failed(image_tag: String, duration: Duration, error: &ReleaseError) -> Self {
        let status = match error {
            ReleaseError::InvalidTag { .. }
            | ReleaseError::PrepareFailed { .. }
            | ReleaseError::BuildFailed { .. } => ServiceStatus::BuildFailed,
            ReleaseError::TagFailed { .. } | ReleaseError::PushFailed { .. } => {
                ServiceStatus::PushFailed
            }
        };

        Self {
            service: error.service().clone(),
            status,
            image_tag,
            digest: None,
            error: Some(error.to_string()),
            duration,
        }
    }

    /// Outcome for a service that never reached a terminal state.
    pub fn unfinished(
        service: ServiceName,
        image_tag: String,
        duration: Duration,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            service,
            status: ServiceStatus::TimedOut,
            image_tag,
            digest: None,
            error: Some(reason.into()),
            duration,
        }
    }
}

/// A successfully pushed image, as handed to downstream automation.
#[derive(Debug, Clone, Serialize)]
pub struct BuildArtifact {
    pub service_name: ServiceName,
    pub version: Version,
    pub image_tag: String,
}

/// The full record of one release run.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
    /// Version shared by every service in the run.
    pub version: Version,
    pub trigger: TriggerKind,
    pub started_at: DateTime<Utc>,
    /// Hostname of the building machine.
    pub host: String,
    pub services: Vec<ServiceOutcome>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl ReleaseReport {
    /// `true` only when every requested service was pushed.
    pub fn ok(&self) -> bool {
        self.services
            .iter()
            .all(|s| s.status == ServiceStatus::Pushed)
    }

    /// Names of services that did not reach `pushed`.
    pub fn failed_services(&self) -> Vec<&ServiceName> {
        self.services
            .iter()
            .filter(|s| s.status != ServiceStatus::Pushed)
            .map(|s| &s.service)
            .collect()
    }

    /// Artifacts for the pushed services. Failed services contribute
    /// nothing; their images may exist locally but were never published.
    pub fn artifacts(&self) -> Vec<BuildArtifact> {
        self.services
            .iter()
            .filter(|s| s.status == ServiceStatus::Pushed)
            .map(|s| BuildArtifact {
                service_name: s.service.clone(),
                version: self.version.clone(),
                image_tag: s.image_tag.clone(),
            })
            .collect()
    }
}
