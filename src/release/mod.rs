// ABOUTME: Release orchestration using the type state pattern.
// ABOUTME: Exports the per-service pipeline, the parallel orchestrator, and reports.

mod error;
mod orchestrator;
mod pipeline;
mod report;
mod state;

pub use error::ReleaseError;
pub use orchestrator::{ReleaseOrchestrator, RunSettings};
pub use pipeline::ServiceBuild;
pub use report::{BuildArtifact, ReleaseReport, ServiceOutcome, ServiceStatus};
pub use state::{Built, Pending, Pushed};
