// ABOUTME: Bounded parallel fan-out of service builds and fan-in into a report.
// ABOUTME: One service failing never disturbs the others; there is no rollback.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::build;
use crate::config::{PushPolicy, RegistryConfig, ServiceManifest, resolve_env_map};
use crate::diagnostics::Diagnostics;
use crate::runtime::{ImageOps, RegistryAuth};
use crate::types::{ImageRef, ImageTag, ReleaseRun, Version};

use super::error::ReleaseError;
use super::pipeline::ServiceBuild;
use super::report::{ReleaseReport, ServiceOutcome};

/// Tunables for one release run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Maximum number of concurrent service builds.
    pub parallel: usize,
    /// Disable build layer caching.
    pub nocache: bool,
    /// Overall deadline. Services not terminal at expiry fail as timed out;
    /// anything already pushed stands.
    pub deadline: Option<Duration>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            parallel: 4,
            nocache: false,
            deadline: None,
        }
    }
}

/// Runs a release across services: the version is resolved exactly once,
/// then every service independently builds, tags, and pushes its image.
pub struct ReleaseOrchestrator<R> {
    runtime: Arc<R>,
    settings: RunSettings,
}

/// Everything one service task needs, owned so tasks share nothing mutable.
struct ServiceJob {
    manifest_dir: PathBuf,
    service: ServiceManifest,
    target: ImageRef,
    version: Version,
    auth: Option<RegistryAuth>,
    push_policy: PushPolicy,
    nocache: bool,
}

impl<R: ImageOps + 'static> ReleaseOrchestrator<R> {
    pub fn new(runtime: Arc<R>, settings: RunSettings) -> Self {
        Self { runtime, settings }
    }

    /// Release `services`, producing a per-service report.
    ///
    /// Fails fast, before any build starts, when a service's tag prefix and
    /// the resolved version cannot form a valid tag. Everything after that
    /// point is isolated per service and lands in the report instead.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::InvalidTag` for an unusable tag prefix.
    pub async fn run(
        &self,
        manifest_dir: &Path,
        registry: &RegistryConfig,
        services: &[&ServiceManifest],
        release: &ReleaseRun,
        auth: Option<RegistryAuth>,
        diagnostics: Arc<Diagnostics>,
    ) -> Result<ReleaseReport, ReleaseError> {
        let started_at = Utc::now();
        let started = Instant::now();
        let version = release.version();

        let mut planned: Vec<(ServiceManifest, ImageRef)> = Vec::with_capacity(services.len());
        for service in services {
            let tag =
                ImageTag::prefixed(service.tag_prefix(), &version.value).map_err(|e| {
                    ReleaseError::InvalidTag {
                        service: service.name.clone(),
                        reason: e.to_string(),
                    }
                })?;
            planned.push(((*service).clone(), registry.repository.with_tag(&tag)));
        }

        tracing::info!(
            version = %version,
            services = planned.len(),
            parallel = self.settings.parallel,
            "starting release run"
        );

        let semaphore = Arc::new(Semaphore::new(self.settings.parallel.max(1)));
        let mut join_set = JoinSet::new();

        for (idx, (service, target)) in planned.iter().cloned().enumerate() {
            let runtime = Arc::clone(&self.runtime);
            let semaphore = Arc::clone(&semaphore);
            let diagnostics = Arc::clone(&diagnostics);
            let job = ServiceJob {
                manifest_dir: manifest_dir.to_path_buf(),
                service,
                target,
                version: version.clone(),
                auth: auth.clone(),
                push_policy: registry.push.clone(),
                nocache: self.settings.nocache,
            };

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = run_service(runtime.as_ref(), job, &diagnostics).await;
                (idx, outcome)
            });
        }

        let mut slots: Vec<Option<ServiceOutcome>> = vec![None; planned.len()];
        let deadline_hit = match self.settings.deadline {
            Some(limit) => tokio::time::timeout(limit, drain(&mut join_set, &mut slots))
                .await
                .is_err(),
            None => {
                drain(&mut join_set, &mut slots).await;
                false
            }
        };
        if deadline_hit {
            join_set.abort_all();
        }

        let unfinished_reason = match (deadline_hit, self.settings.deadline) {
            (true, Some(limit)) => {
                format!("run deadline of {limit:?} expired before the service finished")
            }
            _ => "build task ended without reporting an outcome".to_string(),
        };

        let outcomes: Vec<ServiceOutcome> = planned
            .into_iter()
            .zip(slots)
            .map(|((service, target), slot)| {
                slot.unwrap_or_else(|| {
                    ServiceOutcome::unfinished(
                        service.name.clone(),
                        target.to_string(),
                        started.elapsed(),
                        unfinished_reason.clone(),
                    )
                })
            })
            .collect();

        let report = ReleaseReport {
            version,
            trigger: release.trigger(),
            started_at,
            host: gethostname::gethostname().to_string_lossy().into_owned(),
            services: outcomes,
            duration: started.elapsed(),
        };

        tracing::info!(
            ok = report.ok(),
            pushed = report.artifacts().len(),
            "release run finished"
        );

        Ok(report)
    }
}

/// Collect finished tasks into their slots. Panicked tasks leave their slot
/// empty; the caller reports those as unfinished.
async fn drain(
    join_set: &mut JoinSet<(usize, ServiceOutcome)>,
    slots: &mut [Option<ServiceOutcome>],
) {
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((idx, outcome)) => slots[idx] = Some(outcome),
            Err(e) if e.is_cancelled() => {}
            Err(e) => tracing::error!("service build task failed to join: {e}"),
        }
    }
}

/// Run one service from preparation through push, folding any error into a
/// terminal outcome.
async fn run_service<R: ImageOps>(
    runtime: &R,
    job: ServiceJob,
    diagnostics: &Diagnostics,
) -> ServiceOutcome {
    let started = Instant::now();
    let image_tag = job.target.to_string();

    match release_service(runtime, job, diagnostics).await {
        Ok(pushed) => ServiceOutcome::pushed(
            pushed.name().clone(),
            image_tag,
            pushed.digest().cloned(),
            started.elapsed(),
        ),
        Err(e) => {
            tracing::warn!(service = %e.service(), "service failed: {e}");
            ServiceOutcome::failed(image_tag, started.elapsed(), &e)
        }
    }
}

async fn release_service<R: ImageOps>(
    runtime: &R,
    job: ServiceJob,
    diagnostics: &Diagnostics,
) -> Result<ServiceBuild<super::state::Pushed>, ReleaseError> {
    let prepared = build::prepare(&job.manifest_dir, &job.service, diagnostics).map_err(|e| {
        ReleaseError::PrepareFailed {
            service: job.service.name.clone(),
            reason: e.to_string(),
        }
    })?;

    let build_args =
        resolve_env_map(&job.service.build_args).map_err(|e| ReleaseError::PrepareFailed {
            service: job.service.name.clone(),
            reason: e.to_string(),
        })?;

    let pending = ServiceBuild::new(
        job.service.name.clone(),
        job.version,
        job.target,
        build_args,
        job.nocache,
    );

    tracing::debug!(service = %pending.name(), target = %pending.target(), "building image");
    let built = pending.build(runtime, prepared.context).await?;

    tracing::debug!(service = %built.name(), image = %built.image().short(), "image built, publishing");
    built
        .publish(runtime, job.auth.as_ref(), &job.push_policy, diagnostics)
        .await
}
