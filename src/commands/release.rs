// ABOUTME: Release command - resolves one version, then builds, tags, and
// ABOUTME: pushes every selected service through the shared container runtime.

use gantry::build;
use gantry::config::{Manifest, ServiceManifest};
use gantry::diagnostics::Diagnostics;
use gantry::error::{Error, Result};
use gantry::output::{Output, OutputMode};
use gantry::release::{
    ReleaseError, ReleaseOrchestrator, ReleaseReport, RunSettings, ServiceStatus,
};
use gantry::types::{ImageTag, ReleaseRun, TriggerKind, Version};
use std::path::Path;
use std::sync::Arc;

use crate::cli::ReleaseArgs;

pub async fn release(config_path: Option<&Path>, args: ReleaseArgs, mut output: Output) -> Result<()> {
    output.start_timer();
    let (manifest, manifest_dir) = super::locate::load_manifest(config_path)?;

    // Trigger inputs are validated before anything is built; a tag push
    // without a ref name dies here, not halfway through a build.
    let trigger = TriggerKind::from_ref_type(args.ref_type.as_deref())?;
    let run = ReleaseRun::new(trigger, args.ref_name.clone(), args.run_number)?;
    let version = run.version();

    let services = manifest.select_services(&args.services)?;

    output.progress(&format!(
        "Releasing {} service(s) as {} ({} trigger)",
        services.len(),
        version,
        run.trigger()
    ));

    if args.dry_run {
        return dry_run(&manifest_dir, &manifest, &services, &version, &output);
    }

    let diagnostics = Arc::new(Diagnostics::new());
    let auth = manifest.registry.credentials(&diagnostics)?;
    if auth.is_none() {
        output.warning("no registry credentials found; pushing anonymously");
    }

    let runtime = super::runtime_connection::connect_to_runtime(&output).await?;

    let orchestrator = ReleaseOrchestrator::new(
        Arc::new(runtime),
        RunSettings {
            parallel: args.parallel,
            nocache: args.no_cache,
            deadline: args.timeout,
        },
    );
    let report = orchestrator
        .run(
            &manifest_dir,
            &manifest.registry,
            &services,
            &run,
            auth,
            Arc::clone(&diagnostics),
        )
        .await?;

    for warning in diagnostics.warnings() {
        output.warning(&warning.message);
    }
    render_report(&report, &output);

    if !report.ok() {
        return Err(Error::ReleaseFailed {
            failed: report
                .failed_services()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        });
    }

    output.success(&format!(
        "Released {} service(s) as {}",
        report.services.len(),
        version
    ));
    Ok(())
}

/// Resolve the whole plan without touching the container runtime: overrides
/// are chosen, Dockerfiles rendered, contexts packed, tags validated. What
/// gets printed is exactly what a real run would build.
fn dry_run(
    manifest_dir: &Path,
    manifest: &Manifest,
    services: &[&ServiceManifest],
    version: &Version,
    output: &Output,
) -> Result<()> {
    let diagnostics = Diagnostics::new();

    for service in services {
        let tag = ImageTag::prefixed(service.tag_prefix(), &version.value).map_err(|e| {
            ReleaseError::InvalidTag {
                service: service.name.clone(),
                reason: e.to_string(),
            }
        })?;
        let target = manifest.registry.repository.with_tag(&tag);
        let prepared = build::prepare(manifest_dir, service, &diagnostics)?;

        output.service_event(service.name.as_str(), &format!("would push {target}"));
        for resolved in &prepared.overrides {
            output.service_event(
                service.name.as_str(),
                &format!("{} <- {}", resolved.destination, resolved.source.display()),
            );
        }
    }

    for warning in diagnostics.warnings() {
        output.warning(&warning.message);
    }
    output.success("Dry run complete; nothing was built or pushed");
    Ok(())
}

fn render_report(report: &ReleaseReport, output: &Output) {
    if output.mode() == OutputMode::Json {
        if let Ok(json) = serde_json::to_string(report) {
            println!("{json}");
        }
        return;
    }

    for outcome in &report.services {
        let line = match outcome.status {
            ServiceStatus::Pushed => match &outcome.digest {
                Some(digest) => format!("pushed {} ({})", outcome.image_tag, digest.short()),
                None => format!("pushed {}", outcome.image_tag),
            },
            _ => format!(
                "{}: {}",
                outcome.status,
                outcome.error.as_deref().unwrap_or("no detail")
            ),
        };
        output.service_event(outcome.service.as_str(), &line);
    }
}
