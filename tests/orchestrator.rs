// ABOUTME: Integration tests for the release orchestrator against the fake runtime.
// ABOUTME: Covers fan-out, isolation, retries, concurrency bounds, and deadlines.

mod support;

use gantry::diagnostics::{Diagnostics, WarningKind};
use gantry::release::{ReleaseError, ReleaseOrchestrator, ReleaseReport, RunSettings, ServiceStatus};
use gantry::runtime::fakes::FakeRuntime;
use gantry::types::{ReleaseRun, TriggerKind};
use std::sync::Arc;
use std::time::Duration;
use support::project::{TestProject, TWO_SERVICES};

/// Same two services, but pushes retry on a millisecond backoff so the
/// retry paths run at test speed.
const TWO_SERVICES_FAST_RETRY: &str = r#"
registry:
  repository: someuser/myapp
  push:
    attempts: 3
    backoff: 1ms
services:
  - name: api
    base_image: python:3.12-slim
    context: ./api
    entrypoint: ["./entrypoint.sh"]
  - name: worker
    base_image: python:3.12-slim
    context: ./worker
    entrypoint: ["./run.sh"]
"#;

const FOUR_SERVICES: &str = r#"
registry:
  repository: someuser/myapp
services:
  - name: one
    base_image: python:3.12-slim
    context: ./svc
    entrypoint: ["run"]
  - name: two
    base_image: python:3.12-slim
    context: ./svc
    entrypoint: ["run"]
  - name: three
    base_image: python:3.12-slim
    context: ./svc
    entrypoint: ["run"]
  - name: four
    base_image: python:3.12-slim
    context: ./svc
    entrypoint: ["run"]
"#;

fn two_service_project(manifest: &str) -> TestProject {
    TestProject::new()
        .manifest(manifest)
        .context("api", &[("entrypoint.sh", "#!/bin/sh\n")])
        .context("worker", &[("run.sh", "#!/bin/sh\n")])
}

fn tag_run(tag: &str, run_number: u64) -> ReleaseRun {
    ReleaseRun::new(TriggerKind::TagPush, Some(tag.to_string()), run_number).unwrap()
}

async fn run_release(
    project: &TestProject,
    runtime: Arc<FakeRuntime>,
    settings: RunSettings,
    run: &ReleaseRun,
    diagnostics: Arc<Diagnostics>,
) -> Result<ReleaseReport, ReleaseError> {
    let manifest = project.load();
    let services = manifest.select_services(&[]).unwrap();
    ReleaseOrchestrator::new(runtime, settings)
        .run(
            project.path(),
            &manifest.registry,
            &services,
            run,
            None,
            diagnostics,
        )
        .await
}

#[tokio::test]
async fn full_run_pushes_every_service() {
    let project = two_service_project(TWO_SERVICES);
    let runtime = Arc::new(FakeRuntime::new());

    let report = run_release(
        &project,
        Arc::clone(&runtime),
        RunSettings::default(),
        &tag_run("v1.0.0", 7),
        Arc::new(Diagnostics::new()),
    )
    .await
    .unwrap();

    assert!(report.ok());
    assert_eq!(report.version.value, "v1.0.0.7");
    assert_eq!(report.services.len(), 2);
    assert!(report.services.iter().all(|s| s.digest.is_some()));

    let pushed = runtime.pushed();
    assert!(pushed.contains(&"someuser/myapp:api-v1.0.0.7".to_string()));
    assert!(pushed.contains(&"someuser/myapp:worker-v1.0.0.7".to_string()));

    let artifacts = report.artifacts();
    assert_eq!(artifacts.len(), 2);
    assert!(artifacts.iter().all(|a| a.version.value == "v1.0.0.7"));
}

#[tokio::test]
async fn every_service_builds_with_the_same_version() {
    let project = two_service_project(TWO_SERVICES);
    let runtime = Arc::new(FakeRuntime::new());

    run_release(
        &project,
        Arc::clone(&runtime),
        RunSettings::default(),
        &tag_run("v2.5.0", 42),
        Arc::new(Diagnostics::new()),
    )
    .await
    .unwrap();

    let requests = runtime.build_requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.build_args.get("VERSION").unwrap(), "v2.5.0.42");
        assert_eq!(request.build_args.get("BUILD_NUM").unwrap(), "42");
    }
}

#[tokio::test]
async fn one_failure_does_not_stop_the_others() {
    let project = two_service_project(TWO_SERVICES);
    let runtime = Arc::new(FakeRuntime::new());
    runtime.fail_builds_for("api");

    let report = run_release(
        &project,
        Arc::clone(&runtime),
        RunSettings::default(),
        &tag_run("v1.0.0", 1),
        Arc::new(Diagnostics::new()),
    )
    .await
    .unwrap();

    assert!(!report.ok());

    let api = report
        .services
        .iter()
        .find(|s| s.service.as_str() == "api")
        .unwrap();
    assert_eq!(api.status, ServiceStatus::BuildFailed);
    assert!(api.error.as_deref().unwrap().contains("api"));

    let worker = report
        .services
        .iter()
        .find(|s| s.service.as_str() == "worker")
        .unwrap();
    assert_eq!(worker.status, ServiceStatus::Pushed);

    // The failed service contributes no artifact; the pushed one stands.
    assert_eq!(runtime.pushed(), vec!["someuser/myapp:worker-v1.0.0.1"]);
    assert_eq!(report.artifacts().len(), 1);
    assert_eq!(report.failed_services().len(), 1);
    assert_eq!(report.failed_services()[0].as_str(), "api");
}

#[tokio::test]
async fn transient_push_failures_are_retried_with_warnings() {
    let project = two_service_project(TWO_SERVICES_FAST_RETRY);
    let runtime = Arc::new(FakeRuntime::new());
    runtime.fail_pushes("someuser/myapp:api-v1.0.0.1", 2);

    let diagnostics = Arc::new(Diagnostics::new());
    let report = run_release(
        &project,
        Arc::clone(&runtime),
        RunSettings::default(),
        &tag_run("v1.0.0", 1),
        Arc::clone(&diagnostics),
    )
    .await
    .unwrap();

    assert!(report.ok());
    assert_eq!(runtime.push_attempts("someuser/myapp:api-v1.0.0.1"), 3);

    let retry_warnings: Vec<_> = diagnostics
        .warnings()
        .into_iter()
        .filter(|w| w.kind == WarningKind::PushRetried)
        .collect();
    assert_eq!(retry_warnings.len(), 2);
    assert!(retry_warnings[0].message.contains("api"));
}

#[tokio::test]
async fn push_gives_up_after_the_configured_attempts() {
    let project = two_service_project(TWO_SERVICES_FAST_RETRY);
    let runtime = Arc::new(FakeRuntime::new());
    runtime.fail_pushes("someuser/myapp:api-v1.0.0.1", 99);

    let report = run_release(
        &project,
        Arc::clone(&runtime),
        RunSettings::default(),
        &tag_run("v1.0.0", 1),
        Arc::new(Diagnostics::new()),
    )
    .await
    .unwrap();

    assert!(!report.ok());
    assert_eq!(runtime.push_attempts("someuser/myapp:api-v1.0.0.1"), 3);

    let api = report
        .services
        .iter()
        .find(|s| s.service.as_str() == "api")
        .unwrap();
    assert_eq!(api.status, ServiceStatus::PushFailed);
    assert!(api.error.as_deref().unwrap().contains("after 3 attempt(s)"));

    // The image was never pushed under the failing reference.
    assert!(!runtime.pushed().contains(&"someuser/myapp:api-v1.0.0.1".to_string()));
}

#[tokio::test]
async fn concurrency_stays_within_the_parallel_bound() {
    let project = TestProject::new()
        .manifest(FOUR_SERVICES)
        .context("svc", &[("run", "#!/bin/sh\n")]);
    let runtime = Arc::new(FakeRuntime::new());
    runtime.set_build_delay(Duration::from_millis(100));

    let report = run_release(
        &project,
        Arc::clone(&runtime),
        RunSettings {
            parallel: 2,
            ..RunSettings::default()
        },
        &tag_run("v1.0.0", 1),
        Arc::new(Diagnostics::new()),
    )
    .await
    .unwrap();

    assert!(report.ok());
    assert_eq!(runtime.builds().len(), 4);
    assert!(
        runtime.max_in_flight() <= 2,
        "saw {} concurrent builds with parallel=2",
        runtime.max_in_flight()
    );
}

#[tokio::test]
async fn run_deadline_marks_unfinished_services_timed_out() {
    let project = two_service_project(TWO_SERVICES);
    let runtime = Arc::new(FakeRuntime::new());
    runtime.set_build_delay(Duration::from_secs(30));

    let report = run_release(
        &project,
        Arc::clone(&runtime),
        RunSettings {
            deadline: Some(Duration::from_millis(200)),
            ..RunSettings::default()
        },
        &tag_run("v1.0.0", 1),
        Arc::new(Diagnostics::new()),
    )
    .await
    .unwrap();

    assert!(!report.ok());
    assert_eq!(report.services.len(), 2);
    for outcome in &report.services {
        assert_eq!(outcome.status, ServiceStatus::TimedOut);
        assert!(outcome.error.as_deref().unwrap().contains("deadline"));
    }
    assert!(runtime.pushed().is_empty());
}

#[tokio::test]
async fn oversized_tag_fails_before_any_build_starts() {
    let long_prefix = "a".repeat(125);
    let manifest = format!(
        r#"
registry:
  repository: someuser/myapp
services:
  - name: api
    base_image: python:3.12-slim
    context: ./api
    entrypoint: ["run"]
    tag_prefix: {long_prefix}
"#
    );
    let project = TestProject::new()
        .manifest(&manifest)
        .context("api", &[("run", "#!/bin/sh\n")]);
    let runtime = Arc::new(FakeRuntime::new());

    let err = run_release(
        &project,
        Arc::clone(&runtime),
        RunSettings::default(),
        &ReleaseRun::new(TriggerKind::Manual, None, 1).unwrap(),
        Arc::new(Diagnostics::new()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReleaseError::InvalidTag { .. }));
    assert!(runtime.builds().is_empty());
}
