// ABOUTME: Preflight command - runs the configured checks over the project tree.
// ABOUTME: Renders per-check verdicts and fails the run when any check fails.

use gantry::error::Result;
use gantry::gate::{run_gate, GateError, GateReport};
use gantry::output::{Output, OutputMode};
use std::path::Path;

pub async fn preflight(config_path: Option<&Path>, mut output: Output) -> Result<()> {
    output.start_timer();
    let (manifest, manifest_dir) = super::locate::load_manifest(config_path)?;

    output.progress(&format!(
        "Running {} preflight check(s)",
        manifest.preflight.checks.len()
    ));

    let report = run_gate(&manifest_dir, &manifest.preflight).await?;
    render_report(&report, &output);

    if !report.passed() {
        return Err(GateError::ChecksFailed {
            failed: report.failing_checks(),
        }
        .into());
    }

    output.success("Preflight passed");
    Ok(())
}

fn render_report(report: &GateReport, output: &Output) {
    if output.mode() == OutputMode::Json {
        if let Ok(json) = serde_json::to_string(report) {
            println!("{json}");
        }
        return;
    }

    for check in &report.checks {
        if check.passed {
            let fixed = if check.fixed { " (fixed)" } else { "" };
            output.progress(&format!("  ✓ {}{fixed}", check.name));
        } else {
            eprintln!("  ✗ {} (exit {})", check.name, check.exit_code);
            if !check.stdout.trim().is_empty() {
                eprintln!("{}", check.stdout.trim_end());
            }
            if !check.stderr.trim().is_empty() {
                eprintln!("{}", check.stderr.trim_end());
            }
        }
    }
}
