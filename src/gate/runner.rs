// ABOUTME: Sequential execution of preflight checks against the project tree.
// ABOUTME: Fixers run before their check so rewritten files are what gets judged.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use nonempty::NonEmpty;
use serde::Serialize;
use tokio::process::Command;

use crate::config::{CheckConfig, GateManifest};

use super::walk::collect_files;
use super::GateError;

/// Outcome of a single check, with captured output for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    /// True when a fix command ran cleanly before the check.
    pub fixed: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

/// Combined verdict over every configured check.
#[derive(Debug, Clone, Serialize)]
pub struct GateReport {
    pub checks: Vec<CheckResult>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl GateReport {
    /// The gate passes only when every check passed.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn failing_checks(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter(|check| !check.passed)
            .map(|check| check.name.clone())
            .collect()
    }
}

/// Run every configured check against the files under `root`.
///
/// Checks run one at a time in manifest order: a fix command may rewrite
/// files that a later check reads. Exclusions are applied once, up front,
/// so no excluded path is ever handed to any command.
pub async fn run_gate(root: &Path, gate: &GateManifest) -> Result<GateReport, GateError> {
    let started = Instant::now();
    let files = collect_files(root, &gate.exclude)?;
    tracing::debug!(
        files = files.len(),
        checks = gate.checks.len(),
        "running preflight gate"
    );

    let mut results = Vec::with_capacity(gate.checks.len());
    for check in &gate.checks {
        let result = run_check(root, check, &files).await;
        tracing::debug!(
            check = %result.name,
            passed = result.passed,
            exit_code = result.exit_code,
            "check finished"
        );
        results.push(result);
    }

    Ok(GateReport {
        checks: results,
        duration: started.elapsed(),
    })
}

async fn run_check(root: &Path, check: &CheckConfig, all_files: &[PathBuf]) -> CheckResult {
    let started = Instant::now();
    let files = matching_files(check, all_files);

    // A check with nothing to look at passes without running; invoking the
    // tool bare could make it scan the tree and see excluded files.
    if files.is_empty() {
        return CheckResult {
            name: check.name.clone(),
            passed: true,
            fixed: false,
            exit_code: 0,
            stdout: "no matching files".to_string(),
            stderr: String::new(),
            duration: started.elapsed(),
        };
    }

    let mut fixed = false;
    if let Some(fix) = &check.fix_command {
        let outcome = exec(root, fix, &files, check.timeout).await;
        fixed = outcome.exit_code == 0;
        if !fixed {
            tracing::warn!(
                check = %check.name,
                exit_code = outcome.exit_code,
                stderr = %outcome.stderr,
                "fix command failed, checking the tree as-is"
            );
        }
    }

    let outcome = exec(root, &check.command, &files, check.timeout).await;
    CheckResult {
        name: check.name.clone(),
        passed: outcome.exit_code == 0,
        fixed,
        exit_code: outcome.exit_code,
        stdout: outcome.stdout,
        stderr: outcome.stderr,
        duration: started.elapsed(),
    }
}

/// Filter the walked files down to the extensions this check cares about.
/// No extension list means the check sees every file.
fn matching_files<'a>(check: &CheckConfig, all_files: &'a [PathBuf]) -> Vec<&'a Path> {
    let Some(extensions) = &check.extensions else {
        return all_files.iter().map(PathBuf::as_path).collect();
    };
    all_files
        .iter()
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    extensions
                        .iter()
                        .any(|want| want.trim_start_matches('.') == ext)
                })
        })
        .map(PathBuf::as_path)
        .collect()
}

struct ExecOutcome {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

/// Spawn one command with the file list appended, bounded by the check
/// timeout. Failures to spawn or finish fold into a failed outcome so a
/// broken tool reads like a failed check rather than aborting the gate.
async fn exec(
    root: &Path,
    argv: &NonEmpty<String>,
    files: &[&Path],
    limit: Duration,
) -> ExecOutcome {
    let mut command = Command::new(&argv.head);
    command
        .args(&argv.tail)
        .args(files)
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ExecOutcome {
                exit_code: -1,
                stdout: String::new(),
                stderr: format!("failed to spawn {}: {e}", argv.head),
            }
        }
    };

    match tokio::time::timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => ExecOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
        Ok(Err(e)) => ExecOutcome {
            exit_code: -1,
            stdout: String::new(),
            stderr: format!("failed to collect output: {e}"),
        },
        Err(_) => ExecOutcome {
            exit_code: -1,
            stdout: String::new(),
            stderr: format!("timed out after {}", humantime::format_duration(limit)),
        },
    }
}
