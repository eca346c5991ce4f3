// ABOUTME: Preflight gate running configured lint and hygiene checks.
// ABOUTME: Walks the tree once, filters per check, and collects a combined verdict.

mod error;
mod runner;
mod walk;

pub use error::GateError;
pub use runner::{run_gate, CheckResult, GateReport};
pub use walk::collect_files;
