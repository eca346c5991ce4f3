// ABOUTME: Error types for the preflight gate.
// ABOUTME: Separates failed verdicts from problems reaching the tree at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("preflight checks failed: {}", failed.join(", "))]
    ChecksFailed { failed: Vec<String> },

    #[error("failed to walk project tree: {0}")]
    Walk(#[from] std::io::Error),
}
