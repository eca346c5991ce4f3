// ABOUTME: Diagnostics accumulator for non-fatal warnings during a release run.
// ABOUTME: Shared across concurrent service tasks; flushed once the run settles.

use parking_lot::Mutex;

/// Collects non-fatal warnings during release operations.
///
/// Service builds run concurrently, so the accumulator is internally locked
/// and can be shared behind an `Arc`.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Mutex<Vec<Warning>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.lock().push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.lock().clone()
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.lock().is_empty()
    }
}

/// A non-fatal warning collected during a release run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A push attempt failed and was retried.
    pub fn push_retried(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::PushRetried,
            message: message.into(),
        }
    }

    /// An override candidate was unusable and a lower-priority one was used.
    pub fn override_fallback(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::OverrideFallback,
            message: message.into(),
        }
    }

    /// Registry credentials came from the local credential store, not the manifest.
    pub fn credential_fallback(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::CredentialFallback,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a release run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A registry push failed transiently and was retried.
    PushRetried,
    /// An override binding skipped a missing candidate.
    OverrideFallback,
    /// Credentials were resolved from the docker config store.
    CredentialFallback,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let diag = Diagnostics::default();

        diag.warn(Warning::push_retried("push attempt 1 failed"));
        diag.warn(Warning::override_fallback("candidate missing"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        let push = Warning::push_retried("test");
        assert_eq!(push.kind, WarningKind::PushRetried);

        let fallback = Warning::override_fallback("test");
        assert_eq!(fallback.kind, WarningKind::OverrideFallback);

        let creds = Warning::credential_fallback("test");
        assert_eq!(creds.kind, WarningKind::CredentialFallback);
    }

    #[test]
    fn diagnostics_is_shareable_across_tasks() {
        use std::sync::Arc;

        let diag = Arc::new(Diagnostics::default());
        let clone = Arc::clone(&diag);
        clone.warn(Warning::push_retried("from a task"));

        assert_eq!(diag.warnings().len(), 1);
    }
}
