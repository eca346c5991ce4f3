// ABOUTME: Ordered-candidate resolution for override file bindings.
// ABOUTME: Picks the effective config file for each binding before a build starts.

use crate::config::OverrideBindingConfig;
use crate::diagnostics::{Diagnostics, Warning};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("no candidate found for {destination}: tried {tried}")]
    NoCandidate { destination: String, tried: String },

    #[error("candidate {0} must be a relative path inside the build context")]
    OutsideContext(PathBuf),
}

/// The file an override binding resolved to. `source` is relative to the
/// build context so it can be referenced from the generated build
/// instructions directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOverride {
    pub source: PathBuf,
    pub destination: String,
}

/// Resolves one binding against the build context.
///
/// Candidates are listed from the bundled default up to the most specific
/// operator override; the last candidate present wins. Presence alone
/// decides: an empty override file still beats the shipped example. A
/// candidate that exists but is not a regular file is skipped with a
/// warning. Resolution reads the filesystem fresh on every call, so edits
/// between runs always take effect.
pub fn resolve_binding(
    context_dir: &Path,
    binding: &OverrideBindingConfig,
    diagnostics: &Diagnostics,
) -> Result<ResolvedOverride, OverrideError> {
    let mut skipped_unusable: Option<&Path> = None;

    for candidate in binding.candidates.iter().rev() {
        validate_candidate(candidate)?;

        let path = context_dir.join(candidate);
        if path.is_file() {
            if let Some(unusable) = skipped_unusable {
                diagnostics.warn(Warning::override_fallback(format!(
                    "{} is not a regular file; using {} for {}",
                    unusable.display(),
                    candidate.display(),
                    binding.destination,
                )));
            }
            tracing::debug!(
                source = %candidate.display(),
                destination = %binding.destination,
                "resolved override binding"
            );
            return Ok(ResolvedOverride {
                source: candidate.clone(),
                destination: binding.destination.clone(),
            });
        }

        if path.exists() {
            skipped_unusable = Some(candidate);
        }
    }

    let tried = binding
        .candidates
        .iter()
        .map(|c| c.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    Err(OverrideError::NoCandidate {
        destination: binding.destination.clone(),
        tried,
    })
}

/// Resolves every binding of a service, in declaration order.
pub fn resolve_all(
    context_dir: &Path,
    bindings: &[OverrideBindingConfig],
    diagnostics: &Diagnostics,
) -> Result<Vec<ResolvedOverride>, OverrideError> {
    bindings
        .iter()
        .map(|binding| resolve_binding(context_dir, binding, diagnostics))
        .collect()
}

fn validate_candidate(candidate: &Path) -> Result<(), OverrideError> {
    if candidate.is_absolute() {
        return Err(OverrideError::OutsideContext(candidate.to_path_buf()));
    }
    if candidate
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(OverrideError::OutsideContext(candidate.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nonempty::NonEmpty;
    use std::fs;

    fn binding(candidates: &[&str], destination: &str) -> OverrideBindingConfig {
        let paths: Vec<PathBuf> = candidates.iter().map(PathBuf::from).collect();
        OverrideBindingConfig {
            candidates: NonEmpty::from_vec(paths).expect("at least one candidate"),
            destination: destination.to_string(),
        }
    }

    #[test]
    fn override_beats_bundled_example_when_both_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("system.txt.example"), "example").expect("write");
        fs::write(dir.path().join("system.txt"), "customized").expect("write");

        let resolved = resolve_binding(
            dir.path(),
            &binding(&["system.txt.example", "system.txt"], "/app/system.txt"),
            &Diagnostics::new(),
        )
        .expect("resolves");

        assert_eq!(resolved.source, PathBuf::from("system.txt"));
        let content = fs::read_to_string(dir.path().join(&resolved.source)).expect("read");
        assert_eq!(content, "customized");
    }

    #[test]
    fn missing_override_falls_back_to_example_without_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("system.txt.example"), "example").expect("write");

        let diagnostics = Diagnostics::new();
        let resolved = resolve_binding(
            dir.path(),
            &binding(&["system.txt.example", "system.txt"], "/app/system.txt"),
            &diagnostics,
        )
        .expect("falls back");

        assert_eq!(resolved.source, PathBuf::from("system.txt.example"));
        assert!(!diagnostics.has_warnings());
    }

    #[test]
    fn empty_override_file_still_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("ignore.example"), "*.wav\n").expect("write");
        fs::write(dir.path().join("ignore"), "").expect("write");

        let resolved = resolve_binding(
            dir.path(),
            &binding(&["ignore.example", "ignore"], "/app/.ignore"),
            &Diagnostics::new(),
        )
        .expect("resolves");

        assert_eq!(resolved.source, PathBuf::from("ignore"));
    }

    #[test]
    fn no_existing_candidate_names_the_destination() {
        let dir = tempfile::tempdir().expect("tempdir");

        let err = resolve_binding(
            dir.path(),
            &binding(&["missing.example", "missing"], "/app/missing.txt"),
            &Diagnostics::new(),
        )
        .expect_err("nothing to resolve");

        let message = err.to_string();
        assert!(message.contains("/app/missing.txt"));
        assert!(message.contains("missing.example"));
    }

    #[test]
    fn absolute_candidate_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");

        let err = resolve_binding(
            dir.path(),
            &binding(&["/etc/passwd"], "/app/pw"),
            &Diagnostics::new(),
        )
        .expect_err("absolute path");

        assert!(matches!(err, OverrideError::OutsideContext(_)));
    }

    #[test]
    fn parent_traversal_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");

        let err = resolve_binding(
            dir.path(),
            &binding(&["../outside.txt"], "/app/outside"),
            &Diagnostics::new(),
        )
        .expect_err("traversal");

        assert!(matches!(err, OverrideError::OutsideContext(_)));
    }

    #[test]
    fn directory_candidate_is_skipped_with_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("config.example"), "example").expect("write");
        fs::create_dir(dir.path().join("config")).expect("mkdir");

        let diagnostics = Diagnostics::new();
        let resolved = resolve_binding(
            dir.path(),
            &binding(&["config.example", "config"], "/app/config"),
            &diagnostics,
        )
        .expect("falls back past the directory");

        assert_eq!(resolved.source, PathBuf::from("config.example"));
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn repeated_resolution_selects_the_same_candidate() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("system.txt.example"), "example").expect("write");
        fs::write(dir.path().join("system.txt"), "customized").expect("write");
        let binding = binding(&["system.txt.example", "system.txt"], "/app/system.txt");

        let first = resolve_binding(dir.path(), &binding, &Diagnostics::new()).expect("resolves");
        let second = resolve_binding(dir.path(), &binding, &Diagnostics::new()).expect("resolves");

        assert_eq!(first, second);
    }

    #[test]
    fn bindings_resolve_in_declaration_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.example"), "a").expect("write");
        fs::write(dir.path().join("b.example"), "b").expect("write");

        let resolved = resolve_all(
            dir.path(),
            &[
                binding(&["a.example", "a"], "/app/a"),
                binding(&["b.example", "b"], "/app/b"),
            ],
            &Diagnostics::new(),
        )
        .expect("resolves");

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].destination, "/app/a");
        assert_eq!(resolved[1].destination, "/app/b");
    }
}
