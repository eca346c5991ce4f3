// ABOUTME: Build preparation - override resolution, Dockerfile rendering,
// ABOUTME: and context packing, assembled per service ahead of the image build.

pub mod context;
pub mod dockerfile;
pub mod overrides;

pub use dockerfile::DOCKERFILE_NAME;
pub use overrides::{OverrideError, ResolvedOverride};

use crate::config::ServiceManifest;
use crate::diagnostics::Diagnostics;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("build context {0} does not exist or is not a directory")]
    MissingContext(PathBuf),

    #[error(transparent)]
    Override(#[from] OverrideError),

    #[error("failed to pack build context: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the runtime needs to build one service image.
#[derive(Debug)]
pub struct PreparedBuild {
    /// Rendered build instructions, also embedded in `context`.
    pub dockerfile: String,
    /// Gzipped tar of the service's context directory.
    pub context: Vec<u8>,
    /// What each override binding resolved to, in declaration order.
    pub overrides: Vec<ResolvedOverride>,
}

/// Resolves overrides, renders the Dockerfile, and packs the context for
/// one service. Pure preparation; nothing here talks to the runtime, so a
/// failure never leaves partial state behind.
pub fn prepare(
    manifest_dir: &Path,
    service: &ServiceManifest,
    diagnostics: &Diagnostics,
) -> Result<PreparedBuild, PrepareError> {
    let context_dir = manifest_dir.join(&service.context);
    if !context_dir.is_dir() {
        return Err(PrepareError::MissingContext(context_dir));
    }

    let overrides = overrides::resolve_all(&context_dir, &service.overrides, diagnostics)?;
    let dockerfile = dockerfile::render(service, &overrides);
    let context = context::pack(&context_dir, &dockerfile)?;

    Ok(PreparedBuild {
        dockerfile,
        context,
        overrides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageRef, ServiceName};
    use nonempty::nonempty;
    use std::fs;

    fn service_with_override() -> ServiceManifest {
        ServiceManifest {
            name: ServiceName::new("api").expect("valid name"),
            base_image: ImageRef::parse("python:3.12-slim").expect("valid ref"),
            context: PathBuf::from("api"),
            install: vec![],
            workdir: "/app".to_string(),
            overrides: vec![crate::config::OverrideBindingConfig {
                candidates: nonempty![
                    PathBuf::from("system.txt.example"),
                    PathBuf::from("system.txt")
                ],
                destination: "/app/system.txt".to_string(),
            }],
            entrypoint: nonempty!["./run.sh".to_string()],
            args: vec![],
            tag_prefix: None,
            build_args: Default::default(),
        }
    }

    #[test]
    fn prepare_resolves_renders_and_packs() {
        let root = tempfile::tempdir().expect("tempdir");
        let context_dir = root.path().join("api");
        fs::create_dir(&context_dir).expect("mkdir");
        fs::write(context_dir.join("system.txt.example"), "example").expect("write");

        let prepared = prepare(root.path(), &service_with_override(), &Diagnostics::new())
            .expect("prepares");

        assert!(!prepared.context.is_empty());
        assert_eq!(prepared.overrides.len(), 1);
        assert!(
            prepared
                .dockerfile
                .contains("COPY [\"system.txt.example\", \"/app/system.txt\"]")
        );
    }

    #[test]
    fn missing_context_directory_is_an_error() {
        let root = tempfile::tempdir().expect("tempdir");

        let err = prepare(root.path(), &service_with_override(), &Diagnostics::new())
            .expect_err("no context dir");

        assert!(matches!(err, PrepareError::MissingContext(_)));
    }
}
