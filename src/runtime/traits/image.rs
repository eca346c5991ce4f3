// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: Build, tag, push, and check existence of container images.

use super::sealed::Sealed;
use super::shared_types::{BuildRequest, RegistryAuth};
use crate::types::{ImageDigest, ImageId, ImageRef};
use async_trait::async_trait;

/// Image operations: build, tag, push, check existence.
#[async_trait]
pub trait ImageOps: Sealed + Send + Sync {
    /// Build an image from a packed tar.gz context archive.
    async fn build_image(
        &self,
        request: &BuildRequest,
        context: Vec<u8>,
    ) -> Result<ImageId, ImageError>;

    /// Apply a repository:tag name to a built image.
    async fn tag_image(&self, image: &ImageId, target: &ImageRef) -> Result<(), ImageError>;

    /// Push a tagged image to its registry. Returns the content digest when
    /// the registry reports one.
    async fn push_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<Option<ImageDigest>, ImageError>;

    /// Check if an image exists locally.
    async fn image_exists(&self, reference: &ImageRef) -> Result<bool, ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("authentication failed for registry: {0}")]
    AuthenticationFailed(String),

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("tag failed: {0}")]
    TagFailed(String),

    #[error("push failed: {0}")]
    PushFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
