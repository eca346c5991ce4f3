// ABOUTME: Per-service release pipeline using the type state pattern.
// ABOUTME: Each transition consumes self and returns the next state on success.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::config::PushPolicy;
use crate::diagnostics::{Diagnostics, Warning};
use crate::runtime::{BuildRequest, ImageOps, RegistryAuth};
use crate::types::{ImageDigest, ImageId, ImageRef, ServiceName, Version};

use super::error::ReleaseError;
use super::report::BuildArtifact;
use super::state::{Built, Pending, Pushed};

/// One service's passage through build, tag, and push.
///
/// The state parameter `S` makes the order compile-checked: `publish()`
/// only exists once `build()` has returned, and the registry digest only
/// exists on `ServiceBuild<Pushed>`. Failed transitions return a
/// [`ReleaseError`] naming the service; there is no rollback.
#[derive(Debug)]
pub struct ServiceBuild<S> {
    name: ServiceName,
    version: Version,
    target: ImageRef,
    extra_build_args: HashMap<String, String>,
    nocache: bool,
    image: Option<ImageId>,
    digest: Option<ImageDigest>,
    _state: PhantomData<S>,
}

// =============================================================================
// Internal Helpers and Accessors
// =============================================================================

impl<S> ServiceBuild<S> {
    /// Internal helper to transition to a new state.
    fn transition<T>(self) -> ServiceBuild<T> {
        ServiceBuild {
            name: self.name,
            version: self.version,
            target: self.target,
            extra_build_args: self.extra_build_args,
            nocache: self.nocache,
            image: self.image,
            digest: self.digest,
            _state: PhantomData,
        }
    }

    /// Internal helper to transition with the built image id.
    fn transition_with_image<T>(self, image: ImageId) -> ServiceBuild<T> {
        ServiceBuild {
            image: Some(image),
            ..self.transition()
        }
    }

    /// Internal helper to transition with the pushed digest.
    fn transition_with_digest<T>(self, digest: Option<ImageDigest>) -> ServiceBuild<T> {
        ServiceBuild {
            digest,
            ..self.transition()
        }
    }

    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    /// Full reference the image will be pushed under.
    pub fn target(&self) -> &ImageRef {
        &self.target
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

// =============================================================================
// Pending -> Built
// =============================================================================

impl ServiceBuild<Pending> {
    /// A service accepted into the run, not yet built.
    ///
    /// `extra_build_args` are the manifest's resolved per-service build
    /// arguments; the version pair is layered on top of them.
    pub fn new(
        name: ServiceName,
        version: Version,
        target: ImageRef,
        extra_build_args: HashMap<String, String>,
        nocache: bool,
    ) -> Self {
        Self {
            name,
            version,
            target,
            extra_build_args,
            nocache,
            image: None,
            digest: None,
            _state: PhantomData,
        }
    }

    /// Build the service image from its packed context.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::BuildFailed` when the engine reports a failed
    /// build, including failing install steps.
    #[must_use = "release state must be used"]
    pub async fn build<R: ImageOps>(
        self,
        runtime: &R,
        context: Vec<u8>,
    ) -> Result<ServiceBuild<Built>, ReleaseError> {
        let request = self.build_request();

        match runtime.build_image(&request, context).await {
            Ok(image) => Ok(self.transition_with_image(image)),
            Err(e) => Err(ReleaseError::BuildFailed {
                service: self.name,
                reason: e.to_string(),
            }),
        }
    }

    /// Build parameters for this service. The version pair always wins over
    /// manifest build args of the same name.
    fn build_request(&self) -> BuildRequest {
        let mut build_args = self.extra_build_args.clone();
        build_args.insert("VERSION".to_string(), self.version.value.clone());
        build_args.insert("BUILD_NUM".to_string(), self.version.build_num.to_string());

        let mut labels = HashMap::new();
        labels.insert("gantry.service".to_string(), self.name.to_string());
        labels.insert("gantry.version".to_string(), self.version.value.clone());

        BuildRequest {
            service: self.name.clone(),
            dockerfile_name: crate::build::DOCKERFILE_NAME.to_string(),
            build_args,
            labels,
            nocache: self.nocache,
        }
    }
}

// =============================================================================
// Built -> Pushed
// =============================================================================

impl ServiceBuild<Built> {
    /// Id of the built image.
    pub fn image(&self) -> &ImageId {
        self.image.as_ref().expect("built image must exist")
    }

    /// Tag the built image for the registry and push it.
    ///
    /// Failed pushes are retried per `policy` with a doubling backoff; each
    /// retry is recorded as a warning. A tag failure is not retried, since
    /// tagging a locally held image does not fail transiently.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::TagFailed` or `ReleaseError::PushFailed`
    /// (after retries are exhausted).
    #[must_use = "release state must be used"]
    pub async fn publish<R: ImageOps>(
        self,
        runtime: &R,
        auth: Option<&RegistryAuth>,
        policy: &PushPolicy,
        diagnostics: &Diagnostics,
    ) -> Result<ServiceBuild<Pushed>, ReleaseError> {
        let image = self.image.as_ref().expect("built image must exist");
        if let Err(e) = runtime.tag_image(image, &self.target).await {
            return Err(ReleaseError::TagFailed {
                service: self.name,
                reason: e.to_string(),
            });
        }

        let attempts = policy.attempts.max(1);
        let mut backoff = policy.backoff;
        let mut attempt = 1;

        loop {
            match runtime.push_image(&self.target, auth).await {
                Ok(digest) => return Ok(self.transition_with_digest(digest)),
                Err(e) if attempt < attempts => {
                    diagnostics.warn(Warning::push_retried(format!(
                        "push attempt {attempt}/{attempts} failed for {}: {e}; retrying in {:?}",
                        self.name, backoff
                    )));
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(ReleaseError::PushFailed {
                        service: self.name,
                        attempts: attempt,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

// =============================================================================
// Pushed - Terminal State
// =============================================================================

impl ServiceBuild<Pushed> {
    /// Content digest reported by the registry, when it sent one.
    pub fn digest(&self) -> Option<&ImageDigest> {
        self.digest.as_ref()
    }

    /// The pushed image as an artifact record.
    pub fn artifact(&self) -> BuildArtifact {
        BuildArtifact {
            service_name: self.name.clone(),
            version: self.version.clone(),
            image_tag: self.target.to_string(),
        }
    }
}
