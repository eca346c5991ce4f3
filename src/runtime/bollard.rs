// ABOUTME: Bollard-based container runtime implementation.
// ABOUTME: Builds, tags, and pushes images via the Docker-compatible API.

use crate::runtime::traits::sealed::Sealed;
use crate::runtime::traits::{BuildRequest, ImageError, ImageOps, RegistryAuth};
use crate::runtime::types::{RuntimeInfo, RuntimeType};
use crate::types::{ImageDigest, ImageId, ImageRef};
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::BuildInfoAux;
use bollard::query_parameters::{BuildImageOptions, PushImageOptions, TagImageOptions};
use futures::StreamExt;

/// Error connecting to a runtime socket.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("failed to connect to {socket}: {message}")]
    Failed { socket: String, message: String },

    #[error("runtime at {socket} did not answer ping: {message}")]
    Ping { socket: String, message: String },
}

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_build_error(e: bollard::errors::Error, service: &str) -> ImageError {
    ImageError::BuildFailed(format!("{}: {}", service, e))
}

fn map_image_tag_error(e: bollard::errors::Error, target: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => ImageError::NotFound(target.to_string()),
        _ => ImageError::TagFailed(format!("{}: {}", target, e)),
    }
}

fn map_image_push_error(e: bollard::errors::Error, reference: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 401 || *status_code == 403 =>
        {
            ImageError::AuthenticationFailed(reference.to_string())
        }
        _ => ImageError::PushFailed(format!("{}: {}", reference, e)),
    }
}

/// Pulls the content digest out of a push status line, e.g.
/// `"api-v2.1.0.42: digest: sha256:deadbeef size: 1234"`.
fn parse_push_digest(status: &str) -> Option<ImageDigest> {
    let rest = status.split("digest: ").nth(1)?;
    let digest = rest.split_whitespace().next()?;
    digest
        .starts_with("sha256:")
        .then(|| ImageDigest::new(digest.to_string()))
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Container runtime client backed by bollard.
///
/// Works against Docker and Podman; both expose the Docker-compatible API
/// over a unix socket.
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
    socket_path: String,
}

impl BollardRuntime {
    /// Connect to a container runtime using detected runtime info.
    pub fn connect(info: &RuntimeInfo) -> Result<Self, ConnectionError> {
        let client =
            Docker::connect_with_unix(&info.socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| ConnectionError::Failed {
                    socket: info.socket_path.clone(),
                    message: e.to_string(),
                })?;
        Ok(Self {
            client,
            runtime_type: info.runtime_type,
            socket_path: info.socket_path.clone(),
        })
    }

    /// Verify the runtime answers on its socket.
    pub async fn ping(&self) -> Result<(), ConnectionError> {
        self.client.ping().await.map_err(|e| ConnectionError::Ping {
            socket: self.socket_path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// The runtime type (Docker or Podman).
    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }
}

impl Sealed for BollardRuntime {}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn build_image(
        &self,
        request: &BuildRequest,
        context: Vec<u8>,
    ) -> Result<ImageId, ImageError> {
        let service = request.service.as_str();

        let opts = BuildImageOptions {
            dockerfile: request.dockerfile_name.clone(),
            buildargs: Some(request.build_args.clone()),
            labels: Some(request.labels.clone()),
            forcerm: true,
            nocache: request.nocache,
            ..Default::default()
        };

        let body = bollard::body_full(bytes::Bytes::from(context));
        let mut stream = self.client.build_image(opts, None, Some(body));

        let mut image_id: Option<String> = None;
        while let Some(result) = stream.next().await {
            let info = result.map_err(|e| map_image_build_error(e, service))?;

            if let Some(error) = info.error {
                let detail = info
                    .error_detail
                    .and_then(|d| d.message)
                    .unwrap_or(error);
                return Err(ImageError::BuildFailed(format!("{}: {}", service, detail)));
            }

            if let Some(line) = info.stream {
                let line = line.trim_end();
                if !line.is_empty() {
                    tracing::debug!(service, "{}", line);
                }
                // Classic builder reports the id in the closing stream line.
                if let Some(id) = line.strip_prefix("Successfully built ") {
                    image_id = Some(id.trim().to_string());
                }
            }

            if let Some(BuildInfoAux::Default(image)) = info.aux
                && let Some(id) = image.id
            {
                image_id = Some(id);
            }
        }

        image_id.map(ImageId::new).ok_or_else(|| {
            ImageError::BuildFailed(format!(
                "{}: build finished without reporting an image id",
                service
            ))
        })
    }

    async fn tag_image(&self, image: &ImageId, target: &ImageRef) -> Result<(), ImageError> {
        let target_name = target.to_string();

        let opts = TagImageOptions {
            repo: Some(target.repository()),
            tag: target.tag().map(str::to_string),
            ..Default::default()
        };

        self.client
            .tag_image(image.as_str(), Some(opts))
            .await
            .map_err(|e| map_image_tag_error(e, &target_name))?;

        Ok(())
    }

    async fn push_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<Option<ImageDigest>, ImageError> {
        let reference_name = reference.to_string();

        let opts = PushImageOptions {
            tag: reference.tag().map(str::to_string),
            ..Default::default()
        };

        let credentials = auth.map(|a| bollard::auth::DockerCredentials {
            username: Some(a.username.clone()),
            password: Some(a.password.clone()),
            serveraddress: a.server.clone(),
            ..Default::default()
        });

        let mut digest = None;
        let mut stream = self
            .client
            .push_image(&reference.repository(), Some(opts), credentials);

        while let Some(result) = stream.next().await {
            let info = result.map_err(|e| map_image_push_error(e, &reference_name))?;

            if let Some(error) = info.error {
                let detail = info
                    .error_detail
                    .and_then(|d| d.message)
                    .unwrap_or(error);
                return Err(ImageError::PushFailed(format!(
                    "{}: {}",
                    reference_name, detail
                )));
            }

            if let Some(status) = info.status {
                tracing::debug!(reference = %reference_name, "{}", status);
                if let Some(parsed) = parse_push_digest(&status) {
                    digest = Some(parsed);
                }
            }
        }

        Ok(digest)
    }

    async fn image_exists(&self, reference: &ImageRef) -> Result<bool, ImageError> {
        let image_name = reference.to_string();

        match self.client.inspect_image(&image_name).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(ImageError::Runtime(format!(
                "failed to inspect {}: {}",
                image_name, e
            ))),
        }
    }
}
