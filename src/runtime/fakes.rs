// ABOUTME: In-memory fake runtime for exercising release flows (testing only).
// ABOUTME: Records image operations and injects failures without a daemon.

use crate::runtime::traits::sealed::Sealed;
use crate::runtime::traits::{BuildRequest, ImageError, ImageOps, RegistryAuth};
use crate::types::{ImageDigest, ImageId, ImageRef};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Fake image runtime (testing only).
///
/// Builds succeed instantly unless a failure is injected, and every
/// operation is recorded for later assertions. Shared behind an `Arc`, it
/// also tracks how many builds ran concurrently.
#[derive(Default)]
pub struct FakeRuntime {
    state: Mutex<FakeState>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[derive(Default)]
struct FakeState {
    build_delay: Option<Duration>,
    fail_builds: HashSet<String>,
    push_failures: HashMap<String, u32>,
    builds: Vec<BuildRequest>,
    tags: Vec<(String, String)>,
    pushes: Vec<String>,
    push_attempts: HashMap<String, u32>,
    next_id: u64,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent build sleeps this long; makes concurrency
    /// observable through [`FakeRuntime::max_in_flight`].
    pub fn set_build_delay(&self, delay: Duration) {
        self.state.lock().build_delay = Some(delay);
    }

    /// Builds for this service fail from now on.
    pub fn fail_builds_for(&self, service: &str) {
        self.state.lock().fail_builds.insert(service.to_string());
    }

    /// The next `times` pushes of `reference` fail; later pushes succeed.
    pub fn fail_pushes(&self, reference: &str, times: u32) {
        self.state
            .lock()
            .push_failures
            .insert(reference.to_string(), times);
    }

    /// Service names in the order their builds started.
    pub fn builds(&self) -> Vec<String> {
        self.state
            .lock()
            .builds
            .iter()
            .map(|r| r.service.as_str().to_string())
            .collect()
    }

    /// Full build requests in the order they arrived.
    pub fn build_requests(&self) -> Vec<BuildRequest> {
        self.state.lock().builds.clone()
    }

    /// (image id, target reference) pairs in tag order.
    pub fn tags(&self) -> Vec<(String, String)> {
        self.state.lock().tags.clone()
    }

    /// References pushed successfully, in push order.
    pub fn pushed(&self) -> Vec<String> {
        self.state.lock().pushes.clone()
    }

    /// Push attempts for a reference, failed attempts included.
    pub fn push_attempts(&self, reference: &str) -> u32 {
        self.state
            .lock()
            .push_attempts
            .get(reference)
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of builds observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Sealed for FakeRuntime {}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn build_image(
        &self,
        request: &BuildRequest,
        _context: Vec<u8>,
    ) -> Result<ImageId, ImageError> {
        let delay = self.state.lock().build_delay;

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.max_in_flight
            .fetch_max(self.in_flight.load(Ordering::SeqCst), Ordering::SeqCst);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut state = self.state.lock();
        state.builds.push(request.clone());

        if state.fail_builds.contains(request.service.as_str()) {
            return Err(ImageError::BuildFailed(format!(
                "{}: injected build failure",
                request.service
            )));
        }

        state.next_id += 1;
        Ok(ImageId::new(format!("sha256:{:064x}", state.next_id)))
    }

    async fn tag_image(&self, image: &ImageId, target: &ImageRef) -> Result<(), ImageError> {
        self.state
            .lock()
            .tags
            .push((image.as_str().to_string(), target.to_string()));
        Ok(())
    }

    async fn push_image(
        &self,
        reference: &ImageRef,
        _auth: Option<&RegistryAuth>,
    ) -> Result<Option<ImageDigest>, ImageError> {
        let name = reference.to_string();
        let mut state = self.state.lock();

        *state.push_attempts.entry(name.clone()).or_insert(0) += 1;

        if let Some(remaining) = state.push_failures.get_mut(&name)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(ImageError::PushFailed(format!(
                "{}: injected push failure",
                name
            )));
        }

        state.pushes.push(name.clone());
        let digest = ImageDigest::new(format!("sha256:{:064x}", state.pushes.len()));
        Ok(Some(digest))
    }

    async fn image_exists(&self, reference: &ImageRef) -> Result<bool, ImageError> {
        let name = reference.to_string();
        Ok(self.state.lock().tags.iter().any(|(_, target)| target == &name))
    }
}
