// ABOUTME: Validated domain types and type-safe identifiers.
// ABOUTME: Covers service names, image references, tags, and release versions.

mod id;
mod image_ref;
mod service_name;
mod tag;
mod version;

pub use id::{ImageDigest, ImageId};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use service_name::{ServiceName, ServiceNameError};
pub use tag::{ImageTag, ImageTagError};
pub use version::{ReleaseInputError, ReleaseRun, TriggerKind, Version};
