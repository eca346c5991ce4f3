// ABOUTME: Sealed trait pattern for runtime traits.
// ABOUTME: Prevents external implementations, allowing non-breaking evolution.

/// Sealed trait to prevent external implementations.
///
/// Only in-crate runtime types implement the image operations trait, so new
/// methods can be added without a breaking release.
pub trait Sealed {}
