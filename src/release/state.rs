// ABOUTME: Release state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce the build-then-push order at compile time.

/// Accepted into the run: nothing sent to the engine yet.
/// Available actions: `build()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Pending;

/// Image built: the engine holds the image locally.
/// Available actions: `publish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Built;

/// Pushed: the tagged image is live in the registry.
/// Available actions: `artifact()`, `digest()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Pushed;
