// ABOUTME: Capability traits for container runtimes.
// ABOUTME: Defines ImageOps and the shared types its methods exchange.

mod image;
pub(crate) mod sealed;
mod shared_types;

pub use image::{ImageError, ImageOps};
pub use shared_types::*;
