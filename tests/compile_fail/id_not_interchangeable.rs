// ABOUTME: Compile-fail test verifying ImageId and ImageDigest are not interchangeable.
// ABOUTME: This test should fail to compile, validating type safety.

use gantry::types::{ImageDigest, ImageId};

fn takes_image_id(_id: ImageId) {}

fn main() {
    let digest = ImageDigest::new("sha256:abc123".to_string());
    takes_image_id(digest); // ERROR: expected ImageId, found ImageDigest
}
