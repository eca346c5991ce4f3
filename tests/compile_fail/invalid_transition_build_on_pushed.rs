// ABOUTME: Compile-fail test verifying build cannot be called on Pushed.
// ABOUTME: This test should fail to compile, validating state machine safety.

use gantry::release::{Pushed, ServiceBuild};

async fn try_invalid_rebuild<R: gantry::runtime::ImageOps>(
    build: ServiceBuild<Pushed>,
    runtime: &R,
) {
    // ERROR: build() method doesn't exist on ServiceBuild<Pushed>
    build.build(runtime, Vec::new()).await;
}

fn main() {}
