// ABOUTME: Compile-fail test verifying publish cannot be called before build.
// ABOUTME: This test should fail to compile, validating state machine safety.

use std::collections::HashMap;

use gantry::config::PushPolicy;
use gantry::diagnostics::Diagnostics;
use gantry::release::{Pending, ServiceBuild};
use gantry::types::{ImageRef, ImageTag, ServiceName, Version};

async fn try_invalid_publish<R: gantry::runtime::ImageOps>(runtime: &R) {
    let version = Version {
        value: "v1.0.0.1".to_string(),
        build_num: 1,
    };
    let tag = ImageTag::prefixed("api", &version.value).unwrap();
    let target = ImageRef::parse("someuser/app").unwrap().with_tag(&tag);
    let build: ServiceBuild<Pending> = ServiceBuild::new(
        ServiceName::new("api").unwrap(),
        version,
        target,
        HashMap::new(),
        false,
    );

    // ERROR: publish() method doesn't exist on ServiceBuild<Pending>
    build
        .publish(runtime, None, &PushPolicy::default(), &Diagnostics::new())
        .await;
}

fn main() {}
