// ABOUTME: Renders the build instructions for one service image.
// ABOUTME: Layer order guarantees override files land after the source copy.

use crate::build::overrides::ResolvedOverride;
use crate::config::ServiceManifest;

/// Name the rendered instructions are injected into the build context
/// under. Reserved so it cannot collide with a file the service ships.
pub const DOCKERFILE_NAME: &str = "Dockerfile.gantry";

/// Renders a complete Dockerfile for one service.
///
/// The version pair arrives as build arguments and is re-exported as
/// `APP_VERSION` / `APP_BUILD_NUM` so a running container can report its
/// release identity. Override copies come after the source copy and the
/// install steps, so nothing the build produces can clobber them. The
/// entrypoint is always exec form; exit codes pass through unchanged.
pub fn render(service: &ServiceManifest, overrides: &[ResolvedOverride]) -> String {
    let mut out = String::new();

    out.push_str(&format!("FROM {}\n", service.base_image));
    out.push('\n');
    out.push_str("ARG VERSION=latest\n");
    out.push_str("ARG BUILD_NUM=0\n");

    let mut extra_args: Vec<&String> = service.build_args.keys().collect();
    extra_args.sort();
    for key in extra_args {
        out.push_str(&format!("ARG {key}\n"));
    }
    out.push('\n');

    out.push_str(&format!("WORKDIR {}\n", service.workdir));
    out.push_str("COPY . .\n");

    if !service.install.is_empty() {
        out.push('\n');
        for step in &service.install {
            out.push_str(&format!("RUN {step}\n"));
        }
    }

    if !overrides.is_empty() {
        out.push('\n');
        for resolved in overrides {
            let source = resolved.source.display().to_string();
            let copy = exec_form([source.as_str(), resolved.destination.as_str()]);
            out.push_str(&format!("COPY {copy}\n"));
        }
    }

    out.push('\n');
    out.push_str("ENV APP_VERSION=$VERSION APP_BUILD_NUM=$BUILD_NUM\n");
    out.push('\n');

    out.push_str(&format!(
        "ENTRYPOINT {}\n",
        exec_form(service.entrypoint.iter().map(String::as_str))
    ));
    if !service.args.is_empty() {
        out.push_str(&format!(
            "CMD {}\n",
            exec_form(service.args.iter().map(String::as_str))
        ));
    }

    out
}

/// JSON-array form used by ENTRYPOINT, CMD, and COPY. Handles embedded
/// quotes and backslashes, which the shell form cannot.
fn exec_form<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = items
        .into_iter()
        .map(|item| format!("\"{}\"", item.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("[{}]", quoted.join(", "))
}
