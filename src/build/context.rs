// ABOUTME: Packs a service's build context into an in-memory tar.gz archive.
// ABOUTME: The rendered Dockerfile rides along under a reserved entry name.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io;
use std::path::Path;
use tar::Builder;

use super::dockerfile::DOCKERFILE_NAME;

const CONTEXT_SIZE_WARN_BYTES: usize = 500 * 1024 * 1024;

/// Archives `context_dir` recursively and appends the rendered Dockerfile
/// under [`DOCKERFILE_NAME`]. Override candidates live inside the context,
/// so the archive already carries everything the generated COPY
/// instructions reference.
pub fn pack(context_dir: &Path, dockerfile: &str) -> io::Result<Vec<u8>> {
    tracing::debug!("packing build context from {}", context_dir.display());

    let mut archive = Vec::new();
    {
        let encoder = GzEncoder::new(&mut archive, Compression::default());
        let mut tar = Builder::new(encoder);

        tar.append_dir_all(".", context_dir)?;

        let mut header = tar::Header::new_gnu();
        header.set_path(DOCKERFILE_NAME)?;
        header.set_size(dockerfile.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        tar.append(&header, dockerfile.as_bytes())?;

        let encoder = tar.into_inner()?;
        encoder.finish()?;
    }

    tracing::debug!("build context packed: {} bytes", archive.len());

    if archive.len() > CONTEXT_SIZE_WARN_BYTES {
        tracing::warn!(
            "build context is {}MB; consider excluding large files from the context directory",
            archive.len() / 1024 / 1024
        );
    }

    Ok(archive)
}
