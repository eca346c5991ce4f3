// ABOUTME: Manifest location shared by the release and preflight commands.
// ABOUTME: Resolves an explicit --config path or discovers one in the cwd.

use gantry::config::Manifest;
use gantry::error::Result;
use std::env;
use std::path::{Path, PathBuf};

/// Load the manifest and return it with the directory that anchors every
/// relative path in it (service contexts, gate exclusions).
pub fn load_manifest(config: Option<&Path>) -> Result<(Manifest, PathBuf)> {
    match config {
        Some(path) => {
            let manifest = Manifest::load(path)?;
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            Ok((manifest, dir))
        }
        None => {
            let cwd = env::current_dir()?;
            let manifest = Manifest::discover(&cwd)?;
            Ok((manifest, cwd))
        }
    }
}
