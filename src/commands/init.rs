// ABOUTME: Init command - writes a starter manifest into the current directory.
// ABOUTME: Refuses to overwrite an existing manifest unless forced.

use gantry::config;
use gantry::error::Result;
use gantry::output::Output;
use std::env;

pub fn init(force: bool, output: Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let path = config::init_manifest(&cwd, force)?;

    output.success(&format!("Created {}", path.display()));
    output.progress("Edit the registry and services sections, then run `gantry release`.");
    Ok(())
}
