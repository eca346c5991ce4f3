// ABOUTME: Project tree walking with uniform path exclusions.
// ABOUTME: Produces the sorted candidate file list every gate check draws from.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Collect every regular file under `root`, as paths relative to `root`,
/// sorted for deterministic check invocations.
///
/// Excluded prefixes are never descended into, so nothing under them can
/// reach a check. `.git` directories are always skipped, listed or not.
pub fn collect_files(root: &Path, exclude: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    visit(root, Path::new(""), exclude, &mut files)?;
    files.sort();
    Ok(files)
}

fn visit(
    root: &Path,
    rel: &Path,
    exclude: &[PathBuf],
    files: &mut Vec<PathBuf>,
) -> io::Result<()> {
    for entry in fs::read_dir(root.join(rel))? {
        let entry = entry?;
        let rel_path = rel.join(entry.file_name());
        if is_excluded(&rel_path, exclude) {
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            visit(root, &rel_path, exclude, files)?;
        } else if file_type.is_file() {
            files.push(rel_path);
        }
        // Symlinks and special files are skipped; checks only see real files.
    }
    Ok(())
}

fn is_excluded(rel: &Path, exclude: &[PathBuf]) -> bool {
    if rel.components().any(|c| c.as_os_str() == ".git") {
        return true;
    }
    exclude.iter().any(|prefix| rel.starts_with(prefix))
}
