// ABOUTME: Temp project fixture - a manifest plus service context directories.
// ABOUTME: Shared by the orchestrator, gate, and CLI integration tests.

use gantry::config::Manifest;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A throwaway project directory with a manifest and build contexts.
pub struct TestProject {
    root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp project"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write the manifest at the conventional location.
    pub fn manifest(self, yaml: &str) -> Self {
        fs::write(self.root.path().join("gantry.yml"), yaml).expect("write manifest");
        self
    }

    /// Create a context directory populated with files.
    pub fn context(self, dir: &str, files: &[(&str, &str)]) -> Self {
        let context = self.root.path().join(dir);
        fs::create_dir_all(&context).expect("create context dir");
        for (rel, content) in files {
            let path = context.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create parent dir");
            }
            fs::write(path, content).expect("write context file");
        }
        self
    }

    /// Write one file relative to the project root.
    pub fn file(self, rel: &str, content: &str) -> Self {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, content).expect("write file");
        self
    }

    pub fn load(&self) -> Manifest {
        Manifest::discover(self.root.path()).expect("manifest loads")
    }
}

/// Two plain services pushing to the same repository; contexts still need
/// to be created with [`TestProject::context`].
pub const TWO_SERVICES: &str = r#"
registry:
  repository: someuser/myapp
services:
  - name: api
    base_image: python:3.12-slim
    context: ./api
    entrypoint: ["./entrypoint.sh"]
  - name: worker
    base_image: python:3.12-slim
    context: ./worker
    entrypoint: ["./run.sh"]
"#;
