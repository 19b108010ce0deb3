//! Snapshot documents on disk for CLI and loader tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding a snapshot document and optional config.
pub struct SnapshotDir {
    temp_dir: TempDir,
}

impl SnapshotDir {
    /// Write `content` as `snapshot.json` in a fresh temporary directory.
    pub fn with_snapshot(content: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("snapshot.json"), content).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root().join("snapshot.json")
    }

    /// Write a project-local `.modquery.toml`.
    pub fn write_config(&self, content: &str) {
        fs::write(self.root().join(".modquery.toml"), content).unwrap();
    }
}

/// JSON form of [`GraphFixture::basic`](crate::GraphFixture::basic) plus a
/// small extension and repository rule table.
pub const BASIC_SNAPSHOT: &str = r#"{
  "modules": [
    { "key": "<root>", "deps": { "a": "a@1.0" } },
    { "key": "a@1.0", "deps": { "b": "b@2.0" }, "unused_deps": { "b": "b@1.0" },
      "extensions": { "b@2.0%toolchains": ["tc_linux", "tc_mac"] } },
    { "key": "b@1.0" },
    { "key": "b@2.0" }
  ],
  "usages": [
    { "module": "a@1.0", "extension": "b@2.0%toolchains",
      "tags": [ { "class": "register", "attributes": { "os": "linux" } } ],
      "imports": ["tc_linux"] }
  ],
  "repo_rules": {
    "a~1.0": { "rule": "http_archive", "urls": ["https://example.com/a-1.0.zip"] }
  }
}
"#;
