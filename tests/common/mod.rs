//! Common test utilities for winget-bootstrap integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// Shell name that is never on PATH, so every host call fails to spawn
pub const MISSING_SHELL: &str = "winget-bootstrap-test-no-such-shell";

/// A scratch directory holding a configuration file and the module/staging roots
pub struct TestEnv {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the environment root
    pub path: PathBuf,
}

impl TestEnv {
    /// Create a new test environment
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in the environment
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Configuration that keeps every path inside the environment and uses a shell that cannot start
    pub fn write_offline_config(&self) -> PathBuf {
        let yaml = format!(
            "shell: {MISSING_SHELL}\n\
             module_root: {}\n\
             staging_root: {}\n\
             gallery:\n  api_base: http://127.0.0.1:9/api/v2\n  timeout_secs: 1\n",
            self.path.join("Modules").display(),
            self.path.join("staging").display(),
        );
        self.write_file("winget-bootstrap.yaml", &yaml)
    }

    /// Whether the staging root is missing or holds nothing
    #[allow(dead_code)]
    pub fn staging_is_clean(&self) -> bool {
        let staging = self.path.join("staging");
        std::fs::read_dir(&staging).map_or(true, |mut entries| entries.next().is_none())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
