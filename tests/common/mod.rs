//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new()
//!     .with_file("pages/index.html", "<html/>")
//!     .with_module("mod-a", r#"{"name":"A"}"#);
//! fixture.command().arg("assemble").assert().success();
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::TestFixture;
}

/// A template project in a temporary directory.
///
/// Modules added with [`TestFixture::with_module`] are installed under
/// `node_modules/` and declared as dependencies in the root `package.json`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
    dependencies: Vec<String>,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
            dependencies: Vec::new(),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Install a template module with the given `template.conf` content and
    /// declare it as a dependency.
    pub fn with_module(mut self, name: &str, template_conf: &str) -> Self {
        let root = format!("node_modules/{}", name);
        self = self
            .with_file(&format!("{}/package.json", root), &format!(r#"{{"name":"{}"}}"#, name))
            .with_file(&format!("{}/template.conf", root), template_conf);
        self.dependencies.push(name.to_string());
        self.write_package_json();
        self
    }

    /// Add a file inside an installed module.
    #[allow(dead_code)]
    pub fn with_module_file(self, module: &str, path: &str, content: &str) -> Self {
        self.with_file(&format!("node_modules/{}/{}", module, path), content)
    }

    fn write_package_json(&self) {
        let dependencies: serde_json::Map<String, serde_json::Value> = self
            .dependencies
            .iter()
            .map(|name| (name.clone(), serde_json::Value::from("1.0.0")))
            .collect();
        let manifest = serde_json::json!({ "name": "test-template", "dependencies": dependencies });
        self.temp_dir
            .child("package.json")
            .write_str(&manifest.to_string())
            .expect("Failed to write package.json");
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a file in the default build directory.
    #[allow(dead_code)]
    pub fn build_path(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join("build").join(path)
    }

    /// Read a file from the default build directory.
    #[allow(dead_code)]
    pub fn read_build(&self, path: &str) -> String {
        std::fs::read_to_string(self.build_path(path)).expect("Failed to read build file")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("template-assembler");
        cmd.current_dir(self.path());
        cmd.env_remove("TEMPLATE_ASSEMBLER_OUTPUT");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_module_declares_dependency() {
        let fixture = TestFixture::new().with_module("mod-a", "{}").with_module("mod-b", "{}");
        let manifest: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(fixture.path().join("package.json")).unwrap(),
        )
        .unwrap();
        assert!(manifest["dependencies"]["mod-a"].is_string());
        assert!(manifest["dependencies"]["mod-b"].is_string());
        assert!(fixture.path().join("node_modules/mod-b/template.conf").exists());
    }
}
