//! Conventional names used across assembly.
//!
//! Centralizes the file and directory names the template toolchain agrees
//! on, so the resolver, collector and sync engine never disagree.

use std::path::{Path, PathBuf};

/// Package manifest file name at every package root.
pub const PACKAGE_MANIFEST: &str = "package.json";

/// Directory a package manager installs dependencies into.
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Root template configuration file.
pub const TEMPLATE_CONF: &str = "template.conf";

/// Directory holding collection conf documents.
pub const COLLECTIONS_DIR: &str = "collections";

/// Top-level conf section dropped from module confs when styles are omitted.
pub const STYLESHEETS_KEY: &str = "stylesheets";

/// Default name of the build directory, relative to the source directory.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Per-project npm settings file.
pub const NPMRC_FILE: &str = ".npmrc";

/// `.npmrc` key holding the site URL used by the development server.
pub const SITE_URL_KEY: &str = "sqs_site_url";

/// Returns the default build directory for a source directory.
pub fn default_build_dir(src_dir: &Path) -> PathBuf {
    src_dir.join(DEFAULT_BUILD_DIR)
}
