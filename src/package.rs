//! Package manifest (`package.json`) reading.
//!
//! Only the two fields assembly cares about are modeled: the optional
//! `directories.squarespace` template sub-directory and the `dependencies`
//! mapping. Everything else in the manifest is ignored.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::defaults::PACKAGE_MANIFEST;
use crate::error::{Error, Result};

/// The subset of a package manifest used to resolve template modules.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub directories: Directories,
    /// Dependency name to version requirement, in declaration order.
    #[serde(default)]
    pub dependencies: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Directories {
    /// Template content sub-directory within the package.
    #[serde(default)]
    pub squarespace: Option<String>,
}

impl PackageManifest {
    /// Parse a manifest from JSON text.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::MalformedInput {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read `package.json` from a package root.
    ///
    /// A missing manifest surfaces as [`Error::NotFound`].
    pub fn read(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(PACKAGE_MANIFEST);
        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Self::parse(&content, &path)
    }

    /// Like [`PackageManifest::read`], but a missing manifest is `Ok(None)`.
    pub fn read_optional(package_dir: &Path) -> Result<Option<Self>> {
        match Self::read(package_dir) {
            Ok(manifest) => Ok(Some(manifest)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The template sub-directory, or `""` when the package root is the
    /// template root.
    pub fn template_subdir(&self) -> &str {
        self.directories.squarespace.as_deref().unwrap_or("")
    }

    /// Declared dependency names in declaration order.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }
}
