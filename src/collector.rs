//! # File Collection
//!
//! Builds the manifest of template files for one assembly pass. Every active
//! pattern is expanded first against the source tree, then against each
//! contributing module's template root, in module resolution order.
//!
//! Each match is recorded with its path relative to the root that owns it,
//! so a module's `pages/about.page` lands at `pages/about.page` in the build
//! no matter where the module is installed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glob::MatchOptions;
use log::warn;

use crate::error::Result;
use crate::patterns::Pattern;
use crate::resolver::ModuleSet;

/// One discovered source file (or matched directory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub absolute_path: PathBuf,
    /// Path relative to the owning root: the source tree, or the module's
    /// template root for module files.
    pub relative_path: PathBuf,
    /// Owning module, `None` for files of the main source tree.
    pub module_name: Option<String>,
}

impl FileEntry {
    pub fn is_from_module(&self) -> bool {
        self.module_name.is_some()
    }
}

/// Entries keyed by absolute path, in first-insertion order.
///
/// Inserting an entry whose absolute path is already present replaces the
/// earlier entry without moving it.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<FileEntry>,
    index: HashMap<PathBuf, usize>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: FileEntry) -> Option<FileEntry> {
        match self.index.get(&entry.absolute_path) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position], entry)),
            None => {
                self.index
                    .insert(entry.absolute_path.clone(), self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    pub fn get(&self, absolute_path: &Path) -> Option<&FileEntry> {
        self.index
            .get(absolute_path)
            .map(|&position| &self.entries[position])
    }

    pub fn contains(&self, absolute_path: &Path) -> bool {
        self.index.contains_key(absolute_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    /// Entries sharing `relative_path`, main-tree entries first, each group
    /// in manifest order.
    pub fn with_relative_path(&self, relative_path: &Path) -> Vec<&FileEntry> {
        let (main, modules): (Vec<&FileEntry>, Vec<&FileEntry>) = self
            .entries
            .iter()
            .filter(|entry| entry.relative_path == relative_path)
            .partition(|entry| !entry.is_from_module());
        main.into_iter().chain(modules).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn glob_options() -> MatchOptions {
    MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    }
}

/// Expand one pattern under `root`, returning matched paths.
fn expand(root: &Path, pattern: &Pattern) -> Result<Vec<PathBuf>> {
    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    let mut matches = Vec::new();
    for glob_str in pattern.globs {
        let full = format!("{}{}", escaped_root.trim_end_matches('/'), glob_str);
        for entry in glob::glob_with(&full, glob_options())? {
            match entry {
                Ok(path) => matches.push(path),
                Err(e) => warn!("Skipping unreadable path {}: {}", e.path().display(), e),
            }
        }
    }
    Ok(matches)
}

fn entry_for(path: PathBuf, root: &Path, module_name: Option<&str>) -> FileEntry {
    let relative_path = path
        .strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.clone());
    FileEntry {
        absolute_path: path,
        relative_path,
        module_name: module_name.map(str::to_string),
    }
}

/// Collect the manifest for `source_dir` plus every contributing module.
pub fn collect(source_dir: &Path, modules: &ModuleSet, patterns: &[Pattern]) -> Result<Manifest> {
    let mut manifest = Manifest::new();
    let module_roots: Vec<(&str, PathBuf)> = modules
        .contributing()
        .map(|module| (module.name.as_str(), module.template_root()))
        .collect();

    for pattern in patterns {
        for path in expand(source_dir, pattern)? {
            manifest.insert(entry_for(path, source_dir, None));
        }
        for (name, root) in &module_roots {
            for path in expand(root, pattern)? {
                manifest.insert(entry_for(path, root, Some(name)));
            }
        }
    }

    Ok(manifest)
}
