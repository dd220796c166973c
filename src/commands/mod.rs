//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `template-assembler` command-line tool. Each subcommand is defined in its
//! own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `template_assembler` library.

pub mod assemble;
pub mod clean;
pub mod completions;
pub mod ls;
pub mod modules;
pub mod site;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use template_assembler::patterns::OmitSet;

/// Omission set for a run: the user's list, plus `scripts` unless legacy
/// script copying was requested.
pub(crate) fn omit_set(omit: Option<&str>, legacy: bool) -> OmitSet {
    let mut set = omit.map(OmitSet::from_csv).unwrap_or_default();
    if !legacy {
        set.insert("scripts");
    }
    set
}

/// Canonical form of a directory that must already exist.
pub(crate) fn existing_dir(path: &Path, what: &str) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("{} directory not found: {}", what, path.display()))
}

/// Absolute form of a directory that may not exist yet.
pub(crate) fn absolute_dir(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Ok(cwd.join(path))
    }
}
