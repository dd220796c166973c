//! # Template Assembler Library
//!
//! This library assembles a website template's distributable build tree from
//! a source directory plus any number of template modules: reusable template
//! fragments installed as ordinary packages. It backs the
//! `template-assembler` command-line tool.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use template_assembler::patterns::OmitSet;
//! use template_assembler::sync::{Assembler, AssemblerConfig};
//!
//! let mut assembler = Assembler::new(AssemblerConfig {
//!     src_dir: PathBuf::from("."),
//!     build_dir: PathBuf::from("build"),
//!     package_dir: PathBuf::from("."),
//! })?;
//! assembler.delete_build()?;
//! let report = assembler.sync_all(&OmitSet::from_csv("scripts"))?;
//! println!("{} files copied", report.copied);
//! # Ok::<(), template_assembler::error::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Patterns (`patterns`)**: the named file categories of a template
//!   (assets, blocks, collections, pages, regions, scripts, styles, strings,
//!   conf) and the omission set that removes some of them.
//! - **Modules (`resolver`, `package`)**: dependency packages that carry a
//!   `template.conf`, discovered through `package.json` files and nested
//!   `node_modules` directories.
//! - **Manifest (`collector`)**: every matching file of the source tree and of
//!   each module, keyed by absolute path.
//! - **Sync (`sync`)**: copying manifest entries into the build, flattening
//!   region files, and merging module confs (`conf`) into the build's copy.
//! - **Watch (`watch`)**: incremental re-sync driven by file system events.
//!
//! ## Execution Flow
//!
//! 1.  **Patterns**: the omission set yields the active glob patterns.
//! 2.  **Resolution**: modules are discovered from the package manifest.
//! 3.  **Collection**: patterns are expanded under the source tree and every
//!     contributing module.
//! 4.  **Sync**: entries are copied or merged into the build directory.

pub mod collector;
pub mod conf;
pub mod defaults;
pub mod error;
pub mod npmrc;
pub mod output;
pub mod package;
pub mod patterns;
pub mod resolver;
pub mod sync;
pub mod watch;

#[cfg(test)]
mod assembly_proptest;
