//! # Module Resolution
//!
//! Template modules are ordinary packages installed in a dependency directory
//! (`node_modules`) that also carry template content. This module discovers
//! them by walking the dependency graph declared in `package.json` files.
//!
//! ## Process
//!
//! 1.  **Read the manifest** at the starting directory. No manifest means no
//!     modules.
//!
//! 2.  **Locate each dependency** at `<dir>/node_modules/<name>`. A located
//!     package records its template sub-directory (`directories.squarespace`,
//!     or the package root) and whether a `template.conf` lives there.
//!
//! 3.  **Ascend on miss**: package managers hoist shared dependencies into an
//!     ancestor's dependency directory. When a package is not found, or is
//!     found without a `template.conf`, and the attempted path crosses more
//!     than one dependency directory, the lookup is retried from the package
//!     owning the next dependency directory up.
//!
//! 4.  **Recurse** into every located module that has a `template.conf`, so
//!     nested modules can contribute their own dependencies. A set of already
//!     expanded package roots keeps mutually dependent modules from recursing
//!     forever.
//!
//! Lookup failures other than "not found" abort only the affected branch and
//! are reported in [`Resolution::errors`].

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};

use crate::defaults::{DEPENDENCY_DIR, TEMPLATE_CONF};
use crate::error::{Error, Result};
use crate::package::PackageManifest;

/// A dependency package that may contribute template content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Package name as declared in the dependent's manifest.
    pub name: String,
    /// Absolute path of the package directory.
    pub root_path: PathBuf,
    /// Template content directory relative to `root_path`, possibly empty.
    pub template_subdir: String,
    /// Whether `root_path/template_subdir/template.conf` exists.
    pub has_template_conf: bool,
    /// Name of the module that declared this dependency, `None` at top level.
    pub required_by: Option<String>,
}

impl Module {
    /// Directory whose contents mirror a template source tree.
    pub fn template_root(&self) -> PathBuf {
        if self.template_subdir.is_empty() {
            self.root_path.clone()
        } else {
            self.root_path.join(&self.template_subdir)
        }
    }
}

/// Outcome of locating a single dependency.
#[derive(Debug)]
pub enum Lookup {
    Found(Module),
    /// The package is absent at every level the lookup was allowed to try.
    NotFound { attempted: PathBuf },
    Error(Error),
}

/// Resolved modules keyed by name, in resolution order.
///
/// Inserting a module whose name is already present replaces the earlier
/// entry in place, except that a package without a template conf never
/// replaces one that has it.
#[derive(Debug, Clone, Default)]
pub struct ModuleSet {
    modules: Vec<Module>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by name, returning the module left out of the set:
    /// the replaced entry, or `module` itself when it is a plain package
    /// shadowing a template module.
    pub fn insert(&mut self, module: Module) -> Option<Module> {
        match self.modules.iter_mut().find(|m| m.name == module.name) {
            Some(existing) if existing.has_template_conf && !module.has_template_conf => {
                debug!(
                    "Keeping template module {} at {} over plain package at {}",
                    existing.name,
                    existing.root_path.display(),
                    module.root_path.display()
                );
                Some(module)
            }
            Some(existing) => Some(std::mem::replace(existing, module)),
            None => {
                self.modules.push(module);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    /// Modules that contribute files: those with a template conf.
    pub fn contributing(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter().filter(|m| m.has_template_conf)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Result of a resolution pass.
#[derive(Debug, Default)]
pub struct Resolution {
    pub modules: ModuleSet,
    /// Branch-level failures, already logged.
    pub errors: Vec<Error>,
}

/// Compute where to retry a failed lookup of `module_path`.
///
/// Returns the directory that owns the second-to-last dependency directory in
/// the path, or `None` when the path crosses at most one dependency
/// directory.
///
/// `/a/node_modules/b/node_modules/c` ascends to `/a`.
pub fn ascend(module_path: &Path) -> Option<PathBuf> {
    let components: Vec<Component<'_>> = module_path.components().collect();
    let mut seen = 0;
    for (index, component) in components.iter().enumerate().rev() {
        if component.as_os_str() == DEPENDENCY_DIR {
            seen += 1;
            if seen > 1 {
                return Some(components[..index].iter().collect());
            }
        }
    }
    None
}

/// Locate dependency `dep` starting at package directory `start_dir`.
///
/// A package without a `template.conf` does not end the search: while an
/// ancestor dependency directory remains, the lookup ascends looking for a
/// hoisted copy that has one. The nearest conf-less package is returned only
/// when no level yields a template module.
pub fn find_module(start_dir: &Path, dep: &str) -> Lookup {
    let mut start = start_dir.to_path_buf();
    let mut fallback: Option<Module> = None;
    loop {
        let module_path = start.join(DEPENDENCY_DIR).join(dep);
        let parent = ascend(&module_path);
        match probe(&module_path, dep) {
            Ok(module) if module.has_template_conf => return Lookup::Found(module),
            Ok(module) => {
                debug!("{} at {} has no {}", dep, module_path.display(), TEMPLATE_CONF);
                fallback.get_or_insert(module);
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Lookup::Error(e),
        }

        match parent {
            Some(parent) => {
                debug!(
                    "No template module {} at {}, retrying from {}",
                    dep,
                    module_path.display(),
                    parent.display()
                );
                start = parent;
            }
            None => {
                return match fallback {
                    Some(module) => Lookup::Found(module),
                    None => Lookup::NotFound {
                        attempted: module_path,
                    },
                }
            }
        }
    }
}

fn probe(module_path: &Path, dep: &str) -> Result<Module> {
    let manifest = PackageManifest::read(module_path)?;
    let template_subdir = manifest.template_subdir().to_string();
    let conf_path = module_path.join(&template_subdir).join(TEMPLATE_CONF);
    let has_template_conf = match fs::symlink_metadata(&conf_path) {
        Ok(_) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(Error::io(conf_path, e)),
    };

    Ok(Module {
        name: dep.to_string(),
        root_path: module_path.to_path_buf(),
        template_subdir,
        has_template_conf,
        required_by: None,
    })
}

/// Discover every module reachable from the package at `start_dir`.
pub fn resolve_modules(start_dir: &Path) -> Resolution {
    let mut resolution = Resolution::default();
    let mut expanded = HashSet::new();
    expanded.insert(canonical(start_dir));
    walk(start_dir, None, &mut resolution, &mut expanded);
    resolution
}

fn walk(
    package_dir: &Path,
    parent: Option<&str>,
    resolution: &mut Resolution,
    expanded: &mut HashSet<PathBuf>,
) {
    let manifest = match PackageManifest::read_optional(package_dir) {
        Ok(Some(manifest)) => manifest,
        Ok(None) => return,
        Err(e) => {
            warn!("Skipping modules of {}: {}", package_dir.display(), e);
            resolution.errors.push(e);
            return;
        }
    };

    for dep in manifest.dependency_names() {
        match find_module(package_dir, dep) {
            Lookup::Found(mut module) => {
                module.required_by = parent.map(str::to_string);
                debug!(
                    "Resolved {} at {} (template conf: {})",
                    module.name,
                    module.root_path.display(),
                    module.has_template_conf
                );
                let recurse = module.has_template_conf && expanded.insert(canonical(&module.root_path));
                let root = module.root_path.clone();
                let name = module.name.clone();
                resolution.modules.insert(module);
                if recurse {
                    walk(&root, Some(&name), resolution, expanded);
                }
            }
            Lookup::NotFound { attempted } => {
                debug!("Module {} not found (last tried {})", dep, attempted.display());
            }
            Lookup::Error(e) => {
                warn!("Failed to resolve module {}: {}", dep, e);
                resolution.errors.push(e);
            }
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
