//! # Build Synchronization
//!
//! The [`Assembler`] owns one source tree, one build directory and the
//! manifest of the latest collection pass. It turns manifest entries into
//! build output:
//!
//! 1.  **Module confs** (`*.conf` from a module) whose build copy already
//!     exists are deep-merged into it rather than copied.
//! 2.  **Missing sources and directories** are skipped.
//! 3.  **Region files** are flattened to the build root, since the template
//!     runtime only discovers them there.
//! 4.  **Everything else** is copied verbatim to the same relative path,
//!     following symbolic links and overwriting existing output.
//!
//! Per-entry failures never abort a full sync; they are logged and counted
//! in the returned [`SyncReport`].

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::collector::{self, FileEntry, Manifest};
use crate::conf::{self, ConfDocument};
use crate::defaults::STYLESHEETS_KEY;
use crate::error::{Error, Result};
use crate::package::PackageManifest;
use crate::patterns::{get_patterns, Category, OmitSet};
use crate::resolver::{self, ModuleSet};

/// What happened to a single manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Copied,
    Merged,
    SkippedNotFound,
    SkippedNotAFile,
}

/// Tally of a bulk sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub copied: usize,
    pub merged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SyncReport {
    fn record(&mut self, result: &Result<Outcome>) {
        match result {
            Ok(Outcome::Copied) => self.copied += 1,
            Ok(Outcome::Merged) => self.merged += 1,
            Ok(Outcome::SkippedNotFound | Outcome::SkippedNotAFile) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Directories an [`Assembler`] works with.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Template source tree.
    pub src_dir: PathBuf,
    /// Output directory.
    pub build_dir: PathBuf,
    /// Directory holding the template's `package.json`; modules are resolved
    /// from here.
    pub package_dir: PathBuf,
}

/// Assembles a build tree from a source tree and its template modules.
#[derive(Debug)]
pub struct Assembler {
    src_dir: PathBuf,
    build_dir: PathBuf,
    package_dir: PathBuf,
    package: Option<PackageManifest>,
    modules: ModuleSet,
    manifest: Manifest,
}

impl Assembler {
    /// Create an assembler, reading the top-level package manifest.
    ///
    /// A missing manifest is fine (no modules); an unreadable one is a fatal
    /// [`Error::Setup`].
    pub fn new(config: AssemblerConfig) -> Result<Self> {
        let package =
            PackageManifest::read_optional(&config.package_dir).map_err(|e| Error::Setup {
                message: format!(
                    "Unable to read package.json in {}: {}",
                    config.package_dir.display(),
                    e
                ),
            })?;

        Ok(Self {
            src_dir: config.src_dir,
            build_dir: config.build_dir,
            package_dir: config.package_dir,
            package,
            modules: ModuleSet::new(),
            manifest: Manifest::new(),
        })
    }

    pub fn src_dir(&self) -> &Path {
        &self.src_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn package(&self) -> Option<&PackageManifest> {
        self.package.as_ref()
    }

    pub fn modules(&self) -> &ModuleSet {
        &self.modules
    }

    /// Manifest of the most recent collection pass.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Resolve modules and rebuild the manifest for the active patterns.
    pub fn collect(&mut self, omit: &OmitSet) -> Result<&Manifest> {
        self.modules = resolver::resolve_modules(&self.package_dir).modules;
        self.manifest = collector::collect(&self.src_dir, &self.modules, &get_patterns(omit))?;
        Ok(&self.manifest)
    }

    /// Collect, then sync every manifest entry in manifest order.
    pub fn sync_all(&mut self, omit: &OmitSet) -> Result<SyncReport> {
        self.collect(omit)?;
        let mut report = SyncReport::default();
        for entry in self.manifest.iter() {
            let result = self.sync(entry, omit);
            if let Err(e) = &result {
                warn!("Failed to sync {}: {}", entry.absolute_path.display(), e);
            }
            report.record(&result);
        }
        Ok(report)
    }

    /// Sync the manifest entry for `absolute_path`, if there is one.
    pub fn sync_path(&self, absolute_path: &Path, omit: &OmitSet) -> Result<Option<Outcome>> {
        match self.manifest.get(absolute_path) {
            Some(entry) => self.sync(entry, omit).map(Some),
            None => Ok(None),
        }
    }

    /// Bring one entry into the build directory.
    ///
    /// Files are copied byte for byte, with one exception: when styles are
    /// omitted and a module conf is the first of its path to reach the build,
    /// it is parsed, stripped of its `stylesheets` section and re-serialized
    /// pretty-printed.
    pub fn sync(&self, entry: &FileEntry, omit: &OmitSet) -> Result<Outcome> {
        let dest = self.build_dir.join(&entry.relative_path);
        let is_conf = is_conf_file(&entry.relative_path);

        if let Some(module_name) = entry.module_name.as_deref() {
            if is_conf && dest.exists() {
                conf::merge_conf(&entry.absolute_path, module_name, &self.build_dir, omit)?;
                return Ok(Outcome::Merged);
            }
        }

        let metadata = match fs::metadata(&entry.absolute_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Outcome::SkippedNotFound)
            }
            Err(e) => return Err(Error::io(&entry.absolute_path, e)),
        };
        if !metadata.is_file() {
            return Ok(Outcome::SkippedNotAFile);
        }

        let dest = if is_region_file(&entry.relative_path) {
            match entry.relative_path.file_name() {
                Some(name) => self.build_dir.join(name),
                None => dest,
            }
        } else {
            dest
        };

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        info!(
            "Copying {} to {}",
            self.display_relative(&entry.absolute_path).display(),
            self.display_relative(&dest).display()
        );

        if is_conf && entry.is_from_module() && omit.omits(Category::Styles) {
            let mut doc = ConfDocument::load(&entry.absolute_path)?;
            doc.remove_section(STYLESHEETS_KEY);
            doc.save(&dest)?;
        } else {
            fs::copy(&entry.absolute_path, &dest).map_err(|e| Error::io(&dest, e))?;
        }
        Ok(Outcome::Copied)
    }

    /// Rebuild a conf from scratch after one of its sources changed.
    ///
    /// Deletes the build copy, then syncs every entry sharing the changed
    /// entry's relative path: the main tree's copy first, then each module's
    /// merge in manifest order.
    pub fn update_all_module_confs(&self, changed_conf: &Path, omit: &OmitSet) -> Result<()> {
        let entry = self.manifest.get(changed_conf).ok_or_else(|| Error::NotFound {
            path: changed_conf.to_path_buf(),
        })?;
        let build_path = self.build_dir.join(&entry.relative_path);
        match fs::remove_file(&build_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(&build_path, e)),
        }

        for entry in self.manifest.with_relative_path(&entry.relative_path) {
            if let Err(e) = self.sync(entry, omit) {
                warn!("Failed to sync {}: {}", entry.absolute_path.display(), e);
            }
        }
        Ok(())
    }

    /// Empty the build directory, keeping version-control metadata.
    pub fn delete_build(&self) -> Result<()> {
        delete_build_dir(&self.build_dir)
    }

    fn display_relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.src_dir).unwrap_or(path)
    }
}

/// Whether a relative path names a conf document.
pub fn is_conf_file(relative_path: &Path) -> bool {
    relative_path.extension().is_some_and(|ext| ext == "conf")
}

/// Whether a relative path names a region file.
pub fn is_region_file(relative_path: &Path) -> bool {
    relative_path.extension().is_some_and(|ext| ext == "region")
}

/// Remove everything inside `dir` except `.git*` entries.
///
/// The directory itself is kept (and created if missing), so calling this
/// on an already clean build is a no-op.
pub fn delete_build_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        if entry.file_name().to_string_lossy().starts_with(".git") {
            continue;
        }
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        } else {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value as JsonValue};
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read_json(path: &Path) -> JsonValue {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    struct Project {
        _temp: TempDir,
        root: PathBuf,
    }

    impl Project {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let root = temp.path().to_path_buf();
            Self { _temp: temp, root }
        }

        fn file(self, path: &str, content: &str) -> Self {
            write(&self.root.join(path), content);
            self
        }

        fn assembler(&self) -> Assembler {
            Assembler::new(AssemblerConfig {
                src_dir: self.root.clone(),
                build_dir: self.root.join("build"),
                package_dir: self.root.clone(),
            })
            .unwrap()
        }
    }

    fn entry(absolute: &Path, relative: &str, module: Option<&str>) -> FileEntry {
        FileEntry {
            absolute_path: absolute.to_path_buf(),
            relative_path: PathBuf::from(relative),
            module_name: module.map(str::to_string),
        }
    }

    #[test]
    fn test_sync_copies_file() {
        let project = Project::new().file("pages/index.html", "<html/>");
        let assembler = project.assembler();
        let source = project.root.join("pages/index.html");

        let outcome = assembler
            .sync(&entry(&source, "pages/index.html", None), &OmitSet::new())
            .unwrap();

        assert_eq!(outcome, Outcome::Copied);
        assert_eq!(
            fs::read_to_string(project.root.join("build/pages/index.html")).unwrap(),
            "<html/>"
        );
    }

    #[test]
    fn test_sync_flattens_region_files() {
        let project = Project::new().file("regions/sub/foo.region", "region");
        let assembler = project.assembler();
        let source = project.root.join("regions/sub/foo.region");

        assembler
            .sync(&entry(&source, "regions/sub/foo.region", None), &OmitSet::new())
            .unwrap();

        assert!(project.root.join("build/foo.region").is_file());
        assert!(!project.root.join("build/regions").exists());
    }

    #[test]
    fn test_sync_skips_missing_and_directories() {
        let project = Project::new().file("assets/img/logo.png", "png");
        let assembler = project.assembler();

        let missing = project.root.join("pages/gone.html");
        assert_eq!(
            assembler
                .sync(&entry(&missing, "pages/gone.html", None), &OmitSet::new())
                .unwrap(),
            Outcome::SkippedNotFound
        );

        let dir = project.root.join("assets/img");
        assert_eq!(
            assembler
                .sync(&entry(&dir, "assets/img", None), &OmitSet::new())
                .unwrap(),
            Outcome::SkippedNotAFile
        );
        assert!(!project.root.join("build/assets/img").exists());
    }

    #[test]
    fn test_sync_overwrites_existing_output() {
        let project = Project::new()
            .file("pages/index.html", "new")
            .file("build/pages/index.html", "old");
        let assembler = project.assembler();
        let source = project.root.join("pages/index.html");

        assembler
            .sync(&entry(&source, "pages/index.html", None), &OmitSet::new())
            .unwrap();

        assert_eq!(
            fs::read_to_string(project.root.join("build/pages/index.html")).unwrap(),
            "new"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_dereferences_symlinks() {
        let project = Project::new().file("shared/real.html", "real");
        std::fs::create_dir_all(project.root.join("pages")).unwrap();
        std::os::unix::fs::symlink(
            project.root.join("shared/real.html"),
            project.root.join("pages/link.html"),
        )
        .unwrap();
        let assembler = project.assembler();
        let source = project.root.join("pages/link.html");

        assembler
            .sync(&entry(&source, "pages/link.html", None), &OmitSet::new())
            .unwrap();

        let dest = project.root.join("build/pages/link.html");
        assert!(!fs::symlink_metadata(&dest).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(dest).unwrap(), "real");
    }

    #[test]
    fn test_module_conf_merges_into_existing_build_conf() {
        let project = Project::new()
            .file("build/template.conf", r#"{"name":"Test"}"#)
            .file("mods/m1/template.conf", r#"{"stylesheets":["a.css"]}"#);
        let assembler = project.assembler();
        let source = project.root.join("mods/m1/template.conf");

        let outcome = assembler
            .sync(&entry(&source, "template.conf", Some("m1")), &OmitSet::new())
            .unwrap();

        assert_eq!(outcome, Outcome::Merged);
        assert_eq!(
            read_json(&project.root.join("build/template.conf")),
            json!({"name": "Test", "stylesheets": ["a.css"]})
        );
    }

    #[test]
    fn test_first_module_conf_is_placed_without_stylesheets_when_omitted() {
        let project = Project::new().file(
            "mods/m1/template.conf",
            r#"{"name":"M1","stylesheets":["a.css"]}"#,
        );
        let assembler = project.assembler();
        let source = project.root.join("mods/m1/template.conf");

        let outcome = assembler
            .sync(
                &entry(&source, "template.conf", Some("m1")),
                &OmitSet::from_csv("styles"),
            )
            .unwrap();

        assert_eq!(outcome, Outcome::Copied);
        assert_eq!(
            read_json(&project.root.join("build/template.conf")),
            json!({"name": "M1"})
        );
    }

    #[test]
    fn test_sync_all_isolates_failing_entry() {
        let project = Project::new()
            .file("pages/index.html", "<html/>")
            .file("template.conf", r#"{"name":"Test"}"#)
            .file("package.json", r#"{"dependencies":{"m1":"1.0.0"}}"#)
            .file("node_modules/m1/package.json", "{}")
            .file("node_modules/m1/template.conf", "{ broken")
            .file("node_modules/m1/blocks/nav.block", "nav");
        let mut assembler = project.assembler();

        let report = assembler.sync_all(&OmitSet::new()).unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.merged, 0);
        assert_eq!(
            fs::read_to_string(project.root.join("build/pages/index.html")).unwrap(),
            "<html/>"
        );
        assert_eq!(
            fs::read_to_string(project.root.join("build/blocks/nav.block")).unwrap(),
            "nav"
        );
        assert_eq!(
            fs::read_to_string(project.root.join("build/template.conf")).unwrap(),
            r#"{"name":"Test"}"#
        );
    }

    #[test]
    fn test_delete_build_keeps_git_and_is_idempotent() {
        let project = Project::new()
            .file("build/pages/index.html", "x")
            .file("build/template.conf", "{}")
            .file("build/.git/HEAD", "ref: refs/heads/main")
            .file("build/.gitignore", "*.tmp");
        let assembler = project.assembler();
        let build = project.root.join("build");

        assembler.delete_build().unwrap();
        let mut names: Vec<_> = fs::read_dir(&build)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec![".git", ".gitignore"]);

        assembler.delete_build().unwrap();
        assert_eq!(fs::read_dir(&build).unwrap().count(), 2);
        assert!(build.join(".git/HEAD").is_file());
    }

    #[test]
    fn test_delete_build_creates_missing_dir() {
        let project = Project::new();
        let assembler = project.assembler();
        assembler.delete_build().unwrap();
        assert!(project.root.join("build").is_dir());
    }

    #[test]
    fn test_malformed_top_level_manifest_is_fatal() {
        let project = Project::new().file("package.json", "{ nope");
        let result = Assembler::new(AssemblerConfig {
            src_dir: project.root.clone(),
            build_dir: project.root.join("build"),
            package_dir: project.root.clone(),
        });
        assert!(matches!(result, Err(Error::Setup { .. })));
    }

    #[test]
    fn test_is_conf_and_region_helpers() {
        assert!(is_conf_file(Path::new("template.conf")));
        assert!(is_conf_file(Path::new("collections/blog.conf")));
        assert!(!is_conf_file(Path::new("pages/conference.page")));
        assert!(is_region_file(Path::new("regions/a/b.region")));
        assert!(!is_region_file(Path::new("blocks/nav.block")));
    }
}
