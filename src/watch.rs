//! # Watch Mode
//!
//! Keeps a build directory in step with its sources. A `notify` watcher
//! reports changed paths for the source tree and every contributing module;
//! changes are batched over a short debounce window, then each path is
//! classified by [`plan_change`] and applied:
//!
//! - conf files in the manifest are rebuilt from every contributor,
//! - other manifest files are re-synced individually,
//! - unknown paths that match an active pattern trigger a full re-collect,
//! - anything else (including the build directory itself) is ignored.
//!
//! Changes are processed one at a time on the calling thread.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::Duration;

use log::{debug, info, warn};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::Result;
use crate::patterns::{get_patterns, OmitSet};
use crate::sync::{is_conf_file, Assembler, SyncReport};

/// How a changed path should be handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeAction {
    Ignore,
    /// Re-sync a single known file.
    SyncFile(PathBuf),
    /// Rebuild a conf from the main tree and every module.
    RebuildConf(PathBuf),
    /// Re-collect the manifest and sync everything.
    Resync,
}

/// Watch mode settings.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Quiet period before a batch of changes is applied.
    pub debounce: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
        }
    }
}

/// Classify a changed path against the assembler's current manifest.
pub fn plan_change(assembler: &Assembler, path: &Path, omit: &OmitSet) -> ChangeAction {
    if path.starts_with(assembler.build_dir()) {
        return ChangeAction::Ignore;
    }

    if let Some(entry) = assembler.manifest().get(path) {
        return if is_conf_file(&entry.relative_path) {
            ChangeAction::RebuildConf(path.to_path_buf())
        } else {
            ChangeAction::SyncFile(path.to_path_buf())
        };
    }

    let patterns = get_patterns(omit);
    let mut roots = vec![assembler.src_dir().to_path_buf()];
    roots.extend(assembler.modules().contributing().map(|m| m.template_root()));

    let matches_pattern = roots.iter().any(|root| {
        path.strip_prefix(root)
            .map(|relative| patterns.iter().any(|p| p.matches_relative(relative)))
            .unwrap_or(false)
    });

    if matches_pattern {
        ChangeAction::Resync
    } else {
        ChangeAction::Ignore
    }
}

/// Apply one planned change.
///
/// Returns a report when the change caused a full re-sync.
pub fn apply_change(
    assembler: &mut Assembler,
    action: &ChangeAction,
    omit: &OmitSet,
) -> Result<Option<SyncReport>> {
    match action {
        ChangeAction::Ignore => Ok(None),
        ChangeAction::SyncFile(path) => {
            assembler.sync_path(path, omit)?;
            Ok(None)
        }
        ChangeAction::RebuildConf(path) => {
            assembler.update_all_module_confs(path, omit)?;
            Ok(None)
        }
        ChangeAction::Resync => assembler.sync_all(omit).map(Some),
    }
}

/// Apply a batch of changed paths, collapsing any number of full re-syncs
/// into one.
pub fn apply_batch(
    assembler: &mut Assembler,
    paths: &BTreeSet<PathBuf>,
    omit: &OmitSet,
) -> Result<bool> {
    let actions: Vec<ChangeAction> = paths
        .iter()
        .map(|path| plan_change(assembler, path, omit))
        .filter(|action| *action != ChangeAction::Ignore)
        .collect();

    if actions.is_empty() {
        return Ok(false);
    }

    if actions.contains(&ChangeAction::Resync) {
        apply_change(assembler, &ChangeAction::Resync, omit)?;
        return Ok(true);
    }

    for action in &actions {
        debug!("Applying {:?}", action);
        if let Err(e) = apply_change(assembler, action, omit) {
            warn!("Failed to apply {:?}: {}", action, e);
        }
    }
    Ok(true)
}

/// Watch sources and keep the build directory up to date until the watcher
/// shuts down.
///
/// `on_change` runs after every batch that touched the build.
pub fn watch<F>(
    assembler: &mut Assembler,
    omit: &OmitSet,
    config: &WatchConfig,
    mut on_change: F,
) -> Result<()>
where
    F: FnMut(),
{
    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(tx, Config::default())?;

    let mut roots = vec![assembler.src_dir().to_path_buf()];
    for module in assembler.modules().contributing() {
        let root = module.template_root();
        if !root.starts_with(assembler.src_dir()) {
            roots.push(root);
        }
    }
    for root in &roots {
        watcher.watch(root, RecursiveMode::Recursive)?;
        info!("Watching {}", root.display());
    }

    let mut pending: BTreeSet<PathBuf> = BTreeSet::new();
    loop {
        match rx.recv_timeout(config.debounce) {
            Ok(Ok(event)) => pending.extend(event.paths),
            Ok(Err(e)) => warn!("Watch error: {}", e),
            Err(RecvTimeoutError::Timeout) => {
                if pending.is_empty() {
                    continue;
                }
                let batch = std::mem::take(&mut pending);
                match apply_batch(assembler, &batch, omit) {
                    Ok(true) => on_change(),
                    Ok(false) => {}
                    Err(e) => warn!("Failed to re-sync: {}", e),
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                info!("Watcher disconnected, stopping");
                break;
            }
        }
    }

    Ok(())
}
