//! # Conf Documents
//!
//! `template.conf` and `collections/*.conf` are JSON documents. The main
//! source tree places the base copy in the build directory; every module that
//! ships the same conf enriches that copy by deep merge.
//!
//! ## Merge rules
//!
//! | build value | module value | result                                   |
//! |-------------|--------------|------------------------------------------|
//! | object      | object       | merged key by key, recursively           |
//! | array       | array        | build items, then module items not yet present |
//! | anything    | anything     | module value                             |
//!
//! Keys missing from the build document are inserted as-is. The module
//! document is never modified.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::Value as JsonValue;

use crate::defaults::{COLLECTIONS_DIR, STYLESHEETS_KEY, TEMPLATE_CONF};
use crate::error::{Error, Result};
use crate::patterns::{Category, OmitSet};

/// A parsed conf file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfDocument {
    root: JsonValue,
}

impl ConfDocument {
    pub fn new(root: JsonValue) -> Self {
        Self { root }
    }

    /// Parse JSON text, attributing failures to `origin`.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(content)
            .map(Self::new)
            .map_err(|e| Error::MalformedInput {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content, path)
    }

    /// Write the document pretty-printed with a trailing newline.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut serialized = serde_json::to_string_pretty(&self.root)?;
        if !serialized.ends_with('\n') {
            serialized.push('\n');
        }
        fs::write(path, serialized).map_err(|e| Error::io(path, e))
    }

    pub fn value(&self) -> &JsonValue {
        &self.root
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.root.get(key).is_some()
    }

    /// Remove a top-level section, returning it if it was present.
    pub fn remove_section(&mut self, key: &str) -> Option<JsonValue> {
        self.root.as_object_mut().and_then(|map| map.remove(key))
    }

    /// Deep-merge `other` into this document.
    pub fn merge_from(&mut self, other: &ConfDocument) {
        merge_values(&mut self.root, &other.root);
    }
}

/// Recursively merge `source` into `target` following the module rules.
pub fn merge_values(target: &mut JsonValue, source: &JsonValue) {
    match (target, source) {
        (JsonValue::Object(target_map), JsonValue::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (JsonValue::Array(target_items), JsonValue::Array(source_items)) => {
            for item in source_items {
                if !target_items.contains(item) {
                    target_items.push(item.clone());
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// Build-side location of a conf file, decided by its file name.
///
/// `template.conf` lives at the build root; every other conf is a
/// collection document under `collections/`.
pub fn build_conf_path(build_dir: &Path, conf_file_name: &str) -> PathBuf {
    if conf_file_name == TEMPLATE_CONF {
        build_dir.join(conf_file_name)
    } else {
        build_dir.join(COLLECTIONS_DIR).join(conf_file_name)
    }
}

fn display_name(conf_file_name: &str) -> String {
    if conf_file_name == TEMPLATE_CONF {
        conf_file_name.to_string()
    } else {
        format!("{}/{}", COLLECTIONS_DIR, conf_file_name)
    }
}

/// Merge a module's conf file into the matching build conf.
///
/// The build conf must already exist; conf merging only ever enriches a
/// document the main sync pass placed. When styles are omitted, the module's
/// top-level `stylesheets` section is dropped before merging.
pub fn merge_conf(
    source_conf: &Path,
    module_name: &str,
    build_dir: &Path,
    omit: &OmitSet,
) -> Result<()> {
    let mut conf = ConfDocument::load(source_conf)?;
    let file_name = source_conf
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::MalformedInput {
            path: source_conf.to_path_buf(),
            message: "conf path has no file name".to_string(),
        })?;
    let build_path = build_conf_path(build_dir, file_name);
    let shown = display_name(file_name);

    if omit.omits(Category::Styles) && conf.remove_section(STYLESHEETS_KEY).is_some() {
        info!(
            "Dropping {} from {} of {} because of --omit flag",
            STYLESHEETS_KEY, shown, module_name
        );
    }

    let mut build_conf = match ConfDocument::load(&build_path) {
        Ok(doc) => doc,
        Err(e) if e.is_not_found() => {
            warn!("Couldn't find {} in build", shown);
            return Err(Error::MissingBuildConf { path: build_path });
        }
        Err(e) => {
            warn!("Couldn't read {} in build: {}", shown, e);
            return Err(e);
        }
    };

    info!("Merging {} from {}", shown, module_name);
    build_conf.merge_from(&conf);
    build_conf.save(&build_path).inspect_err(|e| {
        warn!("Failed to write {}: {}", build_path.display(), e);
    })
}
