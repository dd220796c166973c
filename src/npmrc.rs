//! `.npmrc` reading and writing.
//!
//! The development server reads its site URL from the project's `.npmrc`.
//! Each line is `key=value`; keys ending in `[]` accumulate into a list.
//! Lines are split at the first `=` only, so values (and keys such as
//! `//registry.example.com/:_authToken`) may contain `:` or further `=`.

use std::fs;
use std::path::Path;

use crate::defaults::{NPMRC_FILE, SITE_URL_KEY};
use crate::error::{Error, Result};

/// A value in an `.npmrc` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NpmrcValue {
    Single(String),
    List(Vec<String>),
}

/// Parsed `.npmrc` settings, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Npmrc {
    entries: Vec<(String, NpmrcValue)>,
}

impl Npmrc {
    pub fn parse(content: &str) -> Self {
        let mut npmrc = Self::default();
        for line in content.lines() {
            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key.trim(), value),
                None => (line.trim(), ""),
            };
            if key.is_empty() {
                continue;
            }
            match key.strip_suffix("[]") {
                Some(list_key) => npmrc.push(list_key, value),
                None => npmrc.set(key, value),
            }
        }
        npmrc
    }

    /// Read an `.npmrc` file; a missing file is `Ok(None)`.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(Self::parse(&content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&NpmrcValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Single-valued setting, if present.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(NpmrcValue::Single(value)) => Some(value),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = NpmrcValue::Single(value.into());
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    fn push(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, NpmrcValue::List(items))) => items.push(value.to_string()),
            Some((_, existing)) => *existing = NpmrcValue::List(vec![value.to_string()]),
            None => self
                .entries
                .push((key.to_string(), NpmrcValue::List(vec![value.to_string()]))),
        }
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        for (key, value) in &self.entries {
            match value {
                NpmrcValue::Single(value) => {
                    output.push_str(&format!("{}={}\n", key, value));
                }
                NpmrcValue::List(items) => {
                    for item in items {
                        output.push_str(&format!("{}[]={}\n", key, item));
                    }
                }
            }
        }
        output
    }

    /// Write the file, readable only by its owner on Unix.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, self.render()).map_err(|e| Error::io(path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .map_err(|e| Error::io(path, e))?;
        }
        Ok(())
    }
}

/// Site URL configured for the project in `folder`.
pub fn site_url(folder: &Path) -> Result<Option<String>> {
    let npmrc = Npmrc::read(&folder.join(NPMRC_FILE))?;
    Ok(npmrc.and_then(|n| n.get_str(SITE_URL_KEY).map(str::to_string)))
}

/// Store the site URL for the project in `folder`, keeping other settings.
pub fn set_site_url(folder: &Path, url: &str) -> Result<()> {
    let path = folder.join(NPMRC_FILE);
    let mut npmrc = Npmrc::read(&path)?.unwrap_or_default();
    npmrc.set(SITE_URL_KEY, url);
    npmrc.write(&path)
}
