//! # Template File Categories
//!
//! A template source tree is made of a fixed set of file categories, each
//! identified by a name and one or more glob patterns relative to a template
//! root. Assembly copies every category except the ones the caller omits.
//!
//! Category order is fixed and significant: it is the order in which the
//! collector enumerates files, and therefore the order in which the sync
//! engine visits them.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use glob::MatchOptions;

/// A named family of template files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Assets,
    Blocks,
    Collections,
    Pages,
    Regions,
    Scripts,
    Styles,
    Strings,
    Conf,
}

impl Category {
    /// Every category, in enumeration order.
    pub const ALL: [Category; 9] = [
        Category::Assets,
        Category::Blocks,
        Category::Collections,
        Category::Pages,
        Category::Regions,
        Category::Scripts,
        Category::Styles,
        Category::Strings,
        Category::Conf,
    ];

    /// The name used on the command line and in omission sets.
    pub fn name(self) -> &'static str {
        match self {
            Category::Assets => "assets",
            Category::Blocks => "blocks",
            Category::Collections => "collections",
            Category::Pages => "pages",
            Category::Regions => "regions",
            Category::Scripts => "scripts",
            Category::Styles => "styles",
            Category::Strings => "strings",
            Category::Conf => "conf",
        }
    }

    /// Glob patterns for this category, rooted with a leading `/`.
    ///
    /// Regions are both loose `*.region` files at the root and anything
    /// below a `regions/` directory.
    pub fn globs(self) -> &'static [&'static str] {
        match self {
            Category::Assets => &["/assets/**"],
            Category::Blocks => &["/blocks/**"],
            Category::Collections => &["/collections/**"],
            Category::Pages => &["/pages/**"],
            Category::Regions => &["/*.region", "/regions/**/*.region"],
            Category::Scripts => &["/scripts/**"],
            Category::Styles => &["/styles/**"],
            Category::Strings => &["/strings/**"],
            Category::Conf => &["/template.conf"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| format!("unknown template category '{}'", s))
    }
}

/// Category names the caller wants left out of assembly.
///
/// Any string may be inserted; names that do not match a [`Category`] are
/// kept but have no effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OmitSet(BTreeSet<String>);

impl OmitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma separated list such as `styles,blocks`.
    pub fn from_csv(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.0.insert(name.into());
    }

    /// Whether `category` is omitted.
    pub fn omits(&self, category: Category) -> bool {
        self.0.contains(category.name())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for OmitSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The glob patterns of one active category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub category: Category,
    pub globs: &'static [&'static str],
}

impl Pattern {
    /// Whether a path relative to a template root belongs to this category.
    pub fn matches_relative(&self, relative: &Path) -> bool {
        let Some(relative) = relative.to_str() else {
            return false;
        };
        let options = MatchOptions {
            require_literal_separator: true,
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };
        self.globs.iter().any(|glob| {
            glob::Pattern::new(glob.trim_start_matches('/'))
                .map(|pattern| pattern.matches_with(relative, options))
                .unwrap_or(false)
        })
    }
}

/// Returns the active patterns, in category order, minus omitted categories.
pub fn get_patterns(omit: &OmitSet) -> Vec<Pattern> {
    Category::ALL
        .into_iter()
        .filter(|category| !omit.omits(*category))
        .map(|category| Pattern {
            category,
            globs: category.globs(),
        })
        .collect()
}
