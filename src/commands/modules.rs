//! # Modules Command Implementation
//!
//! This module implements the `modules` subcommand, which displays the
//! template modules reachable from a package as a dependency tree.
//!
//! Only modules carrying a `template.conf` are expanded; dependencies that
//! are plain packages appear as leaves. This command is read-only.

use anyhow::{Context, Result};
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::collections::HashSet;
use std::path::PathBuf;

use template_assembler::output::{emoji, OutputConfig};
use template_assembler::package::PackageManifest;
use template_assembler::resolver::{resolve_modules, Module, ModuleSet};

use super::existing_dir;

/// Show the resolved template module tree
#[derive(Args, Debug)]
pub struct ModulesArgs {
    /// Directory holding the template's package.json
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub package: PathBuf,

    /// Hide dependencies without a template.conf
    #[arg(long)]
    pub templates_only: bool,
}

/// Execute the `modules` command.
pub fn execute(args: ModulesArgs, output: &OutputConfig) -> Result<()> {
    let package_dir = existing_dir(&args.package, "Package")?;
    let label = PackageManifest::read_optional(&package_dir)
        .context("Failed to read package.json")?
        .and_then(|manifest| manifest.name)
        .unwrap_or_else(|| package_dir.display().to_string());

    let resolution = resolve_modules(&package_dir);
    println!(
        "{} Template modules for: {}",
        emoji(output, "🧩", "[MOD]"),
        label
    );

    let tree = build_tree(label, &resolution.modules, args.templates_only);
    print_tree(&tree).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    if !resolution.errors.is_empty() {
        println!(
            "{} {} dependency branch(es) could not be resolved",
            emoji(output, "⚠️ ", "[WARN]"),
            resolution.errors.len()
        );
    }
    Ok(())
}

/// Arrange modules under the modules that required them.
///
/// Modules caught in a dependency cycle have no path from the root; they are
/// attached to the root so nothing is hidden.
fn build_tree(label: String, modules: &ModuleSet, templates_only: bool) -> TreeNode {
    let mut placed = HashSet::new();
    let mut children = children_of(None, modules, templates_only, &mut placed);
    for module in modules.iter() {
        if shown(module, templates_only) && placed.insert(module.name.clone()) {
            children.push(TreeNode {
                label: module_label(module),
                children: children_of(Some(&module.name), modules, templates_only, &mut placed),
            });
        }
    }
    TreeNode { label, children }
}

fn children_of(
    parent: Option<&str>,
    modules: &ModuleSet,
    templates_only: bool,
    placed: &mut HashSet<String>,
) -> Vec<TreeNode> {
    let mut nodes = Vec::new();
    for module in modules.iter() {
        if module.required_by.as_deref() != parent || !shown(module, templates_only) {
            continue;
        }
        if !placed.insert(module.name.clone()) {
            continue;
        }
        nodes.push(TreeNode {
            label: module_label(module),
            children: children_of(Some(&module.name), modules, templates_only, placed),
        });
    }
    nodes
}

fn shown(module: &Module, templates_only: bool) -> bool {
    !templates_only || module.has_template_conf
}

fn module_label(module: &Module) -> String {
    if module.has_template_conf {
        format!("{} ({})", module.name, module.template_root().display())
    } else {
        format!("{} [no template.conf]", module.name)
    }
}

/// Tree node structure for ptree visualization
#[derive(Clone, Debug)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}
