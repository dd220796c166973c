//! # Ls Command Implementation
//!
//! Lists the files an `assemble` run would bring into the build, in the
//! order they would be synced. Module files are tagged with their module.
//! Nothing is written.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use template_assembler::collector::{FileEntry, Manifest};
use template_assembler::defaults::default_build_dir;
use template_assembler::sync::{Assembler, AssemblerConfig};

use super::{existing_dir, omit_set};

/// List the files an assembly would copy or merge
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Template source directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Directory holding the template's package.json
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub package: PathBuf,

    /// Comma separated file categories to leave out
    #[arg(short = 'm', long, value_name = "LIST")]
    pub omit: Option<String>,

    /// Include the `scripts` directory
    #[arg(short, long)]
    pub legacy: bool,

    /// Only show files contributed by modules
    #[arg(long)]
    pub modules_only: bool,
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs) -> Result<()> {
    let src_dir = existing_dir(&args.directory, "Source")?;
    let package_dir = existing_dir(&args.package, "Package")?;
    let omit = omit_set(args.omit.as_deref(), args.legacy);

    let mut assembler = Assembler::new(AssemblerConfig {
        build_dir: default_build_dir(&src_dir),
        src_dir,
        package_dir,
    })?;
    let manifest = assembler.collect(&omit)?;

    for line in listing(manifest, args.modules_only) {
        println!("{}", line);
    }
    Ok(())
}

fn listing(manifest: &Manifest, modules_only: bool) -> Vec<String> {
    manifest
        .iter()
        .filter(|entry| !modules_only || entry.is_from_module())
        .map(format_entry)
        .collect()
}

fn format_entry(entry: &FileEntry) -> String {
    match &entry.module_name {
        Some(module) => format!("{}  ({})", entry.relative_path.display(), module),
        None => entry.relative_path.display().to_string(),
    }
}
