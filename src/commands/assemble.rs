//! # Assemble Command Implementation
//!
//! This module implements the `assemble` subcommand, which builds the
//! distributable template tree.
//!
//! ## Process
//!
//! 1. Resolve the source, build and package directories.
//! 2. Empty the build directory (unless `--noclean`).
//! 3. Resolve template modules, collect matching files and sync them.
//! 4. Optionally stay resident and re-sync on every change (`--watch`).
//!
//! Individual file failures are logged and counted; only setup failures
//! (unreadable top-level `package.json`, missing source directory) abort the
//! command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use template_assembler::defaults::default_build_dir;
use template_assembler::output::{emoji, heading, report_summary, OutputConfig};
use template_assembler::sync::{Assembler, AssemblerConfig};
use template_assembler::watch::{self, WatchConfig};

use super::{absolute_dir, existing_dir, omit_set};

/// Assemble template files and modules into the build directory
#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// Template source directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Build directory (defaults to `<directory>/build`)
    #[arg(
        short,
        long,
        value_name = "DIR",
        env = "TEMPLATE_ASSEMBLER_OUTPUT"
    )]
    pub output: Option<PathBuf>,

    /// Directory holding the template's package.json
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub package: PathBuf,

    /// Comma separated file categories to leave out (e.g. `styles,blocks`)
    #[arg(short = 'm', long, value_name = "LIST")]
    pub omit: Option<String>,

    /// Copy the `scripts` directory as well
    #[arg(short, long)]
    pub legacy: bool,

    /// Keep existing build output instead of cleaning first
    #[arg(short, long)]
    pub noclean: bool,

    /// Keep running and re-sync whenever a source file changes
    #[arg(short, long)]
    pub watch: bool,
}

/// Execute the `assemble` command.
pub fn execute(args: AssembleArgs, output: &OutputConfig) -> Result<()> {
    let src_dir = existing_dir(&args.directory, "Source")?;
    let package_dir = existing_dir(&args.package, "Package")?;
    let build_dir = match &args.output {
        Some(dir) => absolute_dir(dir)?,
        None => default_build_dir(&src_dir),
    };
    let omit = omit_set(args.omit.as_deref(), args.legacy);

    println!(
        "{} {} {}",
        emoji(output, "🧱", "[BUILD]"),
        heading(output, "Assembling"),
        src_dir.display()
    );
    log::info!("Build directory: {}", build_dir.display());
    log::debug!("Omitting: {:?}", omit.iter().collect::<Vec<_>>());

    let mut assembler = Assembler::new(AssemblerConfig {
        src_dir,
        build_dir,
        package_dir,
    })?;

    if !args.noclean {
        assembler
            .delete_build()
            .context("Failed to clean the build directory")?;
    }

    let report = assembler.sync_all(&omit)?;
    let contributing = assembler.modules().contributing().count();
    if contributing > 0 {
        println!(
            "{} {} template module(s)",
            emoji(output, "🧩", "[MOD]"),
            contributing
        );
    }
    println!("{}", report_summary(output, &report));

    if args.watch {
        println!(
            "{} Watching for changes (Ctrl+C to stop)",
            emoji(output, "👀", "[WATCH]")
        );
        watch::watch(&mut assembler, &omit, &WatchConfig::default(), || {
            println!("{} Build updated", emoji(output, "🔁", "[SYNC]"));
        })?;
    }

    Ok(())
}
