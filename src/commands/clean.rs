//! # Clean Command Implementation
//!
//! Empties a build directory, keeping `.git*` entries so a build directory
//! that is itself a checkout survives. The directory is created if missing.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use template_assembler::defaults::DEFAULT_BUILD_DIR;
use template_assembler::output::{emoji, OutputConfig};
use template_assembler::sync::delete_build_dir;

/// Remove everything from the build directory except git metadata
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Build directory to clean
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_BUILD_DIR)]
    pub directory: PathBuf,
}

/// Execute the `clean` command.
pub fn execute(args: CleanArgs, output: &OutputConfig) -> Result<()> {
    delete_build_dir(&args.directory)
        .with_context(|| format!("Failed to clean {}", args.directory.display()))?;
    println!(
        "{} Cleaned {}",
        emoji(output, "🧹", "[CLEAN]"),
        args.directory.display()
    );
    Ok(())
}
