//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use template_assembler::output::OutputConfig;

use crate::commands;

/// Template Assembler - Build a template from its source and template modules
#[derive(Parser, Debug)]
#[command(name = "template-assembler")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble template files and modules into the build directory
    Assemble(commands::assemble::AssembleArgs),

    /// Remove everything from the build directory except git metadata
    Clean(commands::clean::CleanArgs),

    /// List the files an assembly would copy or merge
    Ls(commands::ls::LsArgs),

    /// Show the resolved template module tree
    Modules(commands::modules::ModulesArgs),

    /// Show or set the site URL used by the development server
    Site(commands::site::SiteArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Assemble(args) => commands::assemble::execute(args, &output),
            Commands::Clean(args) => commands::clean::execute(args, &output),
            Commands::Ls(args) => commands::ls::execute(args),
            Commands::Modules(args) => commands::modules::execute(args, &output),
            Commands::Site(args) => commands::site::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Initialize `env_logger`; `RUST_LOG` overrides `--log-level` when set.
fn init_logging(level: &str) {
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);
    let mut builder = env_logger::Builder::new();
    builder.filter_level(filter).format_timestamp(None).format_target(false);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    // a second init (e.g. from tests) is harmless
    let _ = builder.try_init();
}
