//! # Site Command Implementation
//!
//! Reads or stores the site URL the development server talks to. The value
//! lives under `sqs_site_url` in the project's `.npmrc`; other settings in
//! that file are preserved.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;

use template_assembler::npmrc;

/// Show or set the site URL used by the development server
#[derive(Args, Debug)]
pub struct SiteArgs {
    /// Project folder containing the `.npmrc`
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub folder: PathBuf,

    /// Store a new site URL
    #[arg(long, value_name = "URL")]
    pub set: Option<String>,
}

/// Execute the `site` command.
pub fn execute(args: SiteArgs) -> Result<()> {
    if let Some(url) = args.set {
        let url = normalize_url(&url)?;
        npmrc::set_site_url(&args.folder, &url)
            .with_context(|| format!("Failed to update .npmrc in {}", args.folder.display()))?;
        println!("Site URL set to {}", url);
        return Ok(());
    }

    match npmrc::site_url(&args.folder)? {
        Some(url) => println!("{}", url),
        None => bail!(
            "No site URL configured in {}; use --set <URL>",
            args.folder.display()
        ),
    }
    Ok(())
}

/// Trim whitespace and a trailing slash; require an http(s) scheme.
fn normalize_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        bail!("Site URL must start with http:// or https://: {}", url);
    }
    Ok(url.to_string())
}
