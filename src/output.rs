//! # Output Configuration
//!
//! Controls how the CLI decorates its summaries. Colors and emoji are used
//! only when the terminal can show them and the user has not opted out.
//!
//! Respected settings, in order:
//! - `--color=always|never|auto`
//! - `NO_COLOR` (any value) disables colors
//! - `CLICOLOR=0` disables colors, `CLICOLOR_FORCE=1` forces them
//! - `TERM=dumb` disables colors
//! - otherwise, whatever `console` detects for stdout

use std::env;

use console::style;

use crate::sync::SyncReport;

/// Output configuration for colors and emoji.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Build from the `--color` flag value and the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// The emoji when colors are on, the plain marker otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Bold cyan heading, or the bare text without colors.
pub fn heading(config: &OutputConfig, text: &str) -> String {
    if config.use_color {
        style(text).cyan().bold().to_string()
    } else {
        text.to_string()
    }
}

/// One-line summary of a bulk sync.
pub fn report_summary(config: &OutputConfig, report: &SyncReport) -> String {
    let marker = if report.failed > 0 {
        emoji(config, "⚠️ ", "[WARN]")
    } else {
        emoji(config, "✅", "[OK]")
    };
    format!(
        "{} {} copied, {} merged, {} skipped, {} failed",
        marker, report.copied, report.merged, report.skipped, report.failed
    )
}
