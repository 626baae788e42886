//! # Output Configuration
//!
//! Controls the appearance of the few lines `dry` prints itself; everything
//! else on the terminal comes from the wrapped package manager.
//!
//! ## Respecting User Preferences
//!
//! Colors and symbols are disabled when:
//! - `NO_COLOR` is set (per https://no-color.org/)
//! - `CLICOLOR=0` is set
//! - `TERM=dumb` is set
//! - stderr is not a TTY, unless `CLICOLOR_FORCE=1`

use console::style;
use std::env;

/// Output configuration for controlling colors and symbols.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and symbols should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Detect color support from the environment
    pub fn from_env() -> Self {
        Self {
            use_color: Self::detect_color_support(),
        }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
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

        console::Term::stderr().features().colors_supported()
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

/// Returns the symbol when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Final line of a successful run, `command` being what was forwarded
pub fn status_line(config: &OutputConfig, command: Option<&str>) -> String {
    let marker = emoji(config, "✔", "[OK]");
    let marker = if config.use_color {
        style(marker).green().bold().to_string()
    } else {
        marker.to_string()
    };
    match command {
        Some(command) => format!("{} dry: {}", marker, command),
        None => format!("{} dry: manifest ready", marker),
    }
}
