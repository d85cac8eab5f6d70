//! # Output Configuration
//!
//! Decides whether module prefixes and summaries are colored.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modrun::output::{ColorMode, OutputConfig};
//!
//! let config = OutputConfig::new(ColorMode::Auto);
//! let mux = Multiplexer::stdio(&modules, config.use_color);
//! ```

use std::env;

use console::Style;

/// Value of the `--color` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether ANSI colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the color setting from the flag and the environment.
    ///
    /// `Always` and `Never` win outright. In `Auto` mode colors are disabled
    /// if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn new(mode: ColorMode) -> Self {
        let use_color = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
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

        console::Term::stdout().features().colors_supported()
    }

    /// Render `text` in green when colors are on.
    pub fn success(&self, text: &str) -> String {
        self.paint(Style::new().green().bold(), text)
    }

    /// Render `text` in red when colors are on.
    pub fn failure(&self, text: &str) -> String {
        self.paint(Style::new().red().bold(), text)
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.use_color {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(ColorMode::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_color_always() {
        assert!(OutputConfig::new(ColorMode::Always).use_color);
    }

    #[test]
    fn test_color_never() {
        assert!(!OutputConfig::new(ColorMode::Never).use_color);
    }

    #[test]
    #[serial]
    fn test_no_color_env_disables_auto() {
        env::set_var("NO_COLOR", "");
        let config = OutputConfig::new(ColorMode::Auto);
        env::remove_var("NO_COLOR");
        assert!(!config.use_color);
    }

    #[test]
    #[serial]
    fn test_clicolor_force_enables_auto() {
        env::remove_var("NO_COLOR");
        env::remove_var("CLICOLOR");
        env::set_var("CLICOLOR_FORCE", "1");
        let config = OutputConfig::new(ColorMode::Auto);
        env::remove_var("CLICOLOR_FORCE");
        assert!(config.use_color);
    }

    #[test]
    fn test_paint_without_color_is_plain() {
        let config = OutputConfig { use_color: false };
        assert_eq!(config.success("ok"), "ok");
        assert_eq!(config.failure("failed"), "failed");
    }

    #[test]
    fn test_paint_with_color_adds_ansi() {
        let config = OutputConfig { use_color: true };
        let painted = config.failure("failed");
        assert!(painted.contains("\u{1b}["));
        assert_eq!(console::strip_ansi_codes(&painted), "failed");
    }
}
