//! Shared configuration for the sempatch tooling.
//!
//! Settings are layered by `ortho_config`: command-line flags override
//! `SEMPATCH_*` environment variables, which override a TOML file named by
//! `--config-path` or `SEMPATCH_CONFIG_PATH`, which overrides the built-in
//! defaults.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use sempatch_core::StrategyOptions;

mod defaults;
mod indent;
mod logging;

pub use defaults::{
    DEFAULT_LOG_FILTER, default_indent_style, default_log_filter, default_log_filter_string,
    default_log_format,
};
pub use indent::{IndentPreference, IndentPreferenceParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for the `sempatch` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SEMPATCH")]
pub struct Config {
    /// Tracing filter expression, in `EnvFilter` syntax.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of log lines.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Indentation used when printing patched files.
    #[serde(default = "default_indent_style")]
    #[ortho_config(default = default_indent_style())]
    pub indent_style: IndentPreference,
    /// Indentation width overriding the detected width.
    #[serde(default)]
    pub tab_width: Option<usize>,
    /// Patch sources even when they contain syntax errors.
    #[serde(default)]
    pub allow_syntax_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            indent_style: default_indent_style(),
            tab_width: None,
            allow_syntax_errors: false,
        }
    }
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format of log lines.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Indentation preference for printed files.
    #[must_use]
    pub const fn indent_style(&self) -> IndentPreference {
        self.indent_style
    }

    /// Indentation width override, if any.
    #[must_use]
    pub const fn tab_width(&self) -> Option<usize> {
        self.tab_width
    }

    /// Whether sources with syntax errors may be patched.
    #[must_use]
    pub const fn allow_syntax_errors(&self) -> bool {
        self.allow_syntax_errors
    }

    /// Strategy options for patching `file` under this configuration.
    #[must_use]
    pub fn strategy_options(&self, file: impl Into<Utf8PathBuf>) -> StrategyOptions {
        StrategyOptions {
            file: file.into(),
            use_tabs: self.indent_style.use_tabs(),
            tab_width: self.tab_width,
            allow_syntax_errors: self.allow_syntax_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_follow_the_published_constants() {
        let config = Config::default();
        assert_eq!(config.log_filter(), default_log_filter());
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.indent_style(), IndentPreference::Auto);
        assert_eq!(config.tab_width(), None);
        assert!(!config.allow_syntax_errors());
    }

    #[rstest]
    #[case(IndentPreference::Auto, None)]
    #[case(IndentPreference::Tabs, Some(true))]
    #[case(IndentPreference::Spaces, Some(false))]
    fn strategy_options_carry_overrides(
        #[case] indent_style: IndentPreference,
        #[case] use_tabs: Option<bool>,
    ) {
        let config = Config {
            indent_style,
            tab_width: Some(2),
            allow_syntax_errors: true,
            ..Config::default()
        };
        let options = config.strategy_options("src/app.tsx");

        assert_eq!(options.file.as_str(), "src/app.tsx");
        assert_eq!(options.use_tabs, use_tabs);
        assert_eq!(options.tab_width, Some(2));
        assert!(options.allow_syntax_errors);
    }

    #[test]
    fn log_formats_parse_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>().ok(), Some(LogFormat::Json));
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }
}
