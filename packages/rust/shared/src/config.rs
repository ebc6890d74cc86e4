//! Application configuration for edutrace.
//!
//! User config lives at `~/.edutrace/edutrace.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EdutraceError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "edutrace.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".edutrace";

/// Upper bound for any lookahead window, in lines.
const MAX_WINDOW: usize = 10;

// ---------------------------------------------------------------------------
// Config structs (matching edutrace.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Parser windows and thresholds.
    #[serde(default)]
    pub parser: ParserConfig,

    /// Result output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[parser]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Lines after a degree line scanned for a labeled field or a year.
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,

    /// Lines after a PhD line scanned for a dissertation label.
    #[serde(default = "default_dissertation_lookahead")]
    pub dissertation_lookahead: usize,

    /// Lines after a PhD line where a bare quoted title is accepted.
    #[serde(default = "default_quoted_title_window")]
    pub quoted_title_window: usize,

    /// Minimum length of a labeled dissertation title.
    #[serde(default = "default_min_dissertation_len")]
    pub min_dissertation_len: usize,

    /// Minimum length of a bare quoted dissertation title.
    #[serde(default = "default_min_quoted_title_len")]
    pub min_quoted_title_len: usize,

    /// Run the cross-level institution check.
    #[serde(default = "default_true")]
    pub validate: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
            dissertation_lookahead: default_dissertation_lookahead(),
            quoted_title_window: default_quoted_title_window(),
            min_dissertation_len: default_min_dissertation_len(),
            min_quoted_title_len: default_min_quoted_title_len(),
            validate: true,
        }
    }
}

fn default_lookahead() -> usize {
    3
}
fn default_dissertation_lookahead() -> usize {
    4
}
fn default_quoted_title_window() -> usize {
    2
}
fn default_min_dissertation_len() -> usize {
    10
}
fn default_min_quoted_title_len() -> usize {
    15
}
fn default_true() -> bool {
    true
}

/// `[output]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    #[serde(default)]
    pub pretty: bool,
}

impl ParserConfig {
    /// Reject windows the parser cannot use.
    pub fn validate_windows(&self) -> Result<()> {
        let windows = [
            ("lookahead", self.lookahead),
            ("dissertation_lookahead", self.dissertation_lookahead),
            ("quoted_title_window", self.quoted_title_window),
        ];
        for (name, value) in windows {
            if value > MAX_WINDOW {
                return Err(EdutraceError::validation(format!(
                    "parser.{name} = {value} exceeds the maximum of {MAX_WINDOW} lines"
                )));
            }
        }
        if self.quoted_title_window > self.dissertation_lookahead {
            return Err(EdutraceError::validation(
                "parser.quoted_title_window must not exceed parser.dissertation_lookahead",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.edutrace/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EdutraceError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.edutrace/edutrace.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EdutraceError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        EdutraceError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.parser.validate_windows()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| EdutraceError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EdutraceError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EdutraceError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("lookahead"));
        assert!(toml_str.contains("min_quoted_title_len"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.parser, ParserConfig::default());
        assert!(!parsed.output.pretty);
    }

    #[test]
    fn partial_parser_section_fills_defaults() {
        let toml_str = r#"
[parser]
lookahead = 5
validate = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.parser.lookahead, 5);
        assert!(!config.parser.validate);
        assert_eq!(config.parser.dissertation_lookahead, 4);
        assert_eq!(config.parser.min_quoted_title_len, 15);
    }

    #[test]
    fn oversized_window_is_rejected() {
        let config = ParserConfig {
            lookahead: 40,
            ..ParserConfig::default()
        };
        let err = config.validate_windows().unwrap_err();
        assert!(err.to_string().contains("parser.lookahead"));
    }

    #[test]
    fn quoted_window_wider_than_dissertation_window_is_rejected() {
        let config = ParserConfig {
            quoted_title_window: 3,
            dissertation_lookahead: 2,
            ..ParserConfig::default()
        };
        assert!(config.validate_windows().is_err());
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let err = load_config_from(Path::new("/nonexistent/edutrace.toml")).unwrap_err();
        assert!(matches!(err, EdutraceError::Io { .. }));
    }
}
