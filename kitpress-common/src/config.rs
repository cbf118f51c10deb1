//! Configuration loading and engine resolution
//!
//! Resolution follows the same priority order everywhere:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Nothing here is session state: the config file is read once at startup
//! and never written back.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Environment variable overriding the conversion executable
pub const ENGINE_ENV_VAR: &str = "KITPRESS_FFMPEG";

/// Environment variable overriding the log filter
pub const LOG_ENV_VAR: &str = "KITPRESS_LOG";

/// Default probe order for the conversion executable
///
/// `ffmpeg` on PATH first, then the usual Homebrew/MacPorts/system
/// install locations.
pub const DEFAULT_ENGINE_CANDIDATES: &[&str] = &[
    "ffmpeg",
    "/opt/homebrew/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/opt/local/bin/ffmpeg",
    "/usr/bin/ffmpeg",
];

/// On-disk configuration (`<config_dir>/kitpress/config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Explicit path to the conversion executable
    pub ffmpeg_path: Option<String>,
    /// Default tracing filter directive (e.g. "info", "kitpress_cv=debug")
    pub log_filter: Option<String>,
}

/// Platform config file path, `None` when no config directory exists
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kitpress").join("config.toml"))
}

/// Load the TOML config file, falling back to defaults when absent
///
/// A missing file is normal; a malformed file is an error so the user
/// learns about the typo instead of silently losing their override.
pub fn load_config() -> Result<TomlConfig> {
    let Some(path) = config_file_path() else {
        return Ok(TomlConfig::default());
    };
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Resolve the ordered list of engine executable candidates
///
/// An explicit override (CLI, then environment, then TOML) is probed first;
/// the compiled defaults follow so a broken override still surfaces every
/// attempted source in the failure report.
pub fn resolve_engine_candidates(cli_arg: Option<&str>, config: &TomlConfig) -> Vec<String> {
    let mut sources = Vec::new();
    if cli_arg.is_some() {
        sources.push("command line");
    }
    let env_override = std::env::var(ENGINE_ENV_VAR).ok().filter(|v| !v.is_empty());
    if env_override.is_some() {
        sources.push("environment");
    }
    if config.ffmpeg_path.is_some() {
        sources.push("TOML");
    }
    if sources.len() > 1 {
        warn!(
            "ffmpeg path overridden in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    let override_path = cli_arg
        .map(str::to_string)
        .or(env_override)
        .or_else(|| config.ffmpeg_path.clone());

    let mut candidates = Vec::new();
    if let Some(path) = override_path {
        candidates.push(path);
    }
    for default in DEFAULT_ENGINE_CANDIDATES {
        if !candidates.iter().any(|c| c == default) {
            candidates.push((*default).to_string());
        }
    }
    candidates
}

/// Resolve the tracing filter directive
pub fn resolve_log_filter(cli_arg: Option<&str>, config: &TomlConfig) -> String {
    if let Some(filter) = cli_arg {
        return filter.to_string();
    }
    if let Ok(filter) = std::env::var(LOG_ENV_VAR) {
        if !filter.is_empty() {
            return filter;
        }
    }
    config
        .log_filter
        .clone()
        .unwrap_or_else(|| "info".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_apply_without_overrides() {
        std::env::remove_var(ENGINE_ENV_VAR);
        let candidates = resolve_engine_candidates(None, &TomlConfig::default());
        assert_eq!(candidates.len(), DEFAULT_ENGINE_CANDIDATES.len());
        assert_eq!(candidates[0], "ffmpeg");
    }

    #[test]
    #[serial]
    fn cli_override_is_probed_first() {
        std::env::remove_var(ENGINE_ENV_VAR);
        let candidates =
            resolve_engine_candidates(Some("/custom/ffmpeg"), &TomlConfig::default());
        assert_eq!(candidates[0], "/custom/ffmpeg");
        // Defaults still follow for diagnostics.
        assert!(candidates.iter().any(|c| c == "ffmpeg"));
    }

    #[test]
    #[serial]
    fn env_beats_toml() {
        std::env::set_var(ENGINE_ENV_VAR, "/env/ffmpeg");
        let config = TomlConfig {
            ffmpeg_path: Some("/toml/ffmpeg".to_string()),
            log_filter: None,
        };
        let candidates = resolve_engine_candidates(None, &config);
        std::env::remove_var(ENGINE_ENV_VAR);
        assert_eq!(candidates[0], "/env/ffmpeg");
    }

    #[test]
    #[serial]
    fn duplicate_override_of_default_is_not_repeated() {
        std::env::remove_var(ENGINE_ENV_VAR);
        let candidates = resolve_engine_candidates(Some("ffmpeg"), &TomlConfig::default());
        assert_eq!(
            candidates.iter().filter(|c| c.as_str() == "ffmpeg").count(),
            1
        );
    }

    #[test]
    #[serial]
    fn log_filter_resolution_order() {
        std::env::remove_var(LOG_ENV_VAR);
        assert_eq!(resolve_log_filter(None, &TomlConfig::default()), "info");
        let config = TomlConfig {
            ffmpeg_path: None,
            log_filter: Some("debug".to_string()),
        };
        assert_eq!(resolve_log_filter(None, &config), "debug");
        assert_eq!(resolve_log_filter(Some("trace"), &config), "trace");
    }
}
