//! Console configuration: the shell configuration plus logging.

use std::path::Path;

use admin_shell::config::{ConfigError, ShellConfig};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;

use crate::paths;

/// Contents of `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    #[serde(flatten)]
    pub shell: ShellConfig,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            log_level: "debug".to_string(),
            shell: ShellConfig::default(),
        }
    }
}

impl ConsoleSettings {
    /// Load from the platform config directory, falling back to defaults
    /// when there is no file.
    pub fn load_default() -> Result<Self, ConfigError> {
        match paths::config_file() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.shell.validate()?;
        Ok(settings)
    }

    /// Configured log level; unknown names mean `Debug`.
    pub fn level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattened_shell_config() {
        let settings: ConsoleSettings = serde_json::from_str(
            r#"{ "log_level": "warn", "table": { "default_page_size": 20 } }"#,
        )
        .unwrap();
        assert_eq!(settings.level(), LevelFilter::Warn);
        assert_eq!(settings.shell.table.default_page_size, 20);
        assert_eq!(settings.shell.router.default_landing, "/index");
    }

    #[test]
    fn test_unknown_level_defaults_to_debug() {
        let settings = ConsoleSettings {
            log_level: "loud".into(),
            ..Default::default()
        };
        assert_eq!(settings.level(), LevelFilter::Debug);
    }
}
