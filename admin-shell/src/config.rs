//! Shell configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a [`ShellConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for the shell.
///
/// Every section falls back to its defaults when missing, so an empty JSON
/// object is a valid config.
///
/// # Example
///
/// ```
/// use admin_shell::config::ShellConfig;
///
/// let config = ShellConfig::from_json_str(r#"{ "table": { "default_page_size": 20 } }"#).unwrap();
/// assert_eq!(config.table.default_page_size, 20);
/// assert_eq!(config.router.default_landing, "/index");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Table engine defaults.
    pub table: TableConfig,
    /// Loading indicator behavior.
    pub loading: LoadingConfig,
    /// Router behavior.
    pub router: RouterConfig,
}

impl ShellConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Sets the table section.
    pub fn with_table(mut self, table: TableConfig) -> Self {
        self.table = table;
        self
    }

    /// Sets the loading section.
    pub fn with_loading(mut self, loading: LoadingConfig) -> Self {
        self.loading = loading;
        self
    }

    /// Sets the router section.
    pub fn with_router(mut self, router: RouterConfig) -> Self {
        self.router = router;
        self
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate()?;
        self.router.validate()
    }
}

/// Defaults for every table engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Page size used on mount.
    ///
    /// Default: 10
    pub default_page_size: u32,
    /// Page sizes offered by the pagination control.
    ///
    /// Default: 10, 20, 50, 100
    pub page_size_options: Vec<u32>,
    /// Record field used as the row key.
    ///
    /// Default: `id`
    pub row_key: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            page_size_options: vec![10, 20, 50, 100],
            row_key: "id".to_string(),
        }
    }
}

impl TableConfig {
    /// Sets the default page size.
    pub fn with_default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size;
        self
    }

    /// Sets the offered page sizes.
    pub fn with_page_size_options(mut self, options: Vec<u32>) -> Self {
        self.page_size_options = options;
        self
    }

    /// Sets the row key field.
    pub fn with_row_key(mut self, key: impl Into<String>) -> Self {
        self.row_key = key.into();
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "table.default_page_size must be positive".to_string(),
            ));
        }
        if self.page_size_options.contains(&0) {
            return Err(ConfigError::Invalid(
                "table.page_size_options must all be positive".to_string(),
            ));
        }
        if !self.page_size_options.is_empty()
            && !self.page_size_options.contains(&self.default_page_size)
        {
            return Err(ConfigError::Invalid(format!(
                "table.default_page_size {} is not one of page_size_options",
                self.default_page_size
            )));
        }
        Ok(())
    }
}

/// Loading indicator behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Minimum time a loading indicator stays visible once shown.
    ///
    /// Default: 300 ms
    pub min_duration_ms: u64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: 300,
        }
    }
}

impl LoadingConfig {
    /// Sets the minimum visible duration.
    pub fn with_min_duration(mut self, duration: Duration) -> Self {
        self.min_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// The minimum visible duration.
    pub fn min_duration(&self) -> Duration {
        Duration::from_millis(self.min_duration_ms)
    }
}

/// Router behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Where `/` redirects to.
    ///
    /// Default: `/index`
    pub default_landing: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_landing: "/index".to_string(),
        }
    }
}

impl RouterConfig {
    /// Sets the default landing path.
    pub fn with_default_landing(mut self, path: impl Into<String>) -> Self {
        self.default_landing = path.into();
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_landing.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "router.default_landing must be absolute, got '{}'",
                self.default_landing
            )));
        }
        if self.default_landing == "/" {
            return Err(ConfigError::Invalid(
                "router.default_landing cannot be the root path".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = ShellConfig::from_json_str("{}").unwrap();
        assert_eq!(config.table.default_page_size, 10);
        assert_eq!(config.table.row_key, "id");
        assert_eq!(config.loading.min_duration(), Duration::from_millis(300));
        assert_eq!(config.router.default_landing, "/index");
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let err = ShellConfig::from_json_str(r#"{ "table": { "default_page_size": 0 } }"#);
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_default_outside_options() {
        let err = ShellConfig::from_json_str(
            r#"{ "table": { "default_page_size": 15, "page_size_options": [10, 20] } }"#,
        );
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_relative_landing() {
        let err = ShellConfig::from_json_str(r#"{ "router": { "default_landing": "index" } }"#);
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ShellConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
