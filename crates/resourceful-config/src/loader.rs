//! Layered configuration loading.
//!
//! Layers apply in call order, each overriding only the keys it sets:
//! defaults (or a preset) → file or string → `.env` → environment variables.
//! Environment keys have the shape `<PREFIX>__<SECTION>__<KEY>`, for example
//! `RESOURCEFUL__CONNECTION__SECRET`.

use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::{ConfigError, ResourcefulConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "RESOURCEFUL";

/// Builds a [`ResourcefulConfig`] from layered sources.
///
/// ```no_run
/// use resourceful_config::ConfigLoader;
///
/// # fn main() -> Result<(), resourceful_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("resourceful.toml")?
///     .with_dotenv()
///     .with_env_prefix("RESOURCEFUL")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: ResourcefulConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Starts from [`ResourcefulConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ResourcefulConfig::default(),
            env_prefix: None,
        }
    }

    /// Starts from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = ResourcefulConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = ResourcefulConfig::production();
        self
    }

    /// Layers a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, of another format, or
    /// carries unknown or mistyped keys.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
        self.with_string(&content, &format)
    }

    /// Layers a file if it exists.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::with_file`].
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Layers configuration text in `format` (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Fails on an unknown format, a parse error, or unknown or mistyped keys.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer: Value = match format.to_lowercase().as_str() {
            "toml" => serde_json::to_value(toml::from_str::<toml::Table>(content)?)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        let mut merged = serde_json::to_value(&self.config)?;
        merge(&mut merged, layer);
        self.config = serde_json::from_value(merged)?;
        Ok(self)
    }

    /// Loads `.env` from the working directory into the process environment,
    /// if present.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Applies `<prefix>__*` environment variables when loading.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable override or an invalid final configuration.
    pub fn load(mut self) -> Result<ResourcefulConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let mut vars: Vec<(String, String)> = env::vars()
                .filter(|(key, _)| key.starts_with(&prefix))
                .collect();
            vars.sort();
            for (key, value) in vars {
                self.apply_env_var(&prefix, &key, &value)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the layered configuration without environment overrides or
    /// validation.
    #[must_use]
    pub fn load_unvalidated(self) -> ResourcefulConfig {
        self.config
    }

    fn apply_env_var(&mut self, prefix: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };
        let parts: Vec<&str> = rest.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_int(key, value)?;
            }
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                config.server.request_timeout_ms = parse_int(key, value)?;
            }
            ["SERVER", "KEEP_ALIVE"] => config.server.keep_alive = parse_flag(key, value)?,

            ["CONNECTION", "PARSE"] => config.connection.parse = parse_flag(key, value)?,
            ["CONNECTION", "DEBUG"] => config.connection.debug = parse_flag(key, value)?,
            ["CONNECTION", "SECRET"] => config.connection.secret = value.to_string(),
            ["CONNECTION", "TOKEN"] => config.connection.token = value.to_string(),
            ["CONNECTION", "MAX_BODY_SIZE"] => {
                config.connection.max_body_size = parse_int(key, value)?;
            }

            ["LOGGING", "ENABLED"] => config.logging.enabled = parse_flag(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "JSON"] => config.logging.json = parse_flag(key, value)?,
            ["LOGGING", "FILE_LINE_INFO"] => {
                config.logging.file_line_info = parse_flag(key, value)?;
            }
            ["LOGGING", "INCLUDE_TARGET"] => {
                config.logging.include_target = parse_flag(key, value)?;
            }

            ["METRICS", "ENABLED"] => config.metrics.enabled = parse_flag(key, value)?,
            ["METRICS", "ADDR"] => config.metrics.addr = value.to_string(),

            _ => {}
        }
        Ok(())
    }
}

/// Recursively overlays `layer` onto `base`. Objects merge key by key;
/// anything else replaces.
fn merge(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse_error(key, "expected boolean")),
    }
}

fn parse_int<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}
