use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChardevConfig {
    #[serde(default = "defaults::device_name")]
    pub device_name: String,
    #[serde(default = "defaults::class_name")]
    pub class_name: String,
    /// Initial buffer content. Truncated like any write if it does not fit.
    #[serde(default = "defaults::greeting")]
    pub greeting: String,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

mod defaults {
    pub fn device_name() -> String {
        "hello_char".into()
    }

    pub fn class_name() -> String {
        "hello_class".into()
    }

    pub fn greeting() -> String {
        chardev_buffer::GREETING.into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

impl Default for ChardevConfig {
    fn default() -> Self {
        Self {
            device_name: defaults::device_name(),
            class_name: defaults::class_name(),
            greeting: defaults::greeting(),
            log_level: defaults::log_level(),
        }
    }
}

impl ChardevConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let toml_to_str = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&toml_to_str)
    }

    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ChardevConfig = toml::from_str(toml_str)?;
        Ok(config)
    }
}
