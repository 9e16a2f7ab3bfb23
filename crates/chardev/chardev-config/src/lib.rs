mod config;

pub use config::{ChardevConfig, ConfigError};
