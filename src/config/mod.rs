//! Configuration module for the selfbot.
//!
//! Handles `config.json`, the username rotation list, and runtime
//! settings taken from the environment.

mod bot_config;
mod settings;
mod store;
mod usernames;

pub use bot_config::{AutoSwitchUsername, BotConfig, ConfigError, StatusConfigError, ValidationError};
pub use settings::{DEFAULT_API_URL, DEFAULT_AUTUMN_URL, DEFAULT_WS_URL, RuntimeSettings};
pub use store::ConfigStore;
pub use usernames::UsernameList;

/// Token value written to a freshly created `config.json`.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_TOKEN_HERE";

/// Prefix used when `config.json` does not set one.
pub const DEFAULT_PREFIX: &str = "!";

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Default location of the username rotation list.
pub const DEFAULT_USERNAMES_PATH: &str = "config/usernames.txt";
