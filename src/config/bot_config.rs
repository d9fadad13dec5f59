//! `config.json` loading, creation and validation.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::{DEFAULT_PREFIX, PLACEHOLDER_TOKEN};
use crate::revolt::Presence;

/// Errors that can occur while reading or writing configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Reasons the custom status settings cannot be used.
///
/// The display strings are shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusConfigError {
    #[error("Custom status is disabled in config.json.")]
    Disabled,

    #[error("No custom_status_type set in config.json.")]
    MissingType,

    #[error("Invalid custom_status_type '{0}'. Valid options: {choices}", choices = Presence::choices())]
    InvalidType(String),
}

/// Problems reported by [`BotConfig::validate_all`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Token is missing or still set to the placeholder value")]
    PlaceholderToken,

    #[error("Command prefix is empty")]
    EmptyPrefix,

    #[error("Command prefix contains whitespace: {0:?}")]
    PrefixWhitespace(String),

    #[error("auto_switch_username.delay must be greater than 0")]
    ZeroSwitchDelay,

    #[error("custom_status is enabled but custom_status_text is empty")]
    MissingStatusText,

    #[error("{0}")]
    Status(StatusConfigError),
}

/// Username auto-rotation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSwitchUsername {
    /// Whether the rotation loop changes the display name.
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between two display name changes.
    #[serde(default = "default_switch_delay")]
    pub delay: u64,
}

fn default_switch_delay() -> u64 {
    60
}

impl Default for AutoSwitchUsername {
    fn default() -> Self {
        Self {
            enabled: false,
            delay: default_switch_delay(),
        }
    }
}

/// Contents of `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Session token of the account.
    #[serde(default)]
    pub token: String,

    /// Prefix that marks a message as a command.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Command name to description, shown by `help` in file order.
    #[serde(default)]
    pub commands: IndexMap<String, String>,

    /// Username rotation settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_switch_username: Option<AutoSwitchUsername>,

    /// Whether custom status updates are allowed.
    #[serde(default)]
    pub custom_status: bool,

    /// Status text pushed by the refresh loop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_status_text: Option<String>,

    /// Presence kind, e.g. `Online` or `busy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_status_type: Option<String>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_owned()
}

impl BotConfig {
    /// Loads configuration from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a JSON file, creating parent directories.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Loads the configuration, writing [`BotConfig::example`] first if the
    /// file does not exist yet.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load_from_file(path);
        }

        let example = Self::example();
        example.save_to_file(path)?;
        warn!(
            "Created default {} - please edit it and set your token",
            path.display()
        );
        Ok(example)
    }

    /// Disabled configuration used when the file cannot be read at all.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            token: String::new(),
            prefix: default_prefix(),
            commands: IndexMap::new(),
            auto_switch_username: None,
            custom_status: false,
            custom_status_text: None,
            custom_status_type: None,
        }
    }

    /// Configuration written on first run.
    #[must_use]
    pub fn example() -> Self {
        let commands = [
            ("help", "Show this help message"),
            ("hello", "Get a greeting from the bot"),
            ("userinfo", "Fetch user info: userinfo <mention or id>"),
            ("username", "Change your display name: username <name>"),
            ("reloadnames", "Reload the username rotation list"),
            ("customstatus", "Set your custom status: customstatus <text>"),
        ]
        .into_iter()
        .map(|(name, desc)| (name.to_owned(), desc.to_owned()))
        .collect();

        Self {
            token: PLACEHOLDER_TOKEN.to_owned(),
            prefix: default_prefix(),
            commands,
            auto_switch_username: Some(AutoSwitchUsername::default()),
            custom_status: false,
            custom_status_text: Some("Powered by revolt_selfbot".to_owned()),
            custom_status_type: Some("Online".to_owned()),
        }
    }

    /// Returns true when the token is set to something other than the placeholder.
    #[must_use]
    pub fn has_usable_token(&self) -> bool {
        let token = self.token.trim();
        !token.is_empty() && token != PLACEHOLDER_TOKEN
    }

    /// Returns the rotation settings if rotation is enabled.
    #[must_use]
    pub fn username_rotation(&self) -> Option<&AutoSwitchUsername> {
        self.auto_switch_username.as_ref().filter(|s| s.enabled)
    }

    /// Resolves the configured presence kind.
    ///
    /// Checks run in a fixed order: enabled flag, presence of a kind, then
    /// membership of the (capitalised) kind in [`Presence`].
    pub fn status_presence(&self) -> Result<Presence, StatusConfigError> {
        if !self.custom_status {
            return Err(StatusConfigError::Disabled);
        }

        let kind = self
            .custom_status_type
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(StatusConfigError::MissingType)?;

        Presence::from_config_value(kind).ok_or_else(|| StatusConfigError::InvalidType(kind.to_owned()))
    }

    /// Configured status text, empty when unset.
    #[must_use]
    pub fn status_text(&self) -> &str {
        self.custom_status_text.as_deref().unwrap_or_default()
    }

    /// Collects every problem found in the configuration.
    #[must_use]
    pub fn validate_all(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !self.has_usable_token() {
            errors.push(ValidationError::PlaceholderToken);
        }

        if self.prefix.is_empty() {
            errors.push(ValidationError::EmptyPrefix);
        } else if self.prefix.chars().any(char::is_whitespace) {
            errors.push(ValidationError::PrefixWhitespace(self.prefix.clone()));
        }

        if self.auto_switch_username.as_ref().is_some_and(|s| s.delay == 0) {
            errors.push(ValidationError::ZeroSwitchDelay);
        }

        if self.custom_status {
            if self.status_text().trim().is_empty() {
                errors.push(ValidationError::MissingStatusText);
            }
            if let Err(e) = self.status_presence() {
                errors.push(ValidationError::Status(e));
            }
        }

        errors
    }
}
